use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkingError {
    #[error("invalid chunk window {window} with overlap {overlap}: need window > 0 and overlap < window")]
    InvalidWindow { window: usize, overlap: usize },
}
