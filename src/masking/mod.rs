//! Randomized redaction used to probe whether a match depends on exact wording.
//!
//! Text containing whitespace is masked per whitespace-delimited token (tokens are
//! re-joined with single spaces); text without whitespace is masked per character.
//! Every unit is an independent Bernoulli trial with probability `ratio`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::constants::{MASK_CHAR, MASK_TOKEN};

#[derive(Debug, Error, PartialEq)]
pub enum MaskingError {
    #[error("mask ratio must be within [0, 1], got {ratio}")]
    InvalidRatio { ratio: f64 },
}

/// Redacts units of a text span at a fixed ratio.
#[derive(Debug)]
pub struct Masker {
    ratio: f64,
    rng: SmallRng,
}

impl Masker {
    /// Creates a masker seeded from OS entropy.
    pub fn new(ratio: f64) -> Result<Self, MaskingError> {
        Self::validate(ratio)?;
        Ok(Self {
            ratio,
            rng: SmallRng::from_entropy(),
        })
    }

    /// Creates a masker with a fixed seed (reproducible trials).
    pub fn seeded(ratio: f64, seed: u64) -> Result<Self, MaskingError> {
        Self::validate(ratio)?;
        Ok(Self {
            ratio,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    fn validate(ratio: f64) -> Result<(), MaskingError> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(MaskingError::InvalidRatio { ratio });
        }
        Ok(())
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Returns a masked variant of `text` with the same number of units.
    pub fn mask(&mut self, text: &str) -> String {
        if self.ratio <= 0.0 {
            return text.to_string();
        }

        if text.chars().any(char::is_whitespace) {
            text.split_whitespace()
                .map(|token| {
                    if self.rng.gen_bool(self.ratio) {
                        MASK_TOKEN
                    } else {
                        token
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            text.chars()
                .map(|ch| {
                    if self.rng.gen_bool(self.ratio) {
                        MASK_CHAR
                    } else {
                        ch
                    }
                })
                .collect()
        }
    }
}

/// Number of maskable units in `text` (tokens when it has whitespace, else chars).
pub fn unit_count(text: &str) -> usize {
    if text.chars().any(char::is_whitespace) {
        text.split_whitespace().count()
    } else {
        text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range_ratio() {
        assert_eq!(
            Masker::new(1.5).unwrap_err(),
            MaskingError::InvalidRatio { ratio: 1.5 }
        );
        assert!(Masker::new(-0.1).is_err());
        assert!(Masker::new(f64::NAN).is_err());
        assert!(Masker::new(0.0).is_ok());
        assert!(Masker::new(1.0).is_ok());
    }

    #[test]
    fn test_ratio_zero_is_identity() {
        let mut masker = Masker::seeded(0.0, 7).unwrap();
        let text = "We  propose\ta novel   method.";
        assert_eq!(masker.mask(text), text);
        assert_eq!(masker.mask("无空白文本"), "无空白文本");
    }

    #[test]
    fn test_ratio_one_masks_every_token() {
        let mut masker = Masker::seeded(1.0, 7).unwrap();
        let masked = masker.mask("the results confirm the hypothesis");
        assert!(masked.split(' ').all(|t| t == MASK_TOKEN));
        assert_eq!(unit_count(&masked), 5);
    }

    #[test]
    fn test_ratio_one_masks_every_char() {
        let mut masker = Masker::seeded(1.0, 7).unwrap();
        let masked = masker.mask("研究方法");
        assert_eq!(masked, "□□□□");
    }

    #[test]
    fn test_unit_count_preserved() {
        let mut masker = Masker::seeded(0.5, 42).unwrap();
        let texts = [
            "one two three four five six seven eight nine ten",
            "  leading and trailing  whitespace ",
            "nowhitespaceatall",
            "混合 text 与 spaces",
        ];
        for text in texts {
            for _ in 0..20 {
                assert_eq!(unit_count(&masker.mask(text)), unit_count(text), "{}", text);
            }
        }
    }

    #[test]
    fn test_partial_ratio_masks_some_units() {
        let mut masker = Masker::seeded(0.5, 1234).unwrap();
        let text = "w ".repeat(400);
        let masked = masker.mask(&text);
        let redacted = masked.split(' ').filter(|t| *t == MASK_TOKEN).count();
        assert!(redacted > 100 && redacted < 300, "redacted={}", redacted);
    }

    #[test]
    fn test_seeded_masker_is_reproducible() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let a = Masker::seeded(0.5, 99).unwrap().mask(text);
        let b = Masker::seeded(0.5, 99).unwrap().mask(text);
        assert_eq!(a, b);
    }
}
