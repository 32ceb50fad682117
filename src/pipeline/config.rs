//! Comparison policy: chunking, thresholds, masking and reporting knobs.

use crate::chunking::Chunker;
use crate::config::{ConfigError, parse_from_env};
use crate::constants::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_WINDOW, DEFAULT_HIGH_RISK_THRESHOLD,
    DEFAULT_INTRO_MAX_CHARS, DEFAULT_INTRO_PAGES, DEFAULT_MASK_RATIO, DEFAULT_MASK_RUNS,
    DEFAULT_ROBUST_RETENTION, DEFAULT_SUSPICIOUS_THRESHOLD, DEFAULT_VERBATIM_THRESHOLD,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Chunk window `W`, in characters.
    pub chunk_window: usize,
    /// Chunk overlap `O`, in characters.
    pub chunk_overlap: usize,
    /// Distances below this are verbatim copies.
    pub verbatim_threshold: f64,
    /// Distances at or above this are not matches.
    pub suspicious_threshold: f64,
    /// Masked re-query trials per match; 0 disables the robustness check.
    pub mask_runs: usize,
    /// Per-unit masking probability; `<= 0` disables the robustness check.
    pub mask_ratio: f64,
    /// Opening pages used for the discourse comparison.
    pub intro_pages: usize,
    pub intro_max_chars: usize,
    /// Reports scoring strictly above this percentage are "High Risk".
    pub high_risk_threshold: f64,
    /// Fraction of the original score a masked score must keep to count as robust.
    pub robust_retention: f64,
    /// Matches judged concurrently; results keep chunk order.
    pub judgment_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_window: DEFAULT_CHUNK_WINDOW,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            verbatim_threshold: DEFAULT_VERBATIM_THRESHOLD,
            suspicious_threshold: DEFAULT_SUSPICIOUS_THRESHOLD,
            mask_runs: DEFAULT_MASK_RUNS,
            mask_ratio: DEFAULT_MASK_RATIO,
            intro_pages: DEFAULT_INTRO_PAGES,
            intro_max_chars: DEFAULT_INTRO_MAX_CHARS,
            high_risk_threshold: DEFAULT_HIGH_RISK_THRESHOLD,
            robust_retention: DEFAULT_ROBUST_RETENTION,
            judgment_concurrency: 1,
        }
    }
}

impl PipelineConfig {
    const ENV_CHUNK_SIZE: &'static str = "COLLIDE_CHUNK_SIZE";
    const ENV_CHUNK_OVERLAP: &'static str = "COLLIDE_CHUNK_OVERLAP";
    const ENV_THRESHOLD_VERBATIM: &'static str = "COLLIDE_THRESHOLD_VERBATIM";
    const ENV_THRESHOLD_SUSPICIOUS: &'static str = "COLLIDE_THRESHOLD_SUSPICIOUS";
    const ENV_MASK_RUNS: &'static str = "COLLIDE_MASK_RUNS";
    const ENV_MASK_RATIO: &'static str = "COLLIDE_MASK_RATIO";
    const ENV_INTRO_PAGES: &'static str = "COLLIDE_INTRO_PAGES";
    const ENV_INTRO_MAX_CHARS: &'static str = "COLLIDE_INTRO_MAX_CHARS";
    const ENV_HIGH_RISK_PERCENT: &'static str = "COLLIDE_HIGH_RISK_PERCENT";
    const ENV_ROBUST_RETENTION: &'static str = "COLLIDE_ROBUST_RETENTION";
    const ENV_JUDGMENT_CONCURRENCY: &'static str = "COLLIDE_JUDGMENT_CONCURRENCY";

    /// Loads the policy from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();

        // Negative run counts are accepted and mean "disabled".
        let mask_runs: i64 = parse_from_env(Self::ENV_MASK_RUNS, d.mask_runs as i64)?;

        let config = Self {
            chunk_window: parse_from_env(Self::ENV_CHUNK_SIZE, d.chunk_window)?,
            chunk_overlap: parse_from_env(Self::ENV_CHUNK_OVERLAP, d.chunk_overlap)?,
            verbatim_threshold: parse_from_env(
                Self::ENV_THRESHOLD_VERBATIM,
                d.verbatim_threshold,
            )?,
            suspicious_threshold: parse_from_env(
                Self::ENV_THRESHOLD_SUSPICIOUS,
                d.suspicious_threshold,
            )?,
            mask_runs: mask_runs.max(0) as usize,
            mask_ratio: parse_from_env(Self::ENV_MASK_RATIO, d.mask_ratio)?,
            intro_pages: parse_from_env(Self::ENV_INTRO_PAGES, d.intro_pages)?,
            intro_max_chars: parse_from_env(Self::ENV_INTRO_MAX_CHARS, d.intro_max_chars)?,
            high_risk_threshold: parse_from_env(
                Self::ENV_HIGH_RISK_PERCENT,
                d.high_risk_threshold,
            )?,
            robust_retention: parse_from_env(Self::ENV_ROBUST_RETENTION, d.robust_retention)?,
            judgment_concurrency: parse_from_env(
                Self::ENV_JUDGMENT_CONCURRENCY,
                d.judgment_concurrency,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_window == 0 || self.chunk_overlap >= self.chunk_window {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_CHUNK_OVERLAP,
                reason: format!(
                    "need 0 <= overlap < window, got window={} overlap={}",
                    self.chunk_window, self.chunk_overlap
                ),
            });
        }
        if !(self.verbatim_threshold >= 0.0
            && self.verbatim_threshold < self.suspicious_threshold
            && self.suspicious_threshold <= 1.0)
        {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_THRESHOLD_SUSPICIOUS,
                reason: format!(
                    "need 0 <= verbatim < suspicious <= 1, got {} and {}",
                    self.verbatim_threshold, self.suspicious_threshold
                ),
            });
        }
        if self.mask_ratio.is_nan() || self.mask_ratio > 1.0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_MASK_RATIO,
                reason: format!("must be <= 1, got {}", self.mask_ratio),
            });
        }
        if !(self.robust_retention > 0.0 && self.robust_retention <= 1.0) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_ROBUST_RETENTION,
                reason: format!("must be within (0, 1], got {}", self.robust_retention),
            });
        }
        if !(0.0..=100.0).contains(&self.high_risk_threshold) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_HIGH_RISK_PERCENT,
                reason: format!("must be within [0, 100], got {}", self.high_risk_threshold),
            });
        }
        if self.judgment_concurrency == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_JUDGMENT_CONCURRENCY,
                reason: "must be >= 1".to_string(),
            });
        }
        Ok(())
    }

    /// True when masked re-queries will run.
    pub fn robustness_enabled(&self) -> bool {
        self.mask_runs > 0 && self.mask_ratio > 0.0
    }

    pub fn chunker(&self) -> Result<Chunker, ConfigError> {
        Chunker::new(self.chunk_window, self.chunk_overlap).map_err(|e| ConfigError::OutOfRange {
            name: Self::ENV_CHUNK_SIZE,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: [&str; 11] = [
        "COLLIDE_CHUNK_SIZE",
        "COLLIDE_CHUNK_OVERLAP",
        "COLLIDE_THRESHOLD_VERBATIM",
        "COLLIDE_THRESHOLD_SUSPICIOUS",
        "COLLIDE_MASK_RUNS",
        "COLLIDE_MASK_RATIO",
        "COLLIDE_INTRO_PAGES",
        "COLLIDE_INTRO_MAX_CHARS",
        "COLLIDE_HIGH_RISK_PERCENT",
        "COLLIDE_ROBUST_RETENTION",
        "COLLIDE_JUDGMENT_CONCURRENCY",
    ];

    fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        // SAFETY: Test code only, we accept the thread-safety risk in tests.
        unsafe {
            for key in VARS {
                env::remove_var(key);
            }
            for (key, value) in vars {
                env::set_var(key, value);
            }
        }

        let result = f();

        // SAFETY: Test code only, we accept the thread-safety risk in tests.
        unsafe {
            for key in VARS {
                env::remove_var(key);
            }
        }
        result
    }

    #[test]
    #[serial]
    fn test_defaults_match_reference_policy() {
        let config = with_env_vars(&[], PipelineConfig::from_env).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.chunk_window, 500);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.verbatim_threshold, 0.1);
        assert_eq!(config.suspicious_threshold, 0.4);
        assert_eq!(config.mask_runs, 3);
        assert_eq!(config.high_risk_threshold, 20.0);
        assert_eq!(config.robust_retention, 0.8);
        assert!(config.robustness_enabled());
    }

    #[test]
    #[serial]
    fn test_overrides() {
        let config = with_env_vars(
            &[
                ("COLLIDE_CHUNK_SIZE", "300"),
                ("COLLIDE_CHUNK_OVERLAP", "50"),
                ("COLLIDE_THRESHOLD_VERBATIM", "0.05"),
                ("COLLIDE_THRESHOLD_SUSPICIOUS", "0.3"),
                ("COLLIDE_HIGH_RISK_PERCENT", "35"),
                ("COLLIDE_JUDGMENT_CONCURRENCY", "4"),
            ],
            PipelineConfig::from_env,
        )
        .unwrap();
        assert_eq!(config.chunk_window, 300);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.verbatim_threshold, 0.05);
        assert_eq!(config.suspicious_threshold, 0.3);
        assert_eq!(config.high_risk_threshold, 35.0);
        assert_eq!(config.judgment_concurrency, 4);
    }

    #[test]
    #[serial]
    fn test_negative_mask_runs_disable_robustness() {
        let config =
            with_env_vars(&[("COLLIDE_MASK_RUNS", "-1")], PipelineConfig::from_env).unwrap();
        assert_eq!(config.mask_runs, 0);
        assert!(!config.robustness_enabled());

        let config =
            with_env_vars(&[("COLLIDE_MASK_RATIO", "0")], PipelineConfig::from_env).unwrap();
        assert!(!config.robustness_enabled());
    }

    #[test]
    #[serial]
    fn test_unparseable_value_is_error() {
        let err = with_env_vars(&[("COLLIDE_MASK_RATIO", "half")], PipelineConfig::from_env)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                name: "COLLIDE_MASK_RATIO",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_bad_policy() {
        let inverted = PipelineConfig {
            verbatim_threshold: 0.5,
            suspicious_threshold: 0.4,
            ..PipelineConfig::default()
        };
        assert!(inverted.validate().is_err());

        let overlap = PipelineConfig {
            chunk_overlap: 500,
            ..PipelineConfig::default()
        };
        assert!(overlap.validate().is_err());

        let retention = PipelineConfig {
            robust_retention: 0.0,
            ..PipelineConfig::default()
        };
        assert!(retention.validate().is_err());

        let ratio = PipelineConfig {
            mask_ratio: 1.5,
            ..PipelineConfig::default()
        };
        assert!(ratio.validate().is_err());

        let concurrency = PipelineConfig {
            judgment_concurrency: 0,
            ..PipelineConfig::default()
        };
        assert!(concurrency.validate().is_err());
    }

    #[test]
    fn test_chunker_from_policy() {
        let chunker = PipelineConfig::default().chunker().unwrap();
        assert_eq!(chunker.window(), 500);
        assert_eq!(chunker.stride(), 400);
    }
}
