use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration for a registration run.
///
/// Passed explicitly and never mutated by the core; callers that want
/// "last used" semantics own that persistence themselves.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub matching: MatchingConfig,
    pub ransac: RansacConfig,
}

/// Parameters of the correspondence matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Lowe ratio: best/second-best descriptor distance must fall below
    /// this to accept a match. Near 1 accepts nearly everything.
    pub ratio_threshold: f64,
    /// Restrict candidates to a disc around each query feature. Disable
    /// when the two images have very different extents.
    pub use_spatial_gate: bool,
    /// Gate radius in the same units as feature locations.
    pub spatial_radius: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            ratio_threshold: 0.77,
            use_spatial_gate: true,
            spatial_radius: 100.0,
        }
    }
}

/// Parameters of the consensus filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RansacConfig {
    /// Number of random trials.
    pub iterations: usize,
    /// Correspondences drawn (with replacement) per trial.
    pub sample_size: usize,
    /// Maximal alignment error in pixels for a correspondence to count
    /// as an inlier.
    pub max_epsilon: f64,
    /// Seed for the trial sampler; `None` seeds from entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            sample_size: 4,
            max_epsilon: 5.0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(path)?;

        if content.trim_start().starts_with('{') {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P, format: ConfigFormat) -> crate::Result<()> {
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(self.matching.ratio_threshold > 0.0 && self.matching.ratio_threshold <= 1.0) {
            errors.push("matching ratio_threshold must be in (0, 1]".to_string());
        }

        if self.matching.spatial_radius < 0.0 {
            errors.push("matching spatial_radius must be non-negative".to_string());
        }

        if self.ransac.max_epsilon <= 0.0 {
            errors.push("ransac max_epsilon must be positive".to_string());
        }

        if self.ransac.sample_size < 2 {
            errors.push("ransac sample_size must be at least 2".to_string());
        }

        if self.ransac.iterations < 1 {
            errors.push("ransac iterations must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

pub fn load_config_or_default(config_path: Option<&str>) -> Config {
    match config_path {
        Some(path) => match Config::load_from_file(path) {
            Ok(config) => {
                if let Err(errors) = config.validate() {
                    eprintln!("Configuration validation errors:");
                    for error in errors {
                        eprintln!("  - {}", error);
                    }
                    eprintln!("Using default configuration instead.");
                    Config::default()
                } else {
                    config
                }
            }
            Err(e) => {
                eprintln!("Failed to load config from '{}': {}", path, e);
                eprintln!("Using default configuration.");
                Config::default()
            }
        },
        None => Config::default(),
    }
}
