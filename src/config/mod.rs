use crate::error::{RecError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub training: TrainingConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub embedding_dim: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f32,
    /// L2 decay on the user vector.
    pub user_reg: f32,
    /// L2 decay on the positive item vector.
    pub positive_reg: f32,
    /// L2 decay on the sampled negative item vector.
    pub negative_reg: f32,
    /// Number of recent (user, positive) pairs resampled for the
    /// per-epoch diagnostic loss.
    pub diagnostic_window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub top_k: usize,
    pub exclude_known_positives: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                embedding_dim: 32,
                seed: 42,
            },
            training: TrainingConfig {
                epochs: 20,
                learning_rate: 0.05,
                user_reg: 0.002,
                positive_reg: 0.002,
                negative_reg: 0.002,
                diagnostic_window: 1000,
            },
            recommendation: RecommendationConfig {
                top_k: 10,
                exclude_known_positives: true,
            },
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("RANKREC"))
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects parameter values the trainer cannot run with. Fatal at the
    /// call site; no silent substitution of defaults.
    pub fn validate(&self) -> Result<()> {
        if self.model.embedding_dim == 0 {
            return Err(RecError::InvalidConfiguration(
                "embedding dimension must be positive".to_string(),
            ));
        }

        if self.training.epochs == 0 {
            return Err(RecError::InvalidConfiguration(
                "epoch count must be positive".to_string(),
            ));
        }

        if !(self.training.learning_rate > 0.0) || !self.training.learning_rate.is_finite() {
            return Err(RecError::InvalidConfiguration(format!(
                "learning rate must be positive and finite, got {}",
                self.training.learning_rate
            )));
        }

        for (name, reg) in [
            ("user_reg", self.training.user_reg),
            ("positive_reg", self.training.positive_reg),
            ("negative_reg", self.training.negative_reg),
        ] {
            if reg < 0.0 || !reg.is_finite() {
                return Err(RecError::InvalidConfiguration(format!(
                    "{} must be non-negative and finite, got {}",
                    name, reg
                )));
            }
        }

        if self.training.diagnostic_window == 0 {
            return Err(RecError::InvalidConfiguration(
                "diagnostic window must be positive".to_string(),
            ));
        }

        if self.recommendation.top_k == 0 {
            return Err(RecError::InvalidConfiguration(
                "top_k must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_embedding_dim() {
        let mut cfg = Config::default();
        cfg.model.embedding_dim = 0;
        assert!(matches!(
            cfg.validate(),
            Err(RecError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_rejects_bad_learning_rate() {
        let mut cfg = Config::default();
        cfg.training.learning_rate = 0.0;
        assert!(cfg.validate().is_err());

        cfg.training.learning_rate = f32::NAN;
        assert!(cfg.validate().is_err());

        cfg.training.learning_rate = -0.1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_regularization() {
        let mut cfg = Config::default();
        cfg.training.positive_reg = -0.01;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_epochs_and_window() {
        let mut cfg = Config::default();
        cfg.training.epochs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.training.diagnostic_window = 0;
        assert!(cfg.validate().is_err());
    }
}
