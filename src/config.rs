use nuts_rs::DiagGradNutsSettings;

use crate::error::{OrdinalError, Result};

/// Settings for one NUTS run. Tuning draws are discarded; `num_draws` are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerConfig {
    pub num_tune: u64,
    pub num_draws: u64,
    pub maxdepth: u64,
    pub seed: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            num_tune: 1000,
            num_draws: 1000,
            maxdepth: 10,
            seed: 42,
        }
    }
}

impl SamplerConfig {
    pub fn with_num_tune(mut self, num_tune: u64) -> Self {
        self.num_tune = num_tune;
        self
    }

    pub fn with_num_draws(mut self, num_draws: u64) -> Self {
        self.num_draws = num_draws;
        self
    }

    pub fn with_maxdepth(mut self, maxdepth: u64) -> Self {
        self.maxdepth = maxdepth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_draws == 0 {
            return Err(OrdinalError::InvalidConfig("num_draws must be positive".into()));
        }
        if self.maxdepth == 0 {
            return Err(OrdinalError::InvalidConfig("maxdepth must be positive".into()));
        }
        Ok(())
    }

    pub fn to_settings(&self) -> DiagGradNutsSettings {
        // We get the default sampler arguments
        let mut settings = DiagGradNutsSettings::default();

        // and modify as we like
        settings.num_tune = self.num_tune;
        settings.num_draws = self.num_draws;
        settings.maxdepth = self.maxdepth;
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_settings() {
        let config = SamplerConfig::default()
            .with_num_tune(200)
            .with_num_draws(300)
            .with_maxdepth(6)
            .with_seed(9);
        config.validate().unwrap();

        let settings = config.to_settings();
        assert_eq!(settings.num_tune, 200);
        assert_eq!(settings.num_draws, 300);
        assert_eq!(settings.maxdepth, 6);
    }

    #[test]
    fn rejects_empty_runs() {
        assert!(SamplerConfig::default().with_num_draws(0).validate().is_err());
        assert!(SamplerConfig::default().with_maxdepth(0).validate().is_err());
    }
}
