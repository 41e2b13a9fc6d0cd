use crate::config::AdvisorConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads advisor configuration from `config/Advisor.toml` and `DELTA_ONE_*` env vars.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the result fails validation.
    pub fn load() -> Result<AdvisorConfig> {
        Self::load_from("config/Advisor.toml")
    }

    /// Loads advisor configuration layered over the built-in defaults.
    ///
    /// Missing files are skipped; nested keys come from the environment as
    /// `DELTA_ONE_SYNTHESIS__MARGIN_RATE=0.15`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the result fails validation.
    pub fn load_from(path: &str) -> Result<AdvisorConfig> {
        let config: AdvisorConfig = Figment::from(Serialized::defaults(AdvisorConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("DELTA_ONE_").split("__"))
            .extract()?;

        config.validate()?;
        tracing::debug!(path, "Advisor configuration loaded");
        Ok(config)
    }
}
