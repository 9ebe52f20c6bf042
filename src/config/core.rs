use anyhow::{Context, Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Json, Toml, Yaml},
};
use std::path::Path;

use super::ThreadworkConfig;
use crate::parallel::{Dispatcher, MAX_THREADS};

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Largest per-worker stack accepted from configuration
pub const MAX_STACK_SIZE_MB: usize = 1024;

impl ThreadworkConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_custom_config(None)
    }

    pub fn load_with_custom_config(custom_config: Option<&str>) -> Result<Self> {
        let config = Self::load_unchecked(custom_config)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge and parse without validating, so `config validate` can report
    pub fn load_unchecked(custom_config: Option<&str>) -> Result<Self> {
        let config: Self = Self::figment(custom_config)
            .extract()
            .context("Failed to parse threadwork configuration")?;
        tracing::trace!("CONFIG LOAD: {:?}", config);
        Ok(config)
    }

    /// Merged provider stack, highest priority last
    pub fn figment(custom_config: Option<&str>) -> Figment {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG)); // Embedded defaults

        // A custom config replaces the user and repository layers
        if let Some(custom_path) = custom_config {
            figment = match Path::new(custom_path).extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(custom_path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(custom_path)),
                _ => figment.merge(Toml::file(custom_path)),
            };
        } else {
            let user = Self::user_config_path();
            figment = figment
                // User config - support multiple formats
                .merge(Toml::file(&user))
                .merge(Json::file(user.replace(".toml", ".json")))
                .merge(Yaml::file(user.replace(".toml", ".yaml")))
                .merge(Yaml::file(user.replace(".toml", ".yml")))
                // Repository config - support multiple formats
                .merge(Toml::file("threadwork.toml"))
                .merge(Json::file("threadwork.json"))
                .merge(Yaml::file("threadwork.yaml"))
                .merge(Yaml::file("threadwork.yml"));
        }

        // Environment variables always have highest priority
        figment.merge(Env::prefixed("THREADWORK_").split("__"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads.count > MAX_THREADS {
            bail!(
                "threads.count = {} exceeds the pool capacity of {}",
                self.threads.count,
                MAX_THREADS
            );
        }
        if self.threads.stack_size_mb > MAX_STACK_SIZE_MB {
            bail!(
                "threads.stack_size_mb = {} exceeds the limit of {} MB",
                self.threads.stack_size_mb,
                MAX_STACK_SIZE_MB
            );
        }
        Ok(())
    }

    /// Explicit worker count, `None` when it should be detected
    pub fn thread_count(&self) -> Option<usize> {
        (self.threads.count > 0).then_some(self.threads.count)
    }

    /// Per-worker stack size in bytes, `None` for the platform default or a
    /// size that does not fit in `usize`
    pub fn stack_size(&self) -> Option<usize> {
        match self.threads.stack_size_mb {
            0 => None,
            mb => mb.checked_mul(1024 * 1024),
        }
    }

    /// Dispatcher configured from the thread settings
    pub fn dispatcher(&self) -> Result<Dispatcher> {
        self.validate()?;
        let mut dispatcher = Dispatcher::new().with_stack_size(self.stack_size());
        if let Some(count) = self.thread_count() {
            dispatcher.set_threads(count)?;
        }
        Ok(dispatcher)
    }

    /// The merged configuration rendered as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration as TOML")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to render configuration as JSON")
    }

    fn user_config_path() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{}/.config/threadwork/config.toml", home),
            Err(_) => "~/.config/threadwork/config.toml".to_string(),
        }
    }
}
