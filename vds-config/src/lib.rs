//! Layered configuration for the vds engine.
//!
//! `defaults/vds.default.toml` is embedded so that the documented defaults and
//! [`vds::Limits::default`] stay in sync. Applications layer their own files and overrides
//! on top via [`Loader`] before deserializing into [`VdsConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, Map, ValueKind};
use serde::Deserialize;
use std::path::Path;
use vds::{Engine, HashedRandom, Limits, Registry};

const DEFAULT_TOML: &str = include_str!("../defaults/vds.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VdsConfig {
    pub limits: Limits,
    pub random: RandomConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RandomConfig {
    pub seed: u64,
}

impl VdsConfig {
    /// An engine over `registry` with these limits and random seed.
    pub fn engine<R: Registry>(&self, registry: R) -> Engine<R> {
        Engine::new(registry)
            .with_limits(self.limits)
            .with_random_source(HashedRandom::new(self.random.seed))
    }
}

/// Builds a [VdsConfig] from the embedded defaults plus whatever an application layers on
/// top: TOML files, `VDS_*` environment variables and single-key overrides, later layers
/// winning.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// A loader holding only `defaults/vds.default.toml`.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML file that must exist; `build` fails otherwise.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.with_toml(path.as_ref(), true)
    }

    /// Layer a TOML file if it exists, such as a per-user `vds.toml`.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.with_toml(path.as_ref(), false)
    }

    /// Layer `VDS_`-prefixed variables, with `__` between key segments:
    /// `VDS_LIMITS__PRECISION=3` sets `limits.precision`.
    pub fn with_env(self) -> Self {
        self.with_env_source(None)
    }

    /// Set one key, e.g. `("limits.max_context_depth", 64)`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merge the layers into limits and a random seed.
    pub fn build(self) -> Result<VdsConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }

    fn with_toml(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// `variables` stands in for the process environment when given.
    fn with_env_source(mut self, variables: Option<Map<String, String>>) -> Self {
        let source = Environment::with_prefix("VDS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(variables);
        self.builder = self.builder.add_source(source);
        self
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults alone.
pub fn load_defaults() -> Result<VdsConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use vds::StandardRegistry;

    #[test]
    fn defaults_match_limits_default() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.limits, Limits::default());
        assert_eq!(config.random, RandomConfig { seed: 0 });
    }

    #[rstest]
    #[case("limits.precision", 3)]
    #[case("limits.max_context_depth", 64)]
    fn supports_overrides(#[case] key: &str, #[case] value: i64) {
        let config = Loader::new()
            .set_override(key, value)
            .expect("override to apply")
            .build()
            .expect("config to build");
        let limits = config.limits;
        let read = match key {
            "limits.precision" => limits.precision,
            _ => limits.max_context_depth,
        };
        assert_eq!(i64::from(read), value);
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/vds.toml")
            .build()
            .expect("config to build");
        assert_eq!(config.limits, Limits::default());
    }

    #[test]
    fn missing_required_file_is_an_error() {
        assert!(Loader::new()
            .with_file("/nonexistent/vds.toml")
            .build()
            .is_err());
    }

    #[test]
    fn environment_overrides_defaults() {
        let variables = Map::from([
            ("VDS_LIMITS__PRECISION".to_string(), "2".to_string()),
            ("VDS_RANDOM__SEED".to_string(), "9".to_string()),
            ("OTHER_LIMITS__PRECISION".to_string(), "1".to_string()),
        ]);
        let config = Loader::new()
            .with_env_source(Some(variables))
            .build()
            .expect("config to build");
        assert_eq!(config.limits.precision, 2);
        assert_eq!(config.random, RandomConfig { seed: 9 });
    }

    #[test]
    fn configured_engine_uses_limits() {
        let config = Loader::new()
            .set_override("limits.default_repetition_max", 2)
            .expect("override to apply")
            .build()
            .expect("config to build");
        let engine = config.engine(StandardRegistry);
        assert_eq!(engine.limits().default_repetition_max, 2);
        assert!(engine.parse_grammar("a a", "a*", None).unwrap().is_some());
        assert!(engine.parse_grammar("a a a", "a*", None).unwrap().is_none());
    }
}
