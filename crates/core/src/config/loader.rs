use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment prefix for overrides. Nesting uses a double underscore,
/// e.g. `ARCHIVIST_PIPELINE__DOWNLOAD_CONCURRENCY=1`.
pub const ENV_PREFIX: &str = "ARCHIVIST_";

/// Legacy variable holding the expected shared secret.
pub const SECRET_TOKEN_ENV: &str = "SECRET_TOKEN";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    with_env(defaults().merge(Toml::file(path)))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from defaults and environment variables only
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    with_env(defaults())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn defaults() -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
}

fn with_env(figment: Figment) -> Figment {
    figment
        .merge(
            Env::raw()
                .only(&[SECRET_TOKEN_ENV])
                .map(|_| "auth.secret_token".into()),
        )
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}
