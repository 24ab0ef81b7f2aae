use config::{Config, Environment, File, Map};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info};

/// Base name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_NAME: &str = "superapp";
/// Prefix of environment overrides (`SAPP__CART__POLICY__KIND=clamp`).
pub const ENV_PREFIX: &str = "SAPP";

/// Custom error type for config loading.
#[sapp_derive::sapp_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a configuration object from a file plus environment overrides.
///
/// Layers, lowest priority first:
/// 1. **File**: the given `path` (must exist), or `superapp.{toml,json,yaml,..}` in the current
///    working directory when `path` is `None` (optional, defaults apply when it is missing).
/// 2. **Environment**: variables prefixed with `SAPP__`; nested keys are separated by double
///    underscores (`SAPP__SESSIONS__CAPACITY` maps to `sessions.capacity`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if an explicit file is missing, a source is malformed,
/// or the merged values do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use sapp_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_config_with(path, None::<Map<String, String>>)
}

/// Same as [`load_config`], but reads the `SAPP__` overrides from `overrides` instead of the
/// process environment when it is `Some`.
///
/// Override values are parsed into numbers and booleans where possible, so
/// `SAPP__SESSIONS__CAPACITY=5` fills a `u64` field.
///
/// # Errors
/// As [`load_config`].
pub fn load_config_with<T>(
    path: Option<impl AsRef<Path>>,
    overrides: Option<impl IntoIterator<Item = (String, String)>>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let file = match path.as_ref() {
        Some(path) => {
            info!("Loading config from {}", path.as_ref().display());
            File::from(path.as_ref()).required(true)
        },
        None => {
            debug!("No config path given, probing for `{DEFAULT_CONFIG_NAME}`");
            File::with_name(DEFAULT_CONFIG_NAME).required(false)
        },
    };

    let config = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake)
                .try_parsing(true)
                .source(overrides.map(|pairs| pairs.into_iter().collect::<Map<_, _>>())),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
