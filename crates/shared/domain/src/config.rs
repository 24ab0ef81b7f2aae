use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level application configuration shared across slices.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub cart: CartConfig,
    pub sessions: SessionConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// How a cart line reacts when its quantity is decreased.
///
/// Configured as `{ kind = "clamp", floor = 1 }` or `{ kind = "remove_at_zero" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecrementPolicy {
    /// Quantity never goes below `floor`; the line is kept at the floor.
    Clamp { floor: u32 },
    /// Quantity is decremented and the line is deleted once it reaches zero.
    #[default]
    RemoveAtZero,
}

impl DecrementPolicy {
    /// Clamp policy; a floor of zero is raised to one.
    #[must_use]
    pub const fn clamp(floor: u32) -> Self {
        Self::Clamp { floor: if floor == 0 { 1 } else { floor } }
    }

    /// Returns the same policy with a zero clamp floor raised to one.
    #[must_use]
    pub const fn normalized(self) -> Self {
        match self {
            Self::Clamp { floor } => Self::clamp(floor),
            Self::RemoveAtZero => Self::RemoveAtZero,
        }
    }

    /// Lowest quantity a line can hold under this policy.
    #[must_use]
    pub const fn floor(self) -> u32 {
        match self.normalized() {
            Self::Clamp { floor } => floor,
            Self::RemoveAtZero => 0,
        }
    }
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    pub policy: DecrementPolicy,
}

/// Per-session cart store limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub capacity: u64,
    pub idle_timeout_seconds: u64,
}

/// Catalog seed location. Without a seed the catalog starts empty.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub seed: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub filter: Option<String>,
    pub console: bool,
    pub json: bool,
    pub path: Option<PathBuf>,
    pub max_files: usize,
}

// --- Default ---

impl Default for SessionConfig {
    fn default() -> Self {
        Self { capacity: 10_000, idle_timeout_seconds: 1_800 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            filter: None,
            console: true,
            json: false,
            path: None,
            max_files: 10,
        }
    }
}
