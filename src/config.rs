use tracing::trace;

/// Backend connection settings
#[derive(Debug, Clone, serde::Deserialize)]
pub struct BackendConfig {
    /// Base URL of the metric backend, e.g. `http://127.0.0.1:51411`
    pub url: String,

    /// Shared secret forwarded with every request, if the backend expects one
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl BackendConfig {
    /// Settings for an unauthenticated backend with the default timeout
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub backend: BackendConfig,

    /// Glob patterns selecting channels; empty or absent means the
    /// default set
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Seconds between cycle starts
    #[serde(default = "default_interval")]
    pub interval: u64,
}

fn default_interval() -> u64 {
    1
}

fn default_timeout() -> u64 {
    10
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|_| anyhow::anyhow!("Invalid configuration file provided!"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
