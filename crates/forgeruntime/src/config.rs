use std::str::FromStr;

pub const ENV_BACKEND: &str = "FORGE_BACKEND";
pub const ENV_REMOTE_URL: &str = "FORGE_REMOTE_URL";
pub const ENV_TIMEOUT_MS: &str = "FORGE_TIMEOUT_MS";

/// Which simulation backend the runtime talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendMode {
    /// Project in-process
    #[default]
    Local,
    /// Call a remote simulation service, falling back to local on failure
    Remote,
}

impl FromStr for BackendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "mock" => Ok(BackendMode::Local),
            "remote" | "http" => Ok(BackendMode::Remote),
            other => Err(format!("unknown backend mode: {}", other)),
        }
    }
}

/// Configuration for the runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub backend: BackendMode,
    pub remote_url: String,
    pub request_timeout_ms: u64,
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            backend: BackendMode::Local,
            remote_url: "http://127.0.0.1:3000".to_string(),
            request_timeout_ms: 5000,
            event_buffer_size: 1000,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `FORGE_BACKEND`, `FORGE_REMOTE_URL` and `FORGE_TIMEOUT_MS`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RuntimeConfig::from_env`] with an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(mode) = lookup(ENV_BACKEND) {
            match mode.parse() {
                Ok(mode) => config.backend = mode,
                Err(e) => tracing::warn!("Ignoring {}: {}", ENV_BACKEND, e),
            }
        }

        if let Some(url) = lookup(ENV_REMOTE_URL) {
            config.remote_url = url;
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            match timeout.parse() {
                Ok(ms) => config.request_timeout_ms = ms,
                Err(e) => tracing::warn!("Ignoring {}={}: {}", ENV_TIMEOUT_MS, timeout, e),
            }
        }

        config
    }

    /// Point the runtime at a remote simulation service
    pub fn with_remote(mut self, url: impl Into<String>) -> Self {
        self.backend = BackendMode::Remote;
        self.remote_url = url.into();
        self
    }
}
