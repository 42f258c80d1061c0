use thiserror::Error;

/// Activation failures reported back to the host runtime.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InitError {
    #[error("device handle {0:#x} is reserved as invalid")]
    InvalidHandle(u32),
    #[error("driver initialization failed: {0}")]
    Driver(String),
}

#[derive(Error, Debug)]
pub enum TrackingDataError {
    #[error("malformed tracking packet")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file")]
    Parse(#[from] serde_json::Error),
}
