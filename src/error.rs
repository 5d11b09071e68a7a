use std::path::PathBuf;
use thiserror::Error;

/// Hook error types. Every variant aborts the container start.
#[derive(Error, Debug)]
pub enum HookError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Environment error: {0}")]
    Environment(#[from] EnvError),

    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    #[error("OCI spec error: {0}")]
    Spec(#[from] SpecError),

    #[error("nvidia-container-cli error: {0}")]
    Cli(#[from] CliError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("couldn't open configuration file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't parse configuration file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("environment entry has no '=' separator: {entry:?}")]
    MissingSeparator { entry: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid CUDA version: {version:?}")]
    Invalid { version: String },
}

#[derive(Error, Debug)]
pub enum SpecError {
    #[error("could not decode container state: {0}")]
    State(#[source] serde_json::Error),

    #[error("could not open OCI spec {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode OCI spec {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{section} is empty in OCI spec")]
    MissingSection { section: &'static str },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CliError {
    #[error("unknown driver capability: {capability:?}")]
    UnknownCapability { capability: String },

    #[error("couldn't find binary nvidia-container-cli in PATH {path:?}")]
    NotFound { path: String },
}

/// Convenience type alias for hook results
pub type Result<T, E = HookError> = std::result::Result<T, E>;
