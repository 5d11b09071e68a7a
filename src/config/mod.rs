use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ConfigError;

/// Default location of the administrator configuration
pub const DEFAULT_CONFIG_PATH: &str = "/etc/nvidia-container-runtime/config.toml";

/// Options forwarded to nvidia-container-cli
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct CliConfig {
    pub root: Option<PathBuf>,
    pub path: Option<PathBuf>,
    pub environment: Vec<String>,
    pub debug: Option<PathBuf>,
    pub ldcache: Option<PathBuf>,
    pub load_kmods: bool,
    pub ldconfig: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            root: None,
            path: None,
            environment: Vec::new(),
            debug: None,
            ldcache: None,
            load_kmods: true,
            ldconfig: None,
        }
    }
}

/// Hook configuration as read from `config.toml`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct HookConfig {
    pub disable_require: bool,
    pub swarm_resource: Option<String>,
    /// Only mount GPUs that were selected by UUID (scheduler-assigned devices).
    pub mount_gpu_only_by_uuid: bool,
    pub nvidia_container_cli: CliConfig,
}

/// Resolution policy derived from the administrator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    pub mount_gpu_only_by_uuid: bool,
    pub disable_require: bool,
    pub swarm_resource: Option<String>,
}

impl Policy {
    pub fn uuid_only() -> Self {
        Self {
            mount_gpu_only_by_uuid: true,
            ..Default::default()
        }
    }
}

impl HookConfig {
    /// Load configuration from `path`. A missing file yields the defaults;
    /// a file that exists but can't be read or parsed is an error.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No configuration at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: HookConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded hook configuration from {:?}", path);
        Ok(config)
    }

    pub fn policy(&self) -> Policy {
        Policy {
            mount_gpu_only_by_uuid: self.mount_gpu_only_by_uuid,
            disable_require: self.disable_require,
            swarm_resource: self.swarm_resource.clone(),
        }
    }
}
