use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::Result;
use crate::config::Policy;
use crate::error::SpecError;
use crate::runtime::environment::EnvMap;
use crate::runtime::gpu::{self, NvidiaConfig};

/// Container state handed to the hook on stdin.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct HookState {
    #[serde(default)]
    pub pid: u32,
    /// runtime-spec state (runc >= 17.06)
    #[serde(default)]
    pub bundle: PathBuf,
    /// Pre-runtime-spec runc state
    #[serde(default, rename = "bundlePath")]
    pub bundle_path: PathBuf,
}

impl HookState {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SpecError> {
        serde_json::from_reader(reader).map_err(SpecError::State)
    }

    pub fn bundle_dir(&self) -> &Path {
        if self.bundle.as_os_str().is_empty() {
            &self.bundle_path
        } else {
            &self.bundle
        }
    }
}

/// The parts of the bundle's `config.json` the hook reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Spec {
    pub process: Option<Process>,
    pub root: Option<Root>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Process {
    #[serde(default)]
    pub env: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Root {
    pub path: PathBuf,
}

impl Spec {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SpecError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let spec: Spec = serde_json::from_str(&content).map_err(|source| SpecError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        if spec.process.is_none() {
            return Err(SpecError::MissingSection { section: "Process" });
        }
        if spec.root.is_none() {
            return Err(SpecError::MissingSection { section: "Root" });
        }

        Ok(spec)
    }
}

/// Everything the hook knows about the container being started.
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    pub pid: u32,
    pub rootfs: PathBuf,
    pub nvidia: Option<NvidiaConfig>,
}

impl ContainerConfig {
    /// Read the container state from `state`, load its bundle and resolve its
    /// GPU configuration.
    pub fn load<R: Read>(state: R, policy: &Policy) -> Result<Self> {
        let state = HookState::from_reader(state)?;
        let bundle = state.bundle_dir();
        debug!("Container pid {} with bundle {:?}", state.pid, bundle);

        let spec = Spec::load(bundle.join("config.json"))?;
        Self::from_spec(&state, spec, policy)
    }

    pub fn from_spec(state: &HookState, spec: Spec, policy: &Policy) -> Result<Self> {
        let process = spec
            .process
            .ok_or(SpecError::MissingSection { section: "Process" })?;
        let root = spec
            .root
            .ok_or(SpecError::MissingSection { section: "Root" })?;

        let env = EnvMap::from_entries(&process.env, policy.mount_gpu_only_by_uuid)?;
        let nvidia = gpu::resolve(&env, policy)?;

        let rootfs = if root.path.is_absolute() {
            root.path
        } else {
            state.bundle_dir().join(root.path)
        };
        info!("📦 Container rootfs: {:?}", rootfs);

        Ok(Self {
            pid: state.pid,
            rootfs,
            nvidia,
        })
    }
}
