//! GPU configuration resolution.
//!
//! Decides from a container's environment and the administrator policy
//! whether the container gets GPUs, which devices and driver capabilities it
//! gets, and which requirements nvidia-container-cli must check.

use tracing::{debug, info, warn};

pub mod capabilities;
pub mod devices;
pub mod requirements;
pub mod uuid;
pub mod version;

use crate::Result;
use crate::config::Policy;
use crate::runtime::environment::EnvMap;
use version::CudaVersion;

pub const ENV_NV_REQUIRE_PREFIX: &str = "NVIDIA_REQUIRE_";
pub const ENV_LEGACY_CUDA_VERSION: &str = "CUDA_VERSION";
pub const ENV_NV_REQUIRE_CUDA: &str = "NVIDIA_REQUIRE_CUDA";
pub const ENV_NV_GPU: &str = "NVIDIA_VISIBLE_DEVICES";
pub const ENV_NV_DRIVER_CAPABILITIES: &str = "NVIDIA_DRIVER_CAPABILITIES";
pub const ENV_NV_DISABLE_REQUIRE: &str = "NVIDIA_DISABLE_REQUIRE";

pub const DEFAULT_CAPABILITY: &str = "utility";
pub const ALL_CAPABILITIES: &str = "compute,compat32,graphics,utility,video,display";

pub const DEVICES_ALL: &str = "all";
pub const DEVICES_NONE: &str = "none";
pub const DEVICES_VOID: &str = "void";

pub(crate) const ERR_GPU_ONLY_BY_UUID: &str = "Wrong way to use GPUs! \
    If you don't need GPU, use an image without CUDA, or build images with env NVIDIA_VISIBLE_DEVICES=none. \
    Otherwise set pod.spec.containers[*].resources.requests['nvidia.com/gpu'] for kubernetes, \
    or set env NVIDIA_VISIBLE_DEVICES={GPU UUID} for docker.";

/// GPU access granted to a container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NvidiaConfig {
    /// Comma-separated device list; empty means no device is attached.
    pub devices: String,
    pub capabilities: String,
    pub requirements: Vec<String>,
    pub disable_require: bool,
}

/// Image generation, detected from its CUDA variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageGeneration {
    /// Declares only `CUDA_VERSION`.
    Legacy,
    /// Declares `NVIDIA_REQUIRE_CUDA` (or no CUDA at all).
    Modern,
}

impl ImageGeneration {
    pub fn detect(env: &EnvMap) -> Self {
        let legacy_cuda_version = env.get(ENV_LEGACY_CUDA_VERSION).unwrap_or_default();
        let cuda_require = env.get(ENV_NV_REQUIRE_CUDA).unwrap_or_default();

        if !legacy_cuda_version.is_empty() && cuda_require.is_empty() {
            Self::Legacy
        } else {
            Self::Modern
        }
    }
}

/// Resolve the GPU configuration of a container.
///
/// `Ok(None)` means the container is not a GPU container. Errors are fatal
/// to the container start.
pub fn resolve(env: &EnvMap, policy: &Policy) -> Result<Option<NvidiaConfig>> {
    let generation = ImageGeneration::detect(env);
    debug!("Detected {:?} image", generation);

    let config = match generation {
        ImageGeneration::Legacy => resolve_legacy(env, policy)?,
        ImageGeneration::Modern => resolve_modern(env, policy),
    };

    match config {
        Some(ref config) => info!(
            devices = %config.devices,
            capabilities = %config.capabilities,
            requirements = ?config.requirements,
            disable_require = config.disable_require,
            "🟢 Resolved GPU configuration"
        ),
        None => info!("Not a GPU container"),
    }

    Ok(config)
}

/// Legacy images only set `CUDA_VERSION`; mimic what a modern image
/// requesting everything would get.
fn resolve_legacy(env: &EnvMap, policy: &Policy) -> Result<Option<NvidiaConfig>> {
    let devices = match devices::resolve_devices(
        env,
        policy.mount_gpu_only_by_uuid,
        policy.swarm_resource.as_deref(),
    ) {
        None if policy.mount_gpu_only_by_uuid => {
            warn!("{}", ERR_GPU_ONLY_BY_UUID);
            DEVICES_NONE.to_string()
        }
        None => DEVICES_ALL.to_string(),
        Some(d) if d.is_empty() || d == DEVICES_VOID => return Ok(None),
        Some(d) => d,
    };

    let capabilities = match capabilities::capabilities(env) {
        None => ALL_CAPABILITIES,
        Some("") => DEFAULT_CAPABILITY,
        Some(c) => c,
    };

    let mut requirements = requirements::requirements(env);
    let cuda_version = CudaVersion::parse(env.get(ENV_LEGACY_CUDA_VERSION).unwrap_or_default())?;
    requirements.push(cuda_version.requirement());

    Ok(Some(NvidiaConfig {
        devices: attached_devices(devices),
        capabilities: expand_capabilities(capabilities),
        requirements,
        disable_require: disable_require(env),
    }))
}

fn resolve_modern(env: &EnvMap, policy: &Policy) -> Option<NvidiaConfig> {
    let devices = devices::resolve_devices(
        env,
        policy.mount_gpu_only_by_uuid,
        policy.swarm_resource.as_deref(),
    )
    .filter(|d| !d.is_empty() && d != DEVICES_VOID)?;

    let capabilities = match capabilities::capabilities(env) {
        None | Some("") => DEFAULT_CAPABILITY,
        Some(c) => c,
    };

    Some(NvidiaConfig {
        devices: attached_devices(devices),
        capabilities: expand_capabilities(capabilities),
        requirements: requirements::requirements(env),
        disable_require: disable_require(env),
    })
}

/// `none` asks for a GPU-capable container without devices.
fn attached_devices(devices: String) -> String {
    if devices == DEVICES_NONE {
        String::new()
    } else {
        devices
    }
}

fn expand_capabilities(capabilities: &str) -> String {
    if capabilities == "all" {
        ALL_CAPABILITIES.to_string()
    } else {
        capabilities.to_string()
    }
}

// Invalid values never fail the container start.
fn disable_require(env: &EnvMap) -> bool {
    env.get(ENV_NV_DISABLE_REQUIRE)
        .and_then(parse_bool)
        .unwrap_or(false)
}

/// Boolean spellings accepted in `NVIDIA_DISABLE_REQUIRE`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
