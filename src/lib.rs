//! nvhook - OCI prestart hook for NVIDIA GPU containers
//!
//! Resolves from a container's environment and the administrator policy
//! whether the container gets GPUs, which devices and driver capabilities it
//! gets, and which requirements must hold, then hands the result to
//! nvidia-container-cli.

pub mod config;
pub mod error;
pub mod monitoring;
pub mod runtime;

pub use config::{HookConfig, Policy};
pub use error::{HookError, Result};
pub use runtime::environment::EnvMap;
pub use runtime::gpu::{NvidiaConfig, resolve};

/// Parse a container's `KEY=VALUE` environment and resolve its GPU
/// configuration in one step.
pub fn resolve_env<I, S>(entries: I, policy: &Policy) -> Result<Option<NvidiaConfig>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let env = EnvMap::from_entries(entries, policy.mount_gpu_only_by_uuid)?;
    resolve(&env, policy)
}
