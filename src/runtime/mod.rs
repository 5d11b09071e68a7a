use std::io::Read;
use tracing::info;

use crate::Result;
use crate::config::HookConfig;

pub mod cli;
pub mod environment;
pub mod gpu;
pub mod oci;

use cli::CliInvocation;
use oci::ContainerConfig;

/// Run the prestart resolution for the container described by `state`.
///
/// Returns the nvidia-container-cli invocation to hand over to, or `None`
/// when the container doesn't get GPU access.
pub fn prestart<R: Read>(hook: &HookConfig, state: R) -> Result<Option<CliInvocation>> {
    let policy = hook.policy();
    let container = ContainerConfig::load(state, &policy)?;

    let Some(ref nvidia) = container.nvidia else {
        info!("No GPU requested, nothing to configure");
        return Ok(None);
    };

    let invocation = CliInvocation::new(hook, nvidia, container.pid, &container.rootfs)?;
    Ok(Some(invocation))
}
