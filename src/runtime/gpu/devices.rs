use tracing::{debug, warn};

use super::{DEVICES_NONE, DEVICES_VOID, ENV_NV_GPU, ERR_GPU_ONLY_BY_UUID, uuid::is_uuid_list};
use crate::runtime::environment::EnvMap;

/// Effective device selection of the container.
///
/// A configured swarm resource variable takes precedence over
/// `NVIDIA_VISIBLE_DEVICES`. `None` means neither is declared, which is not
/// the same as declared-but-empty.
///
/// With `mount_gpu_only_by_uuid` set, anything that is neither a sentinel
/// (empty, `void`, `none`) nor a GPU UUID list is replaced by `none`.
pub fn resolve_devices(
    env: &EnvMap,
    mount_gpu_only_by_uuid: bool,
    swarm_resource: Option<&str>,
) -> Option<String> {
    let devices = swarm_resource
        .and_then(|name| env.get(name))
        .or_else(|| env.get(ENV_NV_GPU))
        .map(str::to_string);

    if !mount_gpu_only_by_uuid {
        return devices;
    }

    match devices {
        Some(ref list) if !is_sentinel(list) && !is_uuid_list(list) => {
            warn!(devices = %list, "{}", ERR_GPU_ONLY_BY_UUID);
            Some(DEVICES_NONE.to_string())
        }
        // Sentinels are interpreted by the caller: unset means different
        // things for legacy and modern images.
        devices => {
            debug!("Device selection {:?} accepted", devices);
            devices
        }
    }
}

fn is_sentinel(devices: &str) -> bool {
    matches!(devices, "" | DEVICES_VOID | DEVICES_NONE)
}
