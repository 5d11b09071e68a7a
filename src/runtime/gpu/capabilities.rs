use super::ENV_NV_DRIVER_CAPABILITIES;
use crate::runtime::environment::EnvMap;

/// Raw `NVIDIA_DRIVER_CAPABILITIES`, including an empty value.
///
/// Defaulting and `all` expansion depend on the image generation and are
/// left to the caller.
pub fn capabilities(env: &EnvMap) -> Option<&str> {
    env.get(ENV_NV_DRIVER_CAPABILITIES)
}
