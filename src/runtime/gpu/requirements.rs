use super::ENV_NV_REQUIRE_PREFIX;
use crate::runtime::environment::EnvMap;

/// Values of every `NVIDIA_REQUIRE_*` variable, in declaration order.
pub fn requirements(env: &EnvMap) -> Vec<String> {
    env.iter()
        .filter(|(name, _)| name.starts_with(ENV_NV_REQUIRE_PREFIX))
        .map(|(_, value)| value.to_string())
        .collect()
}
