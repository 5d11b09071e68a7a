use regex::Regex;
use std::sync::LazyLock;

/// Device identifier grammar accepted by nvidia-container-cli for GPU UUIDs.
/// Kept identical to the CLI's so nothing accepted here is rejected later.
const GPU_UUID_LIST_PATTERN: &str =
    r"^[gG][pP][uU]-([0-9a-fA-F-]){1,75}(,|,[gG][pP][uU]-([0-9a-fA-F-]){1,75})*$";

static GPU_UUID_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(GPU_UUID_LIST_PATTERN).expect("GPU UUID list pattern is valid")
});

/// Whether `devices` is a comma-separated list of GPU UUIDs (`GPU-...`).
pub fn is_uuid_list(devices: &str) -> bool {
    GPU_UUID_LIST.is_match(devices)
}
