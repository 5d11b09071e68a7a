use tracing::debug;

use crate::error::EnvError;
use crate::runtime::gpu::{ENV_NV_GPU, uuid::is_uuid_list};

/// Container environment collapsed from the `KEY=VALUE` list of an OCI spec.
///
/// Keys keep the position of their first declaration, so iteration order is
/// the declaration order of the source spec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap {
    entries: Vec<(String, String)>,
}

impl EnvMap {
    /// Build the mapping from raw declarations.
    ///
    /// The last declaration of a key wins. With `mount_gpu_only_by_uuid` set,
    /// `NVIDIA_VISIBLE_DEVICES` keeps the last declaration that is a GPU UUID
    /// list, falling back to its first declaration when none is.
    pub fn from_entries<I, S>(entries: I, mount_gpu_only_by_uuid: bool) -> Result<Self, EnvError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut env = Self::default();

        for entry in entries {
            let entry = entry.as_ref();
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| EnvError::MissingSeparator {
                    entry: entry.to_string(),
                })?;

            if mount_gpu_only_by_uuid
                && key == ENV_NV_GPU
                && env.contains_key(key)
                && !is_uuid_list(value)
            {
                debug!("Ignoring non-UUID redeclaration {}={}", key, value);
                continue;
            }

            env.insert(key, value);
        }

        Ok(env)
    }

    fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
