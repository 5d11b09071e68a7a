use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use crate::config::{CliConfig, HookConfig};
use crate::error::CliError;
use crate::runtime::gpu::NvidiaConfig;

const CLI_BINARY: &str = "nvidia-container-cli";
const DEFAULT_PATH: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

/// A fully built nvidia-container-cli invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl CliInvocation {
    /// Build the `configure` invocation for a GPU container.
    pub fn new(
        hook: &HookConfig,
        nvidia: &NvidiaConfig,
        pid: u32,
        rootfs: &Path,
    ) -> Result<Self, CliError> {
        let cli = &hook.nvidia_container_cli;
        let program = cli_path(cli)?;
        let args = configure_args(hook, nvidia, pid, rootfs)?;

        let env = cli
            .environment
            .iter()
            .filter_map(|entry| match entry.split_once('=') {
                Some((key, value)) => Some((key.to_string(), value.to_string())),
                None => {
                    warn!("Ignoring malformed nvidia-container-cli environment entry {:?}", entry);
                    None
                }
            })
            .collect();

        Ok(Self { program, args, env })
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.envs(self.env.iter().map(|(k, v)| (k, v)));
        cmd
    }

    /// Replace the hook process with nvidia-container-cli. Only returns on
    /// failure. Buffered log sinks must be flushed by the caller beforehand.
    #[cfg(unix)]
    pub fn exec(&self) -> std::io::Error {
        use std::os::unix::process::CommandExt;

        self.command().exec()
    }
}

/// Location of nvidia-container-cli: the configured path, or a lookup in
/// `$PATH` extended with the standard system directories.
pub fn cli_path(cli: &CliConfig) -> Result<PathBuf, CliError> {
    if let Some(ref path) = cli.path {
        return Ok(path.clone());
    }

    let search_path = search_path(std::env::var("PATH").ok().as_deref());
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
    find_cli(&search_path, &cwd)
}

fn search_path(path: Option<&str>) -> String {
    match path {
        Some(path) if !path.is_empty() => format!("{path}:{DEFAULT_PATH}"),
        _ => DEFAULT_PATH.to_string(),
    }
}

fn find_cli(search_path: &str, cwd: &Path) -> Result<PathBuf, CliError> {
    which::which_in(CLI_BINARY, Some(search_path), cwd).map_err(|e| {
        debug!("Lookup of {} failed: {}", CLI_BINARY, e);
        CliError::NotFound {
            path: search_path.to_string(),
        }
    })
}

/// Arguments following the program name.
pub fn configure_args(
    hook: &HookConfig,
    nvidia: &NvidiaConfig,
    pid: u32,
    rootfs: &Path,
) -> Result<Vec<String>, CliError> {
    let cli = &hook.nvidia_container_cli;
    let mut args = Vec::new();

    if let Some(ref root) = cli.root {
        args.push(format!("--root={}", root.display()));
    }
    if cli.load_kmods {
        args.push("--load-kmods".to_string());
    }
    if let Some(ref debug) = cli.debug {
        args.push(format!("--debug={}", debug.display()));
    }
    if let Some(ref ldcache) = cli.ldcache {
        args.push(format!("--ldcache={}", ldcache.display()));
    }

    args.push("configure".to_string());

    if let Some(ref ldconfig) = cli.ldconfig {
        args.push(format!("--ldconfig={ldconfig}"));
    }
    if !nvidia.devices.is_empty() {
        args.push(format!("--device={}", nvidia.devices));
    }

    for capability in nvidia.capabilities.split(',') {
        if capability.is_empty() {
            break;
        }
        args.push(capability_flag(capability)?.to_string());
    }

    if !hook.disable_require && !nvidia.disable_require {
        args.extend(nvidia.requirements.iter().map(|req| format!("--require={req}")));
    }

    args.push(format!("--pid={pid}"));
    args.push(rootfs.to_string_lossy().into_owned());

    Ok(args)
}

pub fn capability_flag(capability: &str) -> Result<&'static str, CliError> {
    match capability {
        "compute" => Ok("--compute"),
        "compat32" => Ok("--compat32"),
        "graphics" => Ok("--graphics"),
        "utility" => Ok("--utility"),
        "video" => Ok("--video"),
        "display" => Ok("--display"),
        _ => Err(CliError::UnknownCapability {
            capability: capability.to_string(),
        }),
    }
}
