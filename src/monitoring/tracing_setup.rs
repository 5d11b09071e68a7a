use anyhow::{Context, Result, anyhow};
use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging setup for the hook process.
///
/// Log output goes to stderr: the container runtime owns stdout and stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub log_level: String,
    pub enable_json_logs: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_json_logs: false,
            log_file: None,
        }
    }
}

impl TracingConfig {
    pub fn new(debug: bool, enable_json_logs: bool, log_file: Option<PathBuf>) -> Self {
        Self {
            log_level: if debug { "debug" } else { "info" }.to_string(),
            enable_json_logs,
            log_file,
        }
    }

    /// Install the global subscriber. `RUST_LOG` takes precedence over the
    /// configured level. The file sink is flushed when the returned guard is
    /// dropped, which has to happen before the process execs.
    pub fn init_tracing(&self) -> Result<Option<WorkerGuard>> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

        let console_layer = fmt::layer().with_target(false).with_writer(io::stderr);
        if self.enable_json_logs {
            layers.push(console_layer.json().flatten_event(true).boxed());
        } else {
            layers.push(console_layer.compact().boxed());
        }

        let guard = match self.log_file {
            Some(ref path) => {
                let file_name = path
                    .file_name()
                    .ok_or_else(|| anyhow!("Log file path has no file name: {:?}", path))?;
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| std::path::Path::new("."));
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory {:?}", dir))?;

                let file_appender = tracing_appender::rolling::never(dir, file_name);
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                layers.push(
                    fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .json()
                        .boxed(),
                );
                Some(guard)
            }
            None => None,
        };

        tracing_subscriber::registry()
            .with(layers)
            .with(env_filter)
            .try_init()
            .context("Failed to install tracing subscriber")?;

        Ok(guard)
    }
}
