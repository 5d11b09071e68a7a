use nvhook::HookConfig;
use nvhook::runtime::prestart;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn bundle(env: &[&str]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let spec = serde_json::json!({
        "ociVersion": "1.0.2",
        "process": { "cwd": "/", "args": ["sh"], "env": env },
        "root": { "path": "rootfs" },
    });
    std::fs::write(temp_dir.path().join("config.json"), spec.to_string()).unwrap();
    temp_dir
}

fn state(pid: u32, bundle: &Path) -> String {
    serde_json::json!({ "ociVersion": "1.0.2", "id": "c1", "pid": pid, "bundle": bundle }).to_string()
}

fn hook_config(dir: &Path, body: &str) -> HookConfig {
    let path = dir.join("config.toml");
    std::fs::write(&path, body).unwrap();
    HookConfig::load_from(&path).unwrap()
}

#[test]
fn test_prestart_builds_cli_invocation() {
    let bundle = bundle(&[
        "PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin",
        "CUDA_VERSION=10.0.130",
        "NVIDIA_REQUIRE_CUDA=cuda>=10.0",
        "NVIDIA_VISIBLE_DEVICES=GPU-83d7ced8-3821-a34c-ce5d-e9264cfa8785",
        "NVIDIA_DRIVER_CAPABILITIES=compute,utility",
    ]);
    let hook = hook_config(
        bundle.path(),
        r#"
mount-gpu-only-by-uuid = true

[nvidia-container-cli]
path = "/usr/bin/nvidia-container-cli"
environment = ["LD_LIBRARY_PATH=/opt/lib"]
ldconfig = "@/sbin/ldconfig.real"
"#,
    );

    let invocation = prestart(&hook, state(4242, bundle.path()).as_bytes())
        .unwrap()
        .expect("GPU container");

    let rootfs = bundle.path().join("rootfs");
    assert_eq!(invocation.program, PathBuf::from("/usr/bin/nvidia-container-cli"));
    assert_eq!(
        invocation.args,
        vec![
            "--load-kmods".to_string(),
            "configure".to_string(),
            "--ldconfig=@/sbin/ldconfig.real".to_string(),
            "--device=GPU-83d7ced8-3821-a34c-ce5d-e9264cfa8785".to_string(),
            "--compute".to_string(),
            "--utility".to_string(),
            "--require=cuda>=10.0".to_string(),
            "--pid=4242".to_string(),
            rootfs.to_string_lossy().into_owned(),
        ]
    );
    assert_eq!(
        invocation.env,
        vec![("LD_LIBRARY_PATH".to_string(), "/opt/lib".to_string())]
    );
}

#[test]
fn test_prestart_cpu_container_is_skipped() {
    let bundle = bundle(&["PATH=/usr/bin"]);
    let hook = HookConfig::default();
    let invocation = prestart(&hook, state(1, bundle.path()).as_bytes()).unwrap();
    assert!(invocation.is_none());
}

#[test]
fn test_prestart_legacy_image_with_disabled_requirements() {
    let bundle = bundle(&["CUDA_VERSION=8.0", "NVIDIA_VISIBLE_DEVICES=0"]);
    let hook = hook_config(
        bundle.path(),
        r#"
disable-require = true

[nvidia-container-cli]
path = "/usr/bin/nvidia-container-cli"
load-kmods = false
"#,
    );

    let invocation = prestart(&hook, state(9, bundle.path()).as_bytes())
        .unwrap()
        .unwrap();
    assert!(invocation.args.iter().any(|a| a == "--device=0"));
    assert!(invocation.args.iter().any(|a| a == "--display"));
    assert!(!invocation.args.iter().any(|a| a.starts_with("--require")));
    assert!(!invocation.args.iter().any(|a| a == "--load-kmods"));
}

#[test]
fn test_prestart_unknown_capability_fails() {
    let bundle = bundle(&["NVIDIA_VISIBLE_DEVICES=all", "NVIDIA_DRIVER_CAPABILITIES=compute,fpga"]);
    let mut hook = HookConfig::default();
    hook.nvidia_container_cli.path = Some(PathBuf::from("/usr/bin/nvidia-container-cli"));

    let err = prestart(&hook, state(1, bundle.path()).as_bytes()).unwrap_err();
    assert!(err.to_string().contains("fpga"));
}

#[test]
fn test_prestart_missing_bundle_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("does-not-exist");
    let err = prestart(&HookConfig::default(), state(1, &missing).as_bytes()).unwrap_err();
    assert!(err.to_string().contains("could not open OCI spec"));
}
