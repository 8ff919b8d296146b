use chrono::Utc;
use std::{
    env, fs, io,
    path::{Path, PathBuf},
    process::Command,
    sync::LazyLock,
};

static OUT_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    let out_dir = env::var("OUT_DIR").unwrap();
    Path::new(&out_dir)
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
});

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=VERSION");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
    println!("cargo:rerun-if-env-changed=APP_BUILD_SEQUENCE");
    println!("cargo:rerun-if-env-changed=APP_BUILD_LABEL");

    set_build_metadata()?;

    println!("cargo:rerun-if-changed=config.example.yaml");
    copy_config_files()?;

    Ok(())
}

fn set_build_metadata() -> io::Result<()> {
    let git_commit = git_output(&["rev-parse", "--short", "HEAD"])
        .unwrap_or_else(|| "unknown".to_string());

    // 版本标签：环境变量 > VERSION 文件 > Cargo 包版本
    let build_label = env::var("APP_BUILD_LABEL")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            fs::read_to_string("VERSION")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_else(|| env::var("CARGO_PKG_VERSION").unwrap_or_default());

    // 构建序号：环境变量 > git 提交计数 > 0
    let build_sequence = match env::var("APP_BUILD_SEQUENCE") {
        Ok(raw) => {
            let raw = raw.trim().to_string();
            if raw.parse::<u64>().is_err() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("APP_BUILD_SEQUENCE 必须是非负整数: {raw}"),
                ));
            }
            raw
        }
        Err(_) => git_output(&["rev-list", "--count", "HEAD"])
            .filter(|s| s.parse::<u64>().is_ok())
            .unwrap_or_else(|| "0".to_string()),
    };

    let build_timestamp = Utc::now().to_rfc3339();

    println!("cargo:rustc-env=APP_BUILD_SEQUENCE={}", build_sequence);
    println!("cargo:rustc-env=APP_BUILD_LABEL={}", build_label);
    println!("cargo:rustc-env=APP_BUILD_COMMIT={}", git_commit);
    println!("cargo:rustc-env=APP_BUILD_TIMESTAMP={}", build_timestamp);
    println!(
        "cargo:warning=构建版本: {}/{} (commit {})",
        build_sequence, build_label, git_commit
    );

    Ok(())
}

fn git_output(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
}

// 复制示例配置文件到产物目录
fn copy_config_files() -> io::Result<()> {
    if Path::new("config.example.yaml").exists() {
        fs::copy("config.example.yaml", OUT_DIR.join("config.example.yaml"))?;
    }

    Ok(())
}
