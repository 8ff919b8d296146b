use std::io::Write;
use std::path::PathBuf;

use version_probe::util::config::{Config, ConfigLoader, ConfigValidator, ConfigWriter};
use version_probe::util::log::log_init_with_config;
use version_probe::util::logging::standards::events;
use version_probe::{build_info, IdentityReporter, CONFIG_FILE_NAME};

const USAGE: &str = "\
用法: version-probe [命令]

命令:
  report, --report        输出版本对比 <build>....<runtime>（默认）
  json, --json            以JSON输出版本对比
  build, --build          只输出编译期版本信息
  check-config            验证配置文件
  init-config [PATH]      生成配置模板
  -V, --version           输出版本
  -h, --help              输出帮助";

fn main() -> anyhow::Result<()> {
    std::panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s
        } else {
            "Unknown panic payload"
        };

        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "Unknown location".to_string());

        eprintln!("[PANIC] 程序异常退出");
        eprintln!("位置: {}", location);
        eprintln!("原因: {}", message);
        eprintln!(
            "时间: {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        std::io::stderr().flush().ok();
    }));

    let mut args = std::env::args();
    let _ = args.next();

    match args.next().as_deref() {
        None | Some("report") | Some("--report") => run_report(false),
        Some("json") | Some("--json") => run_report(true),
        Some("build") | Some("--build") => {
            println!("{}", build_info::summary());
            Ok(())
        }
        Some("check-config") | Some("--check-config") => check_config(),
        Some("init-config") | Some("--init-config") => init_config(args.next().map(PathBuf::from)),
        Some("-V") | Some("--version") => {
            println!("{}", build_info::summary());
            Ok(())
        }
        Some("-h") | Some("--help") | Some("help") => {
            println!("{USAGE}");
            Ok(())
        }
        Some(other) => {
            eprintln!("未知命令: {other}\n\n{USAGE}");
            std::process::exit(2);
        }
    }
}

fn run_report(as_json: bool) -> anyhow::Result<()> {
    let config = version_probe::load_config()?;

    // 日志初始化失败不影响报告输出
    let _log_guard = match log_init_with_config("version-probe", &config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("[warn] 日志系统初始化失败: {e}");
            None
        }
    };

    // 配置加载早于日志初始化，覆盖记录在此补发
    for item in &config.overrides {
        if item.applied {
            tracing::debug!(event = events::CONFIG_OVERRIDE, key = %item.key, value = %item.value);
        } else {
            tracing::warn!(event = events::CONFIG_OVERRIDE_INVALID, key = %item.key, value = %item.value);
        }
    }

    for issue in ConfigValidator::validate_all(&config).warnings {
        tracing::warn!(
            event = events::CONFIG_VALIDATION_WARNING,
            field = %issue.field,
            message = %issue.message
        );
    }

    let reporter = IdentityReporter::from_config(&config);
    let report = reporter.report();

    tracing::info!(
        event = events::REPORT_RENDERED,
        identifier = reporter.identifier(),
        runtime_available = report.runtime().is_some(),
        rendered = %report
    );

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn check_config() -> anyhow::Result<()> {
    let config_path = version_probe::find_config_file_path(CONFIG_FILE_NAME);
    let config = if config_path.exists() {
        ConfigLoader::apply_env_overrides(Config::read_yaml(&config_path)?)
    } else {
        println!("配置文件不存在，检查默认配置: {}", config_path.display());
        ConfigLoader::apply_env_overrides(Config::default())
    };

    let report = ConfigValidator::validate_all(&config);
    for issue in &report.info {
        println!("[info] {}: {}", issue.field, issue.message);
    }
    for issue in &report.warnings {
        println!("[warn] {}: {}", issue.field, issue.message);
    }
    for issue in &report.errors {
        println!("[error] {}: {}", issue.field, issue.message);
    }

    if report.has_errors() {
        anyhow::bail!("配置验证失败: {} 个错误", report.errors.len());
    }
    println!(
        "[ok] 配置有效: deployment={}, registry={:?}",
        config.deployment.resolved_identifier(),
        config.registry.registry_type
    );
    Ok(())
}

fn init_config(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(|| version_probe::find_config_file_path(CONFIG_FILE_NAME));
    if path.exists() {
        anyhow::bail!("配置文件已存在，不覆盖: {}", path.display());
    }

    ConfigWriter::write_yaml_with_dir(&ConfigWriter::generate_template(), &path)?;
    println!("已生成配置模板: {}", path.display());
    Ok(())
}
