use crate::util::config::{LevelConfig, LoggingConfig};
use crate::util::logging::standards::events;
use std::io;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::daily;
use tracing_subscriber::fmt::format::Format;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{filter::EnvFilter, Layer, Registry};

/// 初始化日志系统
///
/// 控制台日志写到 stderr，stdout 只输出报告本身。
/// 启用文件日志时额外按天滚动写入 `<directory>/<file_prefix>.log.<date>`，
/// 返回的 guard 需要持有到进程结束，否则缓冲中的日志会丢失。
pub fn log_init_with_config(
    file_prefix: &str,
    config: &LoggingConfig,
) -> anyhow::Result<Option<WorkerGuard>> {
    let level_filter = parse_level_filter(&config.level);
    let filter_expression = build_env_filter_expression(level_filter, config.level_config.as_ref());
    let use_json = config.structured.unwrap_or(false);

    let console_filter = EnvFilter::try_new(filter_expression.as_str())
        .unwrap_or_else(|_| EnvFilter::new(level_filter_to_str(level_filter)));

    let console_layer = if use_json {
        layer()
            .json()
            .with_target(false)
            .with_writer(io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        layer()
            .event_format(
                Format::default()
                    .without_time()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .with_writer(io::stderr)
            .with_filter(console_filter)
            .boxed()
    };

    if !config.file.enabled {
        Registry::default().with(console_layer).try_init()?;
        tracing::debug!(
            event = events::LOG_INIT,
            level = %config.level,
            console = true,
            file = false,
            structured = use_json
        );
        return Ok(None);
    }

    let log_dir = resolve_log_dir(&config.file.directory);
    std::fs::create_dir_all(&log_dir)?;

    let file_filter = EnvFilter::try_new(filter_expression.as_str())
        .unwrap_or_else(|_| EnvFilter::new(level_filter_to_str(level_filter)));
    let file_appender = daily(&log_dir, format!("{}.log", file_prefix));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = if use_json {
        layer()
            .json()
            .with_ansi(false)
            .with_writer(non_blocking)
            .with_filter(file_filter)
            .boxed()
    } else {
        layer()
            .event_format(Format::default().with_target(true))
            .with_ansi(false)
            .with_writer(non_blocking)
            .with_filter(file_filter)
            .boxed()
    };

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::debug!(
        event = events::LOG_INIT,
        level = %config.level,
        console = true,
        file = true,
        directory = %log_dir.display(),
        rotation = "daily",
        structured = use_json
    );

    if let Some(retention_days) = config.file.retention_days.filter(|days| *days > 0) {
        tracing::debug!(event = events::LOG_RETENTION, days = retention_days);
        if let Err(e) = cleanup_old_logs(&log_dir, file_prefix, retention_days) {
            tracing::warn!("日志清理失败: {}", e);
        }
    }

    Ok(Some(guard))
}

/// 相对路径基于当前目录；在 bin/ 下运行时基于上级目录
fn resolve_log_dir(directory: &str) -> PathBuf {
    let path = Path::new(directory);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if current_dir.file_name() == Some(std::ffi::OsStr::new("bin")) {
        if let Some(parent) = current_dir.parent() {
            return parent.join(path);
        }
    }
    current_dir.join(path)
}

/// 删除超过保留天数的滚动日志，返回删除的文件数
pub fn cleanup_old_logs(log_dir: &Path, file_prefix: &str, retention_days: u32) -> anyhow::Result<usize> {
    if !log_dir.exists() {
        tracing::debug!("日志目录不存在: {}", log_dir.display());
        return Ok(0);
    }

    let retention = std::time::Duration::from_secs(retention_days as u64 * 24 * 60 * 60);
    let cutoff = std::time::SystemTime::now()
        .checked_sub(retention)
        .unwrap_or(std::time::UNIX_EPOCH);

    let mut deleted_count = 0;
    let mut error_count = 0;

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        // 只处理本程序的日志文件
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("");
        if !file_name.starts_with(file_prefix) {
            continue;
        }

        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }

        let modified = metadata
            .modified()
            .or_else(|_| metadata.created())
            .unwrap_or_else(|_| std::time::SystemTime::now());

        if modified < cutoff {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    deleted_count += 1;
                    tracing::debug!("已删除过期日志: {}", path.display());
                }
                Err(e) => {
                    error_count += 1;
                    tracing::warn!("删除日志文件失败: {} - {}", path.display(), e);
                }
            }
        }
    }

    if error_count > 0 {
        tracing::warn!("有 {} 个文件清理失败", error_count);
    }

    Ok(deleted_count)
}

fn parse_level_filter(level: &str) -> LevelFilter {
    match normalize_level_str(level) {
        Some("trace") => LevelFilter::TRACE,
        Some("debug") => LevelFilter::DEBUG,
        Some("warn") => LevelFilter::WARN,
        Some("error") => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

fn build_env_filter_expression(
    default_level: LevelFilter,
    level_config: Option<&LevelConfig>,
) -> String {
    let mut directives = vec![level_filter_to_str(default_level).to_string()];

    if let Some(cfg) = level_config {
        if let Some(level) = cfg.registry.as_deref().and_then(normalize_level_str) {
            // 显式 target 的事件挂在 registry 下
            directives.push(format!("registry={level}"));
            directives.push(format!("version_probe::registry={level}"));
        }
        if let Some(level) = cfg.reporter.as_deref().and_then(normalize_level_str) {
            directives.push(format!("reporter={level}"));
            directives.push(format!("version_probe::reporter={level}"));
        }

        let mut overrides: Vec<_> = cfg.overrides.iter().collect();
        overrides.sort();
        for (target, level_str) in overrides {
            if let Some(level) = normalize_level_str(level_str) {
                directives.push(format!("{}={level}", normalize_directive_target(target)));
            }
        }
    }

    directives.join(",")
}

fn normalize_level_str(level: &str) -> Option<&'static str> {
    match level.to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

fn level_filter_to_str(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::OFF => "off",
        LevelFilter::ERROR => "error",
        LevelFilter::WARN => "warn",
        LevelFilter::INFO => "info",
        LevelFilter::DEBUG => "debug",
        LevelFilter::TRACE => "trace",
    }
}

fn normalize_directive_target(target: &str) -> String {
    if let Some(raw) = target.strip_prefix("target:") {
        raw.to_string()
    } else if target.contains("::") {
        target.to_string()
    } else {
        let path = target.replace('.', "::");
        format!("version_probe::{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_filter_expression_without_overrides() {
        assert_eq!(build_env_filter_expression(LevelFilter::WARN, None), "warn");
    }

    #[test]
    fn test_filter_expression_with_level_config() {
        let cfg = LevelConfig {
            registry: Some("DEBUG".to_string()),
            reporter: Some("bogus".to_string()),
            overrides: HashMap::from([
                ("util.config".to_string(), "trace".to_string()),
                ("target:custom".to_string(), "error".to_string()),
            ]),
        };

        assert_eq!(
            build_env_filter_expression(LevelFilter::INFO, Some(&cfg)),
            "info,registry=debug,version_probe::registry=debug,custom=error,version_probe::util::config=trace"
        );
    }

    #[test]
    fn test_parse_level_filter_falls_back_to_info() {
        assert_eq!(parse_level_filter("Warn"), LevelFilter::WARN);
        assert_eq!(parse_level_filter("verbose"), LevelFilter::INFO);
    }

    #[test]
    fn test_cleanup_keeps_recent_and_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("version-probe.log.2026-10-18"), "x").unwrap();
        std::fs::write(temp_dir.path().join("other.txt"), "x").unwrap();

        let deleted = cleanup_old_logs(temp_dir.path(), "version-probe", 7).unwrap();
        assert_eq!(deleted, 0);
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_cleanup_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let deleted = cleanup_old_logs(&temp_dir.path().join("absent"), "version-probe", 7).unwrap();
        assert_eq!(deleted, 0);
    }
}
