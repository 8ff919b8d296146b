//! 配置加载和管理模块
//! 处理配置文件的读取、写入、环境变量覆盖和默认值生成

use super::types::*;
use super::validator::ConfigValidator;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从YAML文件读取配置
    pub fn read_yaml(path: impl AsRef<Path>) -> Result<Config> {
        let config_str = fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&config_str)?;
        Ok(config)
    }

    /// 从进程环境变量读取配置覆盖
    pub fn apply_env_overrides(config: Config) -> Config {
        Self::apply_overrides_from(config, |key| std::env::var(key).ok())
    }

    /// 按给定的查询函数应用覆盖
    ///
    /// 覆盖结果记录在 `Config::overrides` 中：配置加载早于日志初始化，
    /// 由调用方在日志就绪后输出，无效值由验证器报告为警告。
    pub fn apply_overrides_from<F>(mut config: Config, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(identifier) = lookup("VERSION_PROBE_IDENTIFIER") {
            let trimmed = identifier.trim();
            if trimmed.is_empty() {
                config.deployment.identifier = None;
            } else {
                config.deployment.identifier = Some(trimmed.to_string());
            }
            config.record_override("VERSION_PROBE_IDENTIFIER", trimmed, true);
        }

        if let Some(raw) = lookup("VERSION_PROBE_REGISTRY") {
            match RegistryType::parse(&raw) {
                Some(registry_type) => {
                    config.registry.registry_type = registry_type;
                    config.record_override("VERSION_PROBE_REGISTRY", &raw, true);
                }
                None => config.record_override("VERSION_PROBE_REGISTRY", &raw, false),
            }
        }

        if let Some(path) = lookup("VERSION_PROBE_MANIFEST") {
            config.record_override("VERSION_PROBE_MANIFEST", &path, true);
            config.registry.manifest_path = path;
        }

        if let Some(prefix) = lookup("VERSION_PROBE_ENV_PREFIX") {
            config.record_override("VERSION_PROBE_ENV_PREFIX", &prefix, true);
            config.registry.env_prefix = prefix;
        }

        if let Some(marker) = lookup("VERSION_PROBE_UNAVAILABLE_MARKER") {
            config.record_override("VERSION_PROBE_UNAVAILABLE_MARKER", &marker, true);
            config.report.unavailable_marker = marker;
        }

        if let Some(level) = lookup("VERSION_PROBE_LOG_LEVEL") {
            config.record_override("VERSION_PROBE_LOG_LEVEL", &level, true);
            config.logging.level = level;
        }

        config
    }

    /// 读取配置文件、应用环境变量覆盖并验证
    pub fn load_with_env_overrides(path: impl AsRef<Path>) -> Result<Config> {
        let base_config = Self::read_yaml(path)?;
        let config = Self::apply_env_overrides(base_config);
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// 配置文件不存在时使用默认配置；存在但无法解析时返回错误
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load_with_env_overrides(path);
        }

        let config = Self::apply_env_overrides(Config::default());
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// 验证配置的有效性，存在错误项时返回第一条
    pub fn validate_config(config: &Config) -> Result<()> {
        let report = ConfigValidator::validate_all(config);
        if let Some(issue) = report.errors.first() {
            return Err(anyhow::anyhow!("配置无效 [{}]: {}", issue.field, issue.message));
        }
        Ok(())
    }

    /// 查找配置文件路径，适应开发和生产环境
    pub fn find_config_file_path(filename: &str) -> PathBuf {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        // 情况1：当前目录下的 config/
        let config_in_current = current_dir.join("config").join(filename);
        if config_in_current.exists() {
            return config_in_current;
        }

        // 情况2：在 bin/ 目录运行时，上级目录的 config/
        if let Some(parent) = current_dir.parent() {
            let config_in_parent = parent.join("config").join(filename);
            if config_in_parent.exists() {
                return config_in_parent;
            }
        }

        // 情况3：可执行文件位于 bin/ 时，项目根目录的 config/
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .as_deref()
            .and_then(Path::parent)
        {
            if exe_dir.file_name() == Some(std::ffi::OsStr::new("bin")) {
                if let Some(project_root) = exe_dir.parent() {
                    let config_in_root = project_root.join("config").join(filename);
                    if config_in_root.exists() {
                        return config_in_root;
                    }
                }
            }
        }

        current_dir.join(filename)
    }
}

/// 配置写入器
pub struct ConfigWriter;

impl ConfigWriter {
    /// 将配置写入YAML文件
    pub fn write_yaml(config: &Config, path: impl AsRef<Path>) -> Result<()> {
        let yaml_content = serde_yaml::to_string(config)?;
        fs::write(path, yaml_content)?;
        Ok(())
    }

    /// 写入配置到指定路径，确保目录存在
    pub fn write_yaml_with_dir(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::write_yaml(config, path)
    }

    /// 生成配置模板
    pub fn generate_template() -> Config {
        Config {
            deployment: DeploymentConfig::default(),
            registry: RegistryConfig::default(),
            report: ReportConfig::default(),
            logging: LoggingConfig::default(),
            overrides: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_template_defaults() {
        let config = ConfigWriter::generate_template();
        assert_eq!(config.deployment.resolved_identifier(), crate::build_info::PACKAGE_NAME);
        assert_eq!(config.registry.registry_type, RegistryType::Manifest);
        assert_eq!(config.registry.manifest_path, "deployments.yaml");
        assert_eq!(config.registry.env_prefix, "DEPLOYED");
        assert_eq!(config.report.unavailable_marker, "unavailable");
        assert!(!config.logging.file.enabled);
    }

    #[test]
    fn test_write_then_read_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.yaml");

        let mut config = ConfigWriter::generate_template();
        config.deployment.identifier = Some("billing-service".to_string());
        config.registry.registry_type = RegistryType::Env;
        config.write_yaml_to_path(&path).unwrap();

        let loaded = Config::read_yaml(&path).unwrap();
        assert_eq!(loaded.deployment.resolved_identifier(), "billing-service");
        assert_eq!(loaded.registry.registry_type, RegistryType::Env);
    }

    #[test]
    fn test_partial_yaml_uses_section_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "registry:\n  type: memory\n  records:\n    app:\n      sequence: 7\n      label: \"1.2.3\"\n").unwrap();

        let config = ConfigLoader::read_yaml(&path).unwrap();
        assert_eq!(config.registry.registry_type, RegistryType::Memory);
        assert_eq!(config.registry.manifest_path, "deployments.yaml");
        assert_eq!(config.registry.records.len(), 1);
        assert_eq!(config.report.unavailable_marker, "unavailable");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_apply_overrides() {
        let vars: HashMap<&str, &str> = [
            ("VERSION_PROBE_IDENTIFIER", " checkout "),
            ("VERSION_PROBE_REGISTRY", "env"),
            ("VERSION_PROBE_ENV_PREFIX", "INSTALLED"),
            ("VERSION_PROBE_UNAVAILABLE_MARKER", "n/a"),
            ("VERSION_PROBE_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let config = ConfigLoader::apply_overrides_from(ConfigWriter::generate_template(), |key| {
            vars.get(key).map(|v| v.to_string())
        });

        assert_eq!(config.deployment.resolved_identifier(), "checkout");
        assert_eq!(config.registry.registry_type, RegistryType::Env);
        assert_eq!(config.registry.env_prefix, "INSTALLED");
        assert_eq!(config.report.unavailable_marker, "n/a");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.overrides.len(), 5);
        assert!(config.overrides.iter().all(|o| o.applied));
        assert_eq!(config.overrides[0].key, "VERSION_PROBE_IDENTIFIER");
        assert_eq!(config.overrides[0].value, "checkout");
    }

    #[test]
    fn test_invalid_registry_override_is_ignored() {
        let config = ConfigLoader::apply_overrides_from(ConfigWriter::generate_template(), |key| {
            (key == "VERSION_PROBE_REGISTRY").then(|| "database".to_string())
        });
        assert_eq!(config.registry.registry_type, RegistryType::Manifest);

        let report = ConfigValidator::validate_all(&config);
        assert!(report.is_valid());
        let warning = report
            .warnings
            .iter()
            .find(|issue| issue.field == "VERSION_PROBE_REGISTRY")
            .unwrap();
        assert!(warning.message.contains("database"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::load_or_default(temp_dir.path().join("config.yaml")).unwrap();
        assert_eq!(config.registry.registry_type, RegistryType::Manifest);
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "report:\n  unavailable_marker: \"a....b\"\n").unwrap();

        assert!(ConfigLoader::load_with_env_overrides(&path).is_err());
    }

    #[test]
    fn test_load_rejects_malformed_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "registry: [unclosed\n").unwrap();

        assert!(ConfigLoader::load_or_default(&path).is_err());
    }
}
