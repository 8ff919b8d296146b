//! 配置验证模块
//! 提供配置的验证、检查和诊断功能

use super::types::*;
use crate::reporter::PAIR_SEPARATOR;

/// 配置验证器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 全面验证配置
    pub fn validate_all(config: &Config) -> ValidationReport {
        let mut report = ValidationReport::new();

        Self::validate_deployment_config(&config.deployment, &mut report);
        Self::validate_registry_config(&config.registry, &mut report);
        Self::validate_report_config(&config.report, &mut report);
        Self::validate_logging_config(&config.logging, &mut report);
        Self::validate_overrides(&config.overrides, &mut report);

        report
    }

    /// 验证部署标识
    fn validate_deployment_config(deployment: &DeploymentConfig, report: &mut ValidationReport) {
        match deployment.identifier.as_deref() {
            None => report.add_info(
                "deployment.identifier",
                &format!(
                    "未配置部署标识，使用包名: {}",
                    crate::build_info::PACKAGE_NAME
                ),
            ),
            Some(identifier) if identifier.trim().is_empty() => report.add_warning(
                "deployment.identifier",
                "部署标识为空，将回退到包名",
            ),
            // 首尾空白在解析时会被去掉，只拒绝中间的空白
            Some(identifier) if identifier.trim().chars().any(char::is_whitespace) => report.add_error(
                "deployment.identifier",
                &format!("部署标识不能包含空白字符: {:?}", identifier),
            ),
            Some(_) => {}
        }
    }

    /// 验证部署元数据来源
    fn validate_registry_config(registry: &RegistryConfig, report: &mut ValidationReport) {
        match registry.registry_type {
            RegistryType::Manifest => {
                if registry.manifest_path.trim().is_empty() {
                    report.add_error("registry.manifest_path", "部署清单路径不能为空");
                }
            }
            RegistryType::Env => {
                if !registry
                    .env_prefix
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    report.add_error(
                        "registry.env_prefix",
                        &format!("环境变量前缀只能包含字母、数字和下划线: {}", registry.env_prefix),
                    );
                }
            }
            RegistryType::Memory => {
                if registry.records.is_empty() {
                    report.add_warning("registry.records", "内存部署记录为空，运行时版本将不可用");
                }
            }
        }
    }

    /// 验证报告输出
    fn validate_report_config(report_config: &ReportConfig, report: &mut ValidationReport) {
        let marker = &report_config.unavailable_marker;
        if marker.trim().is_empty() {
            report.add_error("report.unavailable_marker", "占位文本不能为空");
        } else if marker.contains(PAIR_SEPARATOR) {
            report.add_error(
                "report.unavailable_marker",
                &format!("占位文本不能包含分隔符 {PAIR_SEPARATOR}"),
            );
        }
    }

    /// 验证日志配置
    fn validate_logging_config(logging: &LoggingConfig, report: &mut ValidationReport) {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            report.add_warning(
                "logging.level",
                &format!("未知日志级别: {}，将使用 info", logging.level),
            );
        }

        if logging.file.enabled && logging.file.directory.trim().is_empty() {
            report.add_error("logging.file.directory", "启用文件日志时目录不能为空");
        }

        if logging.file.retention_days == Some(0) {
            report.add_warning("logging.file.retention_days", "保留天数为0，日志清理将被跳过");
        }
    }

    /// 无效的环境变量覆盖：已被忽略，沿用配置文件中的值
    fn validate_overrides(overrides: &[ConfigOverride], report: &mut ValidationReport) {
        for item in overrides.iter().filter(|o| !o.applied) {
            report.add_warning(
                &item.key,
                &format!("无效的环境变量取值 {:?}，已忽略", item.value),
            );
        }
    }
}

/// 验证报告
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub info: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue::new(field, message));
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue::new(field, message));
    }

    pub fn add_info(&mut self, field: &str, message: &str) {
        self.info.push(ValidationIssue::new(field, message));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }
}

/// 验证问题
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}
