//! 配置数据结构定义

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::model::VersionIdentity;

/// 主配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub deployment: DeploymentConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    /// 本次加载应用（或忽略）的环境变量覆盖，不写入配置文件
    #[serde(skip)]
    pub overrides: Vec<ConfigOverride>,
}

impl Config {
    pub(crate) fn record_override(&mut self, key: &str, value: &str, applied: bool) {
        self.overrides.push(ConfigOverride {
            key: key.to_string(),
            value: value.to_string(),
            applied,
        });
    }
}

/// 一条环境变量覆盖记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOverride {
    pub key: String,
    pub value: String,
    /// false 表示取值无效、已忽略
    pub applied: bool,
}

/// 部署标识配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// 部署标识，未配置时使用二进制自身的包名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl DeploymentConfig {
    pub fn resolved_identifier(&self) -> String {
        self.identifier
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(crate::build_info::PACKAGE_NAME)
            .to_string()
    }
}

/// 部署元数据来源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryType {
    Manifest,
    Env,
    Memory,
}

impl RegistryType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "manifest" => Some(Self::Manifest),
            "env" => Some(Self::Env),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// 部署元数据来源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(rename = "type", default = "default_registry_type")]
    pub registry_type: RegistryType,

    /// 部署清单路径（manifest）
    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,

    /// 环境变量前缀（env）
    #[serde(default = "default_env_prefix")]
    pub env_prefix: String,

    /// 内联部署记录（memory）
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub records: BTreeMap<String, VersionIdentity>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            registry_type: default_registry_type(),
            manifest_path: default_manifest_path(),
            env_prefix: default_env_prefix(),
            records: BTreeMap::new(),
        }
    }
}

fn default_registry_type() -> RegistryType {
    RegistryType::Manifest
}

fn default_manifest_path() -> String {
    "deployments.yaml".to_string()
}

fn default_env_prefix() -> String {
    crate::registry::env::DEFAULT_ENV_PREFIX.to_string()
}

/// 报告输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// 运行时版本不可用时的占位文本
    #[serde(default = "default_unavailable_marker")]
    pub unavailable_marker: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            unavailable_marker: default_unavailable_marker(),
        }
    }
}

fn default_unavailable_marker() -> String {
    crate::reporter::DEFAULT_UNAVAILABLE_MARKER.to_string()
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: LogFileConfig,
    pub structured: Option<bool>,
    #[serde(default)]
    pub level_config: Option<LevelConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: LogFileConfig::default(),
            structured: Some(false),
            level_config: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// 日志文件配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogFileConfig {
    pub enabled: bool,
    pub directory: String,
    pub retention_days: Option<u32>,
}

impl Default for LogFileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: "logs".to_string(),
            retention_days: Some(7),
        }
    }
}

/// 日志级别配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default)]
    pub registry: Option<String>,
    #[serde(default)]
    pub reporter: Option<String>,
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}
