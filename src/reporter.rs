//! 版本一致性报告
//!
//! 把编译期版本和运行环境报告的版本并排渲染成一行文本：
//! `<build.sequence>/<build.label>....<runtime.sequence>/<runtime.label>`。
//! 报告只负责并列展示，不判断两者是否"匹配"。

use std::fmt;

use crate::build_info;
use crate::error::NotFoundError;
use crate::model::VersionIdentity;
use crate::registry::DeploymentRegistry;
use crate::util::config::Config;
use crate::util::logging::standards::events;

/// 构建版本与运行时版本之间的分隔符
pub const PAIR_SEPARATOR: &str = "....";

/// 运行时版本不可用时的默认占位文本
pub const DEFAULT_UNAVAILABLE_MARKER: &str = "unavailable";

/// 一次对比的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityReport {
    build: VersionIdentity,
    runtime: Result<VersionIdentity, NotFoundError>,
    unavailable_marker: String,
}

impl IdentityReport {
    pub fn build(&self) -> &VersionIdentity {
        &self.build
    }

    pub fn runtime(&self) -> Option<&VersionIdentity> {
        self.runtime.as_ref().ok()
    }

    pub fn runtime_error(&self) -> Option<&NotFoundError> {
        self.runtime.as_ref().err()
    }

    /// 渲染对比字符串；运行时版本缺失时后半段为占位文本
    pub fn render(&self) -> String {
        match &self.runtime {
            Ok(runtime) => format!("{}{}{}", self.build, PAIR_SEPARATOR, runtime),
            Err(_) => format!("{}{}{}", self.build, PAIR_SEPARATOR, self.unavailable_marker),
        }
    }

    /// 机器可读形式
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "build": self.build,
            "runtime": self.runtime(),
            "runtime_error": self.runtime_error().map(ToString::to_string),
            "rendered": self.render(),
        })
    }
}

impl fmt::Display for IdentityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// 版本一致性报告生成器
///
/// 无状态：每次 [`report`](Self::report) 都重新查询运行环境。
pub struct IdentityReporter<R> {
    registry: R,
    identifier: String,
    build: VersionIdentity,
    unavailable_marker: String,
}

impl<R: DeploymentRegistry> IdentityReporter<R> {
    pub fn new(registry: R, identifier: impl Into<String>) -> Self {
        Self {
            registry,
            identifier: identifier.into(),
            build: build_info::identity(),
            unavailable_marker: DEFAULT_UNAVAILABLE_MARKER.to_string(),
        }
    }

    pub fn with_unavailable_marker(mut self, marker: impl Into<String>) -> Self {
        self.unavailable_marker = marker.into();
        self
    }

    /// 替换编译期版本，供嵌入方和测试使用
    pub fn with_build_identity(mut self, build: VersionIdentity) -> Self {
        self.build = build;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// 生成报告；运行时查询失败只记录日志，不向调用方传播
    pub fn report(&self) -> IdentityReport {
        let runtime = self.registry.lookup(&self.identifier);

        match &runtime {
            Ok(identity) => {
                tracing::debug!(
                    target: "reporter",
                    event = events::REPORT_RUNTIME_RESOLVED,
                    identifier = %self.identifier,
                    registry = self.registry.kind(),
                    sequence = identity.sequence(),
                    label = identity.label()
                );
            }
            Err(err) => {
                tracing::warn!(
                    target: "reporter",
                    event = events::REPORT_RUNTIME_UNAVAILABLE,
                    identifier = %self.identifier,
                    registry = self.registry.kind(),
                    error = %err
                );
            }
        }

        IdentityReport {
            build: self.build.clone(),
            runtime,
            unavailable_marker: self.unavailable_marker.clone(),
        }
    }

    pub fn render(&self) -> String {
        self.report().render()
    }
}

impl IdentityReporter<Box<dyn DeploymentRegistry>> {
    /// 按配置组装：部署元数据来源、部署标识和占位文本
    pub fn from_config(config: &Config) -> Self {
        let registry = crate::registry::create_registry(&config.registry);
        Self::new(registry, config.deployment.resolved_identifier())
            .with_unavailable_marker(config.report.unavailable_marker.clone())
    }
}
