//! 核心错误类型
//!
//! 运行环境无法给出当前部署的版本信息时，统一以 [`NotFoundError`] 表示。

use thiserror::Error;

/// 部署记录查找失败的原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundReason {
    /// 元数据源中没有该部署标识的记录
    #[error("no deployment record")]
    NoRecord,
    /// 元数据源无法读取（文件缺失、权限不足等）
    #[error("metadata source unreadable: {0}")]
    Unreadable(String),
    /// 记录存在但内容损坏
    #[error("deployment record malformed: {0}")]
    Malformed(String),
}

/// 运行环境中找不到当前部署的版本信息
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("deployment `{identifier}` not found: {reason}")]
pub struct NotFoundError {
    pub identifier: String,
    pub reason: NotFoundReason,
}

impl NotFoundError {
    pub fn new(identifier: impl Into<String>, reason: NotFoundReason) -> Self {
        Self {
            identifier: identifier.into(),
            reason,
        }
    }

    pub fn no_record(identifier: impl Into<String>) -> Self {
        Self::new(identifier, NotFoundReason::NoRecord)
    }

    pub fn unreadable(identifier: impl Into<String>, detail: impl ToString) -> Self {
        Self::new(identifier, NotFoundReason::Unreadable(detail.to_string()))
    }

    pub fn malformed(identifier: impl Into<String>, detail: impl ToString) -> Self {
        Self::new(identifier, NotFoundReason::Malformed(detail.to_string()))
    }
}
