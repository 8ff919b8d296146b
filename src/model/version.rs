use serde::{Deserialize, Serialize};
use std::fmt;

/// 版本标识：单调递增的构建序号 + 人类可读的版本标签
///
/// 构造后不可变，字段只通过访问器读取。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionIdentity {
    sequence: u64,
    label: String,
}

impl VersionIdentity {
    pub fn new(sequence: u64, label: impl Into<String>) -> Self {
        Self {
            sequence,
            label: label.into(),
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// 渲染为 `<sequence>/<label>`
impl fmt::Display for VersionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.sequence, self.label)
    }
}
