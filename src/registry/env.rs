use super::traits::DeploymentRegistry;
use crate::error::NotFoundError;
use crate::model::VersionIdentity;

/// 默认环境变量前缀
pub const DEFAULT_ENV_PREFIX: &str = "DEPLOYED";

/// 基于进程环境变量的查询实现
///
/// 部署系统把当前安装的版本写入 `<PREFIX>_<IDENT>_SEQUENCE` 和
/// `<PREFIX>_<IDENT>_LABEL`，其中 `<IDENT>` 为部署标识大写、非字母数字替换为 `_`。
#[derive(Debug, Clone)]
pub struct EnvRegistry {
    prefix: String,
}

impl EnvRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// 计算部署标识对应的环境变量名 (sequence, label)
    pub fn variable_names(&self, identifier: &str) -> (String, String) {
        let ident: String = identifier
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        let base = if self.prefix.is_empty() {
            ident
        } else {
            format!("{}_{}", self.prefix.trim_end_matches('_'), ident)
        };
        (format!("{base}_SEQUENCE"), format!("{base}_LABEL"))
    }
}

impl Default for EnvRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_ENV_PREFIX)
    }
}

impl DeploymentRegistry for EnvRegistry {
    fn lookup(&self, identifier: &str) -> Result<VersionIdentity, NotFoundError> {
        let (sequence_var, label_var) = self.variable_names(identifier);

        let (raw_sequence, label) = match (std::env::var(&sequence_var), std::env::var(&label_var))
        {
            (Ok(sequence), Ok(label)) => (sequence, label),
            (Err(std::env::VarError::NotUnicode(_)), _) => {
                return Err(NotFoundError::malformed(
                    identifier,
                    format!("{sequence_var} is not valid unicode"),
                ))
            }
            (_, Err(std::env::VarError::NotUnicode(_))) => {
                return Err(NotFoundError::malformed(
                    identifier,
                    format!("{label_var} is not valid unicode"),
                ))
            }
            _ => return Err(NotFoundError::no_record(identifier)),
        };

        let sequence = raw_sequence.trim().parse::<u64>().map_err(|e| {
            NotFoundError::malformed(identifier, format!("{sequence_var}={raw_sequence}: {e}"))
        })?;

        tracing::debug!(
            target: "registry.env",
            identifier,
            sequence_var = %sequence_var,
            sequence,
            label = %label,
            "环境变量命中"
        );
        Ok(VersionIdentity::new(sequence, label))
    }

    fn kind(&self) -> &'static str {
        "env"
    }
}
