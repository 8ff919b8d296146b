use std::collections::HashMap;

use super::traits::DeploymentRegistry;
use crate::error::NotFoundError;
use crate::model::VersionIdentity;

/// 进程内部署记录表，适用于测试和嵌入式调用方
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    records: HashMap<String, VersionIdentity>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, identifier: impl Into<String>, identity: VersionIdentity) -> Self {
        self.records.insert(identifier.into(), identity);
        self
    }
}

impl DeploymentRegistry for MemoryRegistry {
    fn lookup(&self, identifier: &str) -> Result<VersionIdentity, NotFoundError> {
        self.records
            .get(identifier)
            .cloned()
            .ok_or_else(|| NotFoundError::no_record(identifier))
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotFoundReason;

    #[test]
    fn test_memory_lookup() {
        let registry = MemoryRegistry::new().with_record("app", VersionIdentity::new(7, "1.2.3"));

        assert_eq!(
            registry.lookup("app").unwrap(),
            VersionIdentity::new(7, "1.2.3")
        );

        let err = registry.lookup("other").unwrap_err();
        assert_eq!(err.identifier, "other");
        assert_eq!(err.reason, NotFoundReason::NoRecord);
    }
}
