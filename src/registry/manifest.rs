use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::traits::DeploymentRegistry;
use crate::error::NotFoundError;
use crate::model::VersionIdentity;

/// 部署清单文件结构
///
/// ```yaml
/// deployments:
///   version-probe:
///     sequence: 7
///     label: "1.2.3"
/// ```
#[derive(Debug, Default, Deserialize)]
struct DeploymentManifest {
    #[serde(default)]
    deployments: BTreeMap<String, serde_yaml::Value>,
}

/// 基于YAML部署清单的查询实现
///
/// 单条记录损坏只影响该部署标识，其余记录照常可查。
#[derive(Debug, Clone)]
pub struct ManifestRegistry {
    path: PathBuf,
}

impl ManifestRegistry {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_manifest(&self, identifier: &str) -> Result<DeploymentManifest, NotFoundError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            NotFoundError::unreadable(identifier, format!("{}: {}", self.path.display(), e))
        })?;

        if content.trim().is_empty() {
            return Ok(DeploymentManifest::default());
        }

        serde_yaml::from_str(&content).map_err(|e| {
            NotFoundError::malformed(identifier, format!("{}: {}", self.path.display(), e))
        })
    }
}

impl DeploymentRegistry for ManifestRegistry {
    fn lookup(&self, identifier: &str) -> Result<VersionIdentity, NotFoundError> {
        let mut manifest = self.read_manifest(identifier)?;

        let entry = manifest
            .deployments
            .remove(identifier)
            .ok_or_else(|| NotFoundError::no_record(identifier))?;

        let identity: VersionIdentity = serde_yaml::from_value(entry)
            .map_err(|e| NotFoundError::malformed(identifier, e))?;

        tracing::debug!(
            target: "registry.manifest",
            path = %self.path.display(),
            identifier,
            sequence = identity.sequence(),
            label = identity.label(),
            "部署清单命中"
        );
        Ok(identity)
    }

    fn kind(&self) -> &'static str {
        "manifest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotFoundReason;
    use tempfile::TempDir;

    fn write_manifest(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("deployments.yaml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_manifest_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_manifest(
            &temp_dir,
            "deployments:\n  app:\n    sequence: 7\n    label: \"1.2.3\"\n  other:\n    sequence: 3\n    label: \"0.9.0\"\n",
        );
        let registry = ManifestRegistry::new(&path);

        assert_eq!(registry.lookup("app").unwrap(), VersionIdentity::new(7, "1.2.3"));
        assert_eq!(registry.lookup("other").unwrap(), VersionIdentity::new(3, "0.9.0"));
        assert_eq!(registry.kind(), "manifest");
    }

    #[test]
    fn test_missing_entry() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_manifest(&temp_dir, "deployments:\n  app:\n    sequence: 1\n    label: a\n");

        let err = ManifestRegistry::new(&path).lookup("missing").unwrap_err();
        assert_eq!(err.identifier, "missing");
        assert_eq!(err.reason, NotFoundReason::NoRecord);
    }

    #[test]
    fn test_empty_manifest_has_no_records() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_manifest(&temp_dir, "");

        let err = ManifestRegistry::new(&path).lookup("app").unwrap_err();
        assert_eq!(err.reason, NotFoundReason::NoRecord);
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let registry = ManifestRegistry::new(temp_dir.path().join("nope.yaml"));

        let err = registry.lookup("app").unwrap_err();
        assert!(matches!(err.reason, NotFoundReason::Unreadable(_)));
    }

    #[test]
    fn test_corrupted_manifest_is_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_manifest(&temp_dir, "deployments: [this is: not a map\n");

        let err = ManifestRegistry::new(&path).lookup("app").unwrap_err();
        assert!(matches!(err.reason, NotFoundReason::Malformed(_)));
    }

    #[test]
    fn test_bad_entry_only_affects_its_identifier() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_manifest(
            &temp_dir,
            "deployments:\n  broken:\n    sequence: -4\n    label: x\n  good:\n    sequence: 2\n    label: \"2.0\"\n",
        );
        let registry = ManifestRegistry::new(&path);

        let err = registry.lookup("broken").unwrap_err();
        assert!(matches!(err.reason, NotFoundReason::Malformed(_)));
        assert_eq!(registry.lookup("good").unwrap(), VersionIdentity::new(2, "2.0"));
    }
}
