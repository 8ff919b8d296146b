use super::env::EnvRegistry;
use super::manifest::ManifestRegistry;
use super::memory::MemoryRegistry;
use super::traits::DeploymentRegistry;
use crate::util::config::{RegistryConfig, RegistryType};
use crate::util::logging::standards::events;

/// 按配置创建部署元数据查询实例
pub fn create_registry(config: &RegistryConfig) -> Box<dyn DeploymentRegistry> {
    match config.registry_type {
        RegistryType::Manifest => {
            tracing::info!(
                target: "registry",
                event = events::REGISTRY_INIT,
                kind = "manifest",
                path = %config.manifest_path
            );
            Box::new(ManifestRegistry::new(&config.manifest_path))
        }

        RegistryType::Env => {
            tracing::info!(
                target: "registry",
                event = events::REGISTRY_INIT,
                kind = "env",
                prefix = %config.env_prefix
            );
            Box::new(EnvRegistry::new(config.env_prefix.clone()))
        }

        RegistryType::Memory => {
            tracing::info!(
                target: "registry",
                event = events::REGISTRY_INIT,
                kind = "memory",
                records = config.records.len()
            );
            let registry = config
                .records
                .iter()
                .fold(MemoryRegistry::new(), |registry, (identifier, identity)| {
                    registry.with_record(identifier.clone(), identity.clone())
                });
            Box::new(registry)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VersionIdentity;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_create_manifest_registry() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("deployments.yaml");
        fs::write(&path, "deployments:\n  app:\n    sequence: 4\n    label: \"0.4.0\"\n").unwrap();

        let config = RegistryConfig {
            manifest_path: path.to_string_lossy().to_string(),
            ..RegistryConfig::default()
        };
        let registry = create_registry(&config);

        assert_eq!(registry.kind(), "manifest");
        assert_eq!(registry.lookup("app").unwrap(), VersionIdentity::new(4, "0.4.0"));
    }

    #[test]
    fn test_create_memory_registry() {
        let mut config = RegistryConfig {
            registry_type: RegistryType::Memory,
            ..RegistryConfig::default()
        };
        config
            .records
            .insert("app".to_string(), VersionIdentity::new(7, "1.2.3"));

        let registry = create_registry(&config);
        assert_eq!(registry.kind(), "memory");
        assert_eq!(registry.lookup("app").unwrap(), VersionIdentity::new(7, "1.2.3"));
        assert!(registry.lookup("nope").is_err());
    }

    #[test]
    fn test_create_env_registry() {
        let config = RegistryConfig {
            registry_type: RegistryType::Env,
            env_prefix: "VP_TEST_FACTORY".to_string(),
            ..RegistryConfig::default()
        };
        let registry = create_registry(&config);
        assert_eq!(registry.kind(), "env");
    }
}
