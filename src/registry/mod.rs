// 部署元数据查询层：运行时版本标识的来源

pub mod env;
pub mod factory;
pub mod manifest;
pub mod memory;
pub mod traits;

pub use env::EnvRegistry;
pub use factory::create_registry;
pub use manifest::ManifestRegistry;
pub use memory::MemoryRegistry;
pub use traits::DeploymentRegistry;
