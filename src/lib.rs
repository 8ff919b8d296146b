//! 编译期版本与运行环境版本的一致性对比
//!
//! 启动时读取二进制内置的版本标识和部署环境报告的版本标识，
//! 渲染为 `<build>....<runtime>` 形式的一行文本供人工核对。

pub mod build_info;
pub mod error;
pub mod model;
pub mod registry;
pub mod reporter;
pub mod util;

pub use error::{NotFoundError, NotFoundReason};
pub use model::VersionIdentity;
pub use registry::DeploymentRegistry;
pub use reporter::{IdentityReport, IdentityReporter};

use util::config::loader::ConfigLoader;
use util::config::Config;
use util::logging::standards::events;

/// 默认配置文件名
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// 查找配置文件路径，适应开发和生产环境
pub fn find_config_file_path(filename: &str) -> std::path::PathBuf {
    ConfigLoader::find_config_file_path(filename)
}

/// 加载配置：文件不存在时使用默认值，存在但无效时返回错误
pub fn load_config() -> anyhow::Result<Config> {
    let config_path = find_config_file_path(CONFIG_FILE_NAME);
    let exists = config_path.exists();

    match ConfigLoader::load_or_default(&config_path) {
        Ok(config) => {
            if exists {
                tracing::debug!(event = events::CONFIG_LOAD_SUCCESS, path = %config_path.display());
            } else {
                tracing::debug!(event = events::CONFIG_LOAD_DEFAULT, path = %config_path.display());
            }
            Ok(config)
        }
        Err(err) => {
            tracing::error!(
                event = events::CONFIG_LOAD_FAILED,
                path = %config_path.display(),
                error = %err
            );
            Err(err.context(format!("配置加载失败: {}", config_path.display())))
        }
    }
}
