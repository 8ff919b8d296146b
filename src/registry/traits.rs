use crate::error::NotFoundError;
use crate::model::VersionIdentity;

/// 部署元数据查询trait
///
/// 一次性阻塞查询，不缓存、不重试；每次调用都重新读取数据源。
pub trait DeploymentRegistry: Send + Sync {
    /// 查询部署标识当前安装的版本
    fn lookup(&self, identifier: &str) -> Result<VersionIdentity, NotFoundError>;

    /// 数据源类型名称，用于日志
    fn kind(&self) -> &'static str;
}

impl<R: DeploymentRegistry + ?Sized> DeploymentRegistry for Box<R> {
    fn lookup(&self, identifier: &str) -> Result<VersionIdentity, NotFoundError> {
        (**self).lookup(identifier)
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}

impl<R: DeploymentRegistry + ?Sized> DeploymentRegistry for &R {
    fn lookup(&self, identifier: &str) -> Result<VersionIdentity, NotFoundError> {
        (**self).lookup(identifier)
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}
