pub mod version;

pub use version::VersionIdentity;
