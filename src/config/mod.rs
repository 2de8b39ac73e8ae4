//! Run configuration (`cluster.toml`)

mod load;
mod types;


pub use load::{resolve_config_path, CONFIG_FILE_NAME};
pub use types::{
    ClusterConfig, ClusterSection, CredentialsSection, NodeEntry, PackageSection,
    TransportKind, TransportSection, DEFAULT_PACKAGE_NAME, DEFAULT_PACKAGE_URL,
};
