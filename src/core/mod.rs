// src/core/mod.rs
//! Configuration and the clients for the services the analyzers read from

pub mod cms_client;
pub mod config_manager;
pub mod memory_index;
pub mod search_client;
pub mod service_client;

pub use cms_client::{ContentBackend, ContentstackClient};
pub use config_manager::ConfigManager;
pub use memory_index::{MemoryCatalog, MemoryIndex};
pub use search_client::{AlgoliaClient, SearchBackend};
pub use service_client::ServiceClient;
