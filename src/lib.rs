pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::http::{router, AppState};
pub use crate::adapters::memory::InMemoryPortRepository;
pub use crate::config::ServerConfig;
pub use crate::core::service::PortService;
pub use crate::domain::model::{Coordinates, Port, SyncReport};
pub use crate::domain::ports::{PortDomainService, PortRepository};
pub use crate::utils::error::{ErrorKind, PortError, Result, StoreError};
