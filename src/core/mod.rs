pub mod decoder;
pub mod service;

pub use crate::domain::model::{Port, SyncReport};
pub use crate::domain::ports::{PortDomainService, PortRepository};
pub use crate::utils::error::Result;
