// Domain layer: port record model and the store/service contracts.

pub mod model;
pub mod ports;
