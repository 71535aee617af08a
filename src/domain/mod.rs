// Domain layer: contact models and the storage port. No framework dependencies.

pub mod model;
pub mod ports;
