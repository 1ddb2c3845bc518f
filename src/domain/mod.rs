// Domain layer: typed API records and the ports the sync engine runs against.

pub mod model;
pub mod ports;
