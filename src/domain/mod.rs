//! Domain layer: transactions, loyalty rules, shipments and their cost chain,
//! plus the storage ports the application layer depends on.

pub mod grand_total;
pub mod loyalty;
pub mod ports;
pub mod shipment;
pub mod transaction;
