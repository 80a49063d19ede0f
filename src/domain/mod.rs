//! Domain layer: payment records, gateway payload shapes, the fee model and
//! the ports the application layer depends on.

pub mod gateway;
pub mod money;
pub mod payout;
pub mod ports;
pub mod team;
