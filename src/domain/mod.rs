pub mod money;
pub mod payment;
pub mod ports;
pub mod pricing;
pub mod reservation;
pub mod room;
