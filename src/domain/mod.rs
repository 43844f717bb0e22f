//! Domain layer: value types shared by every flow and the ports through which
//! flows reach their collaborators.

pub mod coin;
pub mod event;
pub mod lockbox;
pub mod payment;
pub mod ports;
pub mod remote;
pub mod state;
pub mod swap;
