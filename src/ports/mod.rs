//! Port traits at the boundary between the domain and I/O.

pub mod config_port;
pub mod data_port;
pub mod trade_log_port;
