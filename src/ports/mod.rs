//! Port traits at the collaborator seams: price data in, configuration in,
//! augmented tables out.

pub mod config_port;
pub mod data_port;
pub mod export_port;
