//! Inbound adapters: CSV batch files and the HTTP service.

pub mod csv;
pub mod http;
