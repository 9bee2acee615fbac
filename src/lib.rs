//! HTTP server, remote record store, and CLI glue for the partnership
//! dashboard. Models, storage, and the client-side cache live in
//! `dashboard_core`.

pub mod api;
pub mod client;
pub mod config;
pub mod seed;
