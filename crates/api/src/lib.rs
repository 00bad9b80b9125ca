//! HTTP API: routing, authentication, and request/response mapping.

pub mod app;
pub mod context;
pub mod middleware;
