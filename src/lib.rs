//! GraphQL Read Gateway Library

pub mod auth;
pub mod config;
pub mod error;
pub mod graphql;
pub mod guard;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod sanitize;
pub mod security;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
