//! HTTP adapter in front of the imaginary image-processing service.

pub mod config;
pub mod http;
pub mod imaginary;
pub mod lifecycle;
pub mod observability;

pub use config::schema::AdapterConfig;
pub use http::HttpServer;
pub use imaginary::{RequestParameters, Translator};
pub use lifecycle::Shutdown;
