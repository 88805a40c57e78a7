//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, handler)
//!     → request.rs (request ID)
//!     → imaginary::Translator (parameters or 404 JSON)
//!     → proxy.rs (GET to imaginary, stream back)
//!     → response.rs (error bodies: 404 / 502 / 503 / 504)
//!     → Send to client
//! ```

pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use proxy::Forwarder;
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::{ErrorMessage, ForwardError};
pub use server::HttpServer;
