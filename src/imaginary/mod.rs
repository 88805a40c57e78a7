//! Translation of inbound requests into imaginary backend URLs.
//!
//! # Data Flow
//! ```text
//! inbound URI (path + query)
//!     → translator.rs (validate method/width/height, default quality/type, strip prefix)
//!     → RequestParameters (params.rs, immutable)
//!     → build_url() → GET <host>/<method>?file=..&height=..[&type=..]&width=..
//! ```
//!
//! # Design Decisions
//! - The backend host only ever comes from configuration
//! - Host URL is parsed once at startup so URL building cannot fail per request
//! - Parsing stops at the first error (method, width, height)

pub mod error;
pub mod params;
pub mod path;
pub mod translator;

pub use error::TranslateError;
pub use params::{RequestParameters, DEFAULT_QUALITY};
pub use translator::Translator;
