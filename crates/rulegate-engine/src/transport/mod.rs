//! Transport layer (HTTP/JSON).
//!
//! Exposes the decision endpoints; request bodies are decoded straight into
//! the engine's context types.

pub mod http;
