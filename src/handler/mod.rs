//! Request handler module
//!
//! `router` is the per-request entry point used by the connection layer;
//! `fetch` holds the file lookup itself.

pub mod fetch;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
