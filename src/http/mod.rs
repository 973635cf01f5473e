//! HTTP protocol layer module
//!
//! Response builders and query parsing, decoupled from the storage lookup.

pub mod query;
pub mod response;

// Re-export commonly used types
pub use query::file_param;
pub use response::{
    build_404_response, build_500_response, build_download_response, ObjectSize, ResponseBody,
};
