//! File fetch handler
//!
//! One request, one store lookup, one response:
//! missing `file` parameter → 404 "No url", unknown key → 404 "File not found",
//! otherwise the object streamed back as a PDF attachment.

use hyper::{Response, Uri};

use crate::http::{self, ResponseBody};
use crate::storage::{ObjectStore, StoreError};

/// Body of the 404 sent when the `file` parameter is missing
pub const MISSING_PARAM_MESSAGE: &str = "No url";
/// Body of the 404 sent when the store has no object for the key
pub const NOT_FOUND_MESSAGE: &str = "File not found";

/// Answer a request for `?file=<key>` from `store`
///
/// Store failures are returned to the caller untouched; they are never
/// reported as a miss.
pub async fn fetch_file<S: ObjectStore>(
    uri: &Uri,
    store: &S,
) -> Result<Response<ResponseBody>, StoreError> {
    let Some(key) = http::file_param(uri) else {
        return Ok(http::build_404_response(MISSING_PARAM_MESSAGE));
    };

    match store.get(&key).await? {
        Some(object) => Ok(http::build_download_response(object)),
        None => Ok(http::build_404_response(NOT_FOUND_MESSAGE)),
    }
}
