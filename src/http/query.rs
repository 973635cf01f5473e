//! Query string parsing

use hyper::Uri;

/// Query parameter naming the object key
pub const FILE_PARAM: &str = "file";

/// Extract the `file` query parameter
///
/// The first occurrence wins and is percent-decoded (`+` decodes to a space).
/// An empty value counts as missing.
pub fn file_param(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == FILE_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
