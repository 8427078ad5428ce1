//! Utility functions and helpers.

pub mod http;

use url::Url;

use crate::error::{AppError, Result};

/// Append path segments to a base URL.
///
/// Segments are percent-encoded, so a caller-supplied value can never
/// escape into another path component or the query string.
pub fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| AppError::config(format!("Base URL cannot take a path: {base}")))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}
