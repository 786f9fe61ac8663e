// src/models/mod.rs

pub mod article;
pub mod article_image;
pub mod category;
pub mod comment;
pub mod common;
pub mod like;
pub mod tag;
pub mod user;

use url::Url;

/// Accepts empty strings, site-relative paths (`/uploads/a.png`) and absolute
/// URLs.
pub(crate) fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if url.is_empty() || url.starts_with('/') {
        return Ok(());
    }
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}
