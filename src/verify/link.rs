//! Verification link construction.
//!
//! The public URL `<base>/verify/<productId>` is the sole persisted
//! artifact exposed to end users (embedded in a QR code by the UI; the
//! QR image itself is out of scope here).

use thiserror::Error;
use url::Url;

use crate::tx::validate::is_valid_identifier;

/// Errors building a verification link.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Base URL is not a usable http(s) URL.
    #[error("invalid verification base URL: {0}")]
    InvalidBase(String),

    /// The product id is not URL-path-safe.
    #[error("product id '{0}' is not URL-path-safe")]
    UnsafeId(String),
}

/// Build the public verification URL for a product.
pub fn verification_url(base: &str, product_id: &str) -> Result<Url, LinkError> {
    if !is_valid_identifier(product_id) {
        return Err(LinkError::UnsafeId(product_id.to_string()));
    }

    let mut url: Url = base
        .parse()
        .map_err(|_| LinkError::InvalidBase(base.to_string()))?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| LinkError::InvalidBase(base.to_string()))?;
        segments.pop_if_empty();
        segments.push("verify");
        segments.push(product_id);
    }

    Ok(url)
}
