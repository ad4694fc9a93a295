use crate::api::Listing;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "avif", "svg", "bmp"];

/// Optional post-processing for a fetched page: drop listings whose media
/// cannot be shown as an image. Off by default (`FetchOptions::sanitize`)
/// since most consumers render a placeholder for bad media instead.
pub fn sanitize_page(items: Vec<Listing>) -> Vec<Listing> {
    let before = items.len();
    let kept: Vec<Listing> = items
        .into_iter()
        .filter(|listing| listing.media.iter().any(|m| is_image_url(&m.url)))
        .collect();

    if kept.len() < before {
        tracing::debug!(
            dropped = before - kept.len(),
            "sanitized listings without a usable image"
        );
    }
    kept
}

/// A usable image reference: http(s) URL whose path either has a known image
/// extension or none at all (CDN-style URLs carry no extension).
pub fn is_image_url(url: &str) -> bool {
    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return false;
    }

    // Strip query and fragment before looking at the path.
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last_segment = path.rsplit('/').next().unwrap_or("");

    match last_segment.rsplit_once('.') {
        Some((_, ext)) => IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known)),
        None => true,
    }
}
