//! File extension to content-type lookup for static files.

use std::path::Path;

use mime::Mime;

/// Returns the content type for `path` based on its extension.
///
/// Unknown or missing extensions map to `application/octet-stream`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use webconfig_http::content_type;
///
/// assert_eq!(content_type(Path::new("styles/slider.css")).essence_str(), "text/css");
/// assert_eq!(content_type(Path::new("README")), mime::APPLICATION_OCTET_STREAM);
/// ```
pub fn content_type(path: &Path) -> Mime {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "html" | "htm" => mime::TEXT_HTML_UTF_8,
        "css" => mime::TEXT_CSS_UTF_8,
        "js" => mime::APPLICATION_JAVASCRIPT_UTF_8,
        "json" => mime::APPLICATION_JSON,
        "txt" => mime::TEXT_PLAIN_UTF_8,
        "xml" => mime::TEXT_XML,
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        "pdf" => mime::APPLICATION_PDF,
        "ico" => parse_or_octet_stream("image/x-icon"),
        "zip" => parse_or_octet_stream("application/zip"),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

fn parse_or_octet_stream(raw: &str) -> Mime {
    raw.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM)
}
