//! File extension resolution for downloaded content

use url::Url;

/// Known content types and their canonical extensions
const EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", ".jpg"),
    ("image/pjpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/gif", ".gif"),
    ("image/webp", ".webp"),
    ("image/bmp", ".bmp"),
    ("image/tiff", ".tiff"),
    ("image/svg+xml", ".svg"),
    ("image/x-icon", ".ico"),
    ("image/vnd.adobe.photoshop", ".psd"),
    ("video/mp4", ".mp4"),
    ("video/webm", ".webm"),
    ("video/quicktime", ".mov"),
    ("audio/mpeg", ".mp3"),
    ("application/pdf", ".pdf"),
    ("application/zip", ".zip"),
    ("application/x-shockwave-flash", ".swf"),
    ("text/plain", ".txt"),
    ("text/html", ".html"),
];

/// Map a `Content-Type` value to an extension, ignoring parameters
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    EXTENSIONS
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// Derive an extension from the trailing path segment of a URI
///
/// Everything after the first `.` of the last segment is kept, without any
/// query string or fragment. Returns an empty string when the segment has no
/// `.` at all.
pub fn extension_from_uri(uri: &str) -> String {
    let segment = match Url::parse(uri) {
        Ok(url) => url
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
            .unwrap_or_default(),
        Err(_) => uri.rsplit('/').next().unwrap_or_default().to_string(),
    };

    let segment = segment
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    match segment.split_once('.') {
        Some((_, suffix)) if !suffix.is_empty() => format!(".{}", suffix),
        _ => String::new(),
    }
}

/// Pick the extension for a download: content type first, URI second
pub fn resolve_extension(content_type: Option<&str>, source_uri: &str) -> String {
    content_type
        .and_then(extension_for_content_type)
        .map(str::to_string)
        .unwrap_or_else(|| extension_from_uri(source_uri))
}
