//! C11 Multipart Writer (§4.11, §8 scenario 2). Generates a Chrome-style
//! `----WebKitFormBoundary<16 random alnum chars>` boundary and serializes
//! parts into a single buffer up front, rather than streaming lazily, so a
//! retried request can replay the exact same bytes instead of re-reading
//! part sources that may have been partially consumed on the first
//! attempt.

use rand::Rng;

const BOUNDARY_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn random_boundary_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..16).map(|_| BOUNDARY_CHARS[rng.gen_range(0..BOUNDARY_CHARS.len())] as char).collect()
}

/// Table-driven extension -> MIME lookup (§4.11), falling back to
/// `application/octet-stream` for anything unrecognized.
fn guess_content_type(filename: &str) -> String {
    let ext = filename.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    let mime = match ext.as_str() {
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    };
    mime.to_string()
}

#[derive(Debug, Clone)]
pub enum PartValue {
    Text(String),
    File { filename: String, content_type: String, data: Vec<u8> },
}

#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub value: PartValue,
}

/// Fully materialized multipart body. `snapshot` is computed once in
/// [`MultipartWriter::finish`] and replayed verbatim on every retry
/// attempt the [`crate::config::RetryPolicy`] triggers.
#[derive(Debug, Clone)]
pub struct MultipartWriter {
    boundary: String,
    parts: Vec<Part>,
    snapshot: Option<Vec<u8>>,
}

impl MultipartWriter {
    pub fn new() -> Self {
        Self { boundary: format!("----WebKitFormBoundary{}", random_boundary_suffix()), parts: Vec::new(), snapshot: None }
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn add_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.snapshot = None;
        self.parts.push(Part { name: name.into(), value: PartValue::Text(value.into()) });
    }

    /// Adds a file part. `content_type` is auto-detected from `filename`'s
    /// extension (falling back to `application/octet-stream`) when `None`
    /// (§4.11).
    pub fn add_file(
        &mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: Option<String>,
        data: Vec<u8>,
    ) {
        self.snapshot = None;
        let filename = filename.into();
        let content_type = content_type.unwrap_or_else(|| guess_content_type(&filename));
        self.parts.push(Part { name: name.into(), value: PartValue::File { filename, content_type, data } });
    }

    /// Returns the serialized body, building and caching it the first time.
    /// Every subsequent call -- including retries -- returns the identical
    /// byte slice without re-reading any part source.
    pub fn finish(&mut self) -> &[u8] {
        if self.snapshot.is_none() {
            self.snapshot = Some(self.render());
        }
        self.snapshot.as_ref().unwrap()
    }

    fn render(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            match &part.value {
                PartValue::Text(value) => {
                    out.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name).as_bytes(),
                    );
                    out.extend_from_slice(value.as_bytes());
                }
                PartValue::File { filename, content_type, data } => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                            part.name, filename
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
                    out.extend_from_slice(data);
                }
            }
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        out
    }
}

impl Default for MultipartWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_matches_chrome_style() {
        let writer = MultipartWriter::new();
        assert!(writer.boundary.starts_with("----WebKitFormBoundary"));
        assert_eq!(writer.boundary.len(), "----WebKitFormBoundary".len() + 16);
    }

    #[test]
    fn retried_body_is_byte_identical() {
        let mut writer = MultipartWriter::new();
        writer.add_text("field", "value");
        writer.add_file("upload", "a.txt", Some("text/plain".to_string()), b"hello".to_vec());

        let first = writer.finish().to_vec();
        let second = writer.finish().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn add_file_auto_detects_content_type_from_extension() {
        let mut writer = MultipartWriter::new();
        writer.add_file("upload", "photo.JPG", None, b"\xff\xd8".to_vec());
        let body = String::from_utf8_lossy(writer.finish()).to_string();
        assert!(body.contains("Content-Type: image/jpeg"));
    }

    #[test]
    fn add_file_falls_back_to_octet_stream() {
        let mut writer = MultipartWriter::new();
        writer.add_file("upload", "data.bin", None, b"\x00\x01".to_vec());
        let body = String::from_utf8_lossy(writer.finish()).to_string();
        assert!(body.contains("Content-Type: application/octet-stream"));
    }
}
