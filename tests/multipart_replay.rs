//! §8 scenario 2: a multipart body must be byte-identical across a retried
//! send, and an unset file content-type is auto-detected from the filename
//! extension (§4.11).

use impersonate::multipart::MultipartWriter;

#[test]
fn finish_is_idempotent_across_retries() {
    let mut writer = MultipartWriter::new();
    writer.add_text("field", "value");
    writer.add_file("upload", "report.csv", None, b"a,b,c\n1,2,3\n".to_vec());

    let first = writer.finish().to_vec();
    let second = writer.finish().to_vec();
    assert_eq!(first, second);
}

#[test]
fn content_type_header_references_the_same_boundary_used_in_the_body() {
    let mut writer = MultipartWriter::new();
    writer.add_text("field", "value");

    let content_type = writer.content_type();
    let boundary = content_type.strip_prefix("multipart/form-data; boundary=").unwrap();
    let body = writer.finish();
    let body_str = String::from_utf8_lossy(body);

    assert!(body_str.contains(&format!("--{boundary}\r\n")));
    assert!(body_str.trim_end().ends_with(&format!("--{boundary}--")));
}

#[test]
fn file_part_auto_detects_content_type_from_extension() {
    let mut writer = MultipartWriter::new();
    writer.add_file("upload", "photo.PNG", None, vec![0u8, 1, 2]);
    let body = String::from_utf8_lossy(writer.finish()).to_string();
    assert!(body.contains("Content-Type: image/png"));
}

#[test]
fn file_part_falls_back_to_octet_stream_for_unknown_extensions() {
    let mut writer = MultipartWriter::new();
    writer.add_file("upload", "blob.unknownext", None, vec![0u8]);
    let body = String::from_utf8_lossy(writer.finish()).to_string();
    assert!(body.contains("Content-Type: application/octet-stream"));
}

#[test]
fn explicit_content_type_overrides_auto_detection() {
    let mut writer = MultipartWriter::new();
    writer.add_file("upload", "data.json", Some("application/vnd.custom+json".to_string()), vec![b'{', b'}']);
    let body = String::from_utf8_lossy(writer.finish()).to_string();
    assert!(body.contains("Content-Type: application/vnd.custom+json"));
}
