//! C4 TLSDialer: opens the TCP/proxy-tunneled socket and layers a
//! BoringSSL handshake on top, steered by a [`ClientHelloSpec`] instance
//! (§4.4). `boring`/`tokio-boring` expose real cipher/curve/signature-
//! algorithm order control (unlike rustls's public API), which is why this
//! crate binds to BoringSSL instead of the stdlib-adjacent rustls stack.

use crate::error::{Error, Result};
use crate::profile::tls_spec::{ClientHelloSpec, Extension};
use boring::ssl::{SslConnector, SslMethod, SslVerifyMode};
use tokio::net::TcpStream;
use tokio_boring::SslStream;

/// Translates the subset of `ClientHelloSpec` that BoringSSL's safe Rust
/// bindings actually expose into connector configuration. Extension
/// *ordering* within the ClientHello is controlled by BoringSSL internally
/// once the equivalent settings are applied here; this crate does not link
/// a patched BoringSSL, so bit-for-bit extension order beyond what these
/// calls influence is a known, documented gap (see DESIGN.md).
pub fn build_connector(spec: &ClientHelloSpec, insecure: bool) -> Result<SslConnector> {
    let mut builder = SslConnector::builder(SslMethod::tls()).map_err(|e| Error::Tls(e.to_string()))?;

    let cipher_list = cipher_suite_openssl_names(&spec.cipher_suites);
    if !cipher_list.is_empty() {
        builder.set_cipher_list(&cipher_list.join(":")).map_err(|e| Error::Tls(e.to_string()))?;
    }

    let curves = supported_group_openssl_names(&spec.elliptic_curves);
    if !curves.is_empty() {
        builder.set_curves(&curves).map_err(|e| Error::Tls(e.to_string()))?;
    }

    if !spec.alpn_protocols.is_empty() {
        let wire = encode_alpn_wire_format(&spec.alpn_protocols);
        builder.set_alpn_protos(&wire).map_err(|e| Error::Tls(e.to_string()))?;
    }

    builder.set_grease_enabled(spec.extensions.iter().any(|e| matches!(e, Extension::Grease)));

    if insecure {
        builder.set_verify(SslVerifyMode::NONE);
    }

    Ok(builder.build())
}

fn cipher_suite_openssl_names(ids: &[u16]) -> Vec<&'static str> {
    ids.iter().filter_map(|id| openssl_cipher_name(*id)).collect()
}

fn openssl_cipher_name(id: u16) -> Option<&'static str> {
    use crate::dicttls::cipher_suites as cs;
    Some(match id {
        v if v == cs::TLS_AES_128_GCM_SHA256 => "TLS_AES_128_GCM_SHA256",
        v if v == cs::TLS_AES_256_GCM_SHA384 => "TLS_AES_256_GCM_SHA384",
        v if v == cs::TLS_CHACHA20_POLY1305_SHA256 => "TLS_CHACHA20_POLY1305_SHA256",
        v if v == cs::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256 => "ECDHE-ECDSA-AES128-GCM-SHA256",
        v if v == cs::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256 => "ECDHE-RSA-AES128-GCM-SHA256",
        v if v == cs::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384 => "ECDHE-ECDSA-AES256-GCM-SHA384",
        v if v == cs::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384 => "ECDHE-RSA-AES256-GCM-SHA384",
        v if v == cs::TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256 => "ECDHE-ECDSA-CHACHA20-POLY1305",
        v if v == cs::TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256 => "ECDHE-RSA-CHACHA20-POLY1305",
        v if v == cs::TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA => "ECDHE-RSA-AES128-SHA",
        v if v == cs::TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA => "ECDHE-RSA-AES256-SHA",
        v if v == cs::TLS_RSA_WITH_AES_128_GCM_SHA256 => "AES128-GCM-SHA256",
        v if v == cs::TLS_RSA_WITH_AES_256_GCM_SHA384 => "AES256-GCM-SHA384",
        v if v == cs::TLS_RSA_WITH_AES_128_CBC_SHA => "AES128-SHA",
        v if v == cs::TLS_RSA_WITH_AES_256_CBC_SHA => "AES256-SHA",
        _ => return None,
    })
}

fn supported_group_openssl_names(ids: &[u16]) -> String {
    use crate::dicttls::supported_groups as sg;
    ids.iter()
        .filter_map(|id| match *id {
            v if v == sg::CURVE_P256 => Some("P-256"),
            v if v == sg::CURVE_P384 => Some("P-384"),
            v if v == sg::SECP521R1 => Some("P-521"),
            v if v == sg::X25519 => Some("X25519"),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(":")
}

fn encode_alpn_wire_format(protocols: &[String]) -> Vec<u8> {
    let mut out = Vec::new();
    for p in protocols {
        out.push(p.len() as u8);
        out.extend_from_slice(p.as_bytes());
    }
    out
}

pub async fn handshake(
    connector: &SslConnector,
    server_name: &str,
    tcp: TcpStream,
) -> Result<SslStream<TcpStream>> {
    let config = connector.configure().map_err(|e| Error::Tls(e.to_string()))?;
    tokio_boring::connect(config, server_name, tcp)
        .await
        .map_err(|e| Error::Tls(e.to_string()))
}

pub fn negotiated_alpn(stream: &SslStream<TcpStream>) -> Option<String> {
    stream
        .ssl()
        .selected_alpn_protocol()
        .map(|b| String::from_utf8_lossy(b).to_string())
}

/// SHA-256 fingerprint of the leaf certificate, in both hex and
/// colon-separated form (§4.12 TLSInfo).
pub fn leaf_fingerprint(stream: &SslStream<TcpStream>) -> Option<(String, String)> {
    use sha2::Digest;
    let cert = stream.ssl().peer_certificate()?;
    let der = cert.to_der().ok()?;
    let digest = sha2::Sha256::digest(&der);
    let hex = hex::encode(digest);
    let colon = hex
        .as_bytes()
        .chunks(2)
        .map(|c| std::str::from_utf8(c).unwrap())
        .collect::<Vec<_>>()
        .join(":");
    Some((hex, colon))
}

pub fn dangerous_connector(spec: &ClientHelloSpec) -> Result<SslConnector> {
    build_connector(spec, true)
}

pub fn default_connector(spec: &ClientHelloSpec) -> Result<SslConnector> {
    build_connector(spec, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tls_spec::ClientHelloSpec;

    #[test]
    fn builds_connector_for_chrome_profile() {
        let spec = ClientHelloSpec::chrome_133();
        assert!(default_connector(&spec).is_ok());
    }
}
