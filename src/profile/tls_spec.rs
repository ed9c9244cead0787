//! TLS ClientHello spec and the deep-clone / per-connection randomization
//! operation (C2 SpecCloner).
//!
//! Every field here is plain owned data (`Vec`/`String`, no trait objects,
//! no shared pointers), so `#[derive(Clone)]` already gives the structural
//! independence §4.2 asks for: duplicating a `ClientHelloSpec` allocates
//! fresh backing storage for every slice, and mutating the clone never
//! touches the template it came from. `instantiate_for_connection` builds
//! on top of that clone to additionally re-roll the per-connection bits
//! (GREASE placeholders, the ephemeral key-share payload) that must differ
//! between connections sharing one profile.

use crate::dicttls::{
    cipher_suites::{self as cs, GREASE_PLACEHOLDER as GREASE_CS},
    extensions::*,
    signature_schemes::{
        ECDSA_WITH_P256_AND_SHA256, ECDSA_WITH_P384_AND_SHA384, ECDSA_WITH_P521_AND_SHA512,
        PKCS1_WITH_SHA256, PKCS1_WITH_SHA384, PKCS1_WITH_SHA512, PSS_WITH_SHA256, PSS_WITH_SHA384,
        PSS_WITH_SHA512,
    },
    supported_groups::{
        GREASE_PLACEHOLDER as GREASE_SG, CURVE_P256, CURVE_P384, SECP521R1, X25519,
        X25519_MLKEM768,
    },
};
use rand::Rng;
use std::collections::HashMap;

/// The GREASE value set a spec-compliant client rotates through (RFC 8701).
pub const TLS_GREASE_VALUES: &[u16] = &[
    0x0a0a, 0x1a1a, 0x2a2a, 0x3a3a, 0x4a4a, 0x5a5a, 0x6a6a, 0x7a7a, 0x8a8a, 0x9a9a, 0xaaaa, 0xbaba,
    0xcaca, 0xdada, 0xeaea, 0xfafa,
];

pub fn is_grease_value(v: u16) -> bool {
    (v & 0x0f0f) == 0x0a0a && (v & 0xf000) >> 8 == (v & 0x00f0)
}

fn random_grease() -> u16 {
    TLS_GREASE_VALUES[rand::thread_rng().gen_range(0..TLS_GREASE_VALUES.len())]
}

pub type CipherSuiteID = u16;

/// An extension in the order it will be written on the wire. `GREASE`
/// appears twice in a real Chrome ClientHello (first and last extension);
/// each occurrence is re-rolled independently at clone time.
#[derive(Debug, Clone)]
pub enum Extension {
    Grease,
    ServerName(Vec<String>),
    StatusRequest,
    SupportedCurves(Vec<u16>),
    SupportedPoints(Vec<u8>),
    SignatureAlgorithms(Vec<u16>),
    Alpn(Vec<String>),
    ExtendedMasterSecret,
    SessionTicket,
    SupportedVersions(Vec<u16>),
    PskKeyExchangeModes(Vec<u8>),
    KeyShare(Vec<KeyShareEntry>),
    Sct,
    RenegotiationInfo(u8),
    ApplicationSettingsNew(Vec<String>),
    CompressCertificate(Vec<u16>),
    GreaseEch,
    /// Unrecognised extension type carried as raw bytes. This is the
    /// structural fallback §4.2/§9 requires: cloning always deep-copies the
    /// byte vector regardless of whether this crate understands the type.
    Unknown { id: u16, data: Vec<u8> },
}

#[derive(Debug, Clone)]
pub struct KeyShareEntry {
    pub group: u16,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ClientHelloSpec {
    pub tls_vers_min: u16,
    pub tls_vers_max: u16,
    pub cipher_suites: Vec<CipherSuiteID>,
    pub compression_methods: Vec<u8>,
    pub extensions: Vec<Extension>,
    pub elliptic_curves: Vec<u16>,
    pub signature_algorithms: Vec<u16>,
    pub alpn_protocols: Vec<String>,
    pub supported_versions: Vec<u16>,
    pub psk_key_exchange_modes: Vec<u8>,
    pub custom_extensions: HashMap<u16, Vec<u8>>,
}

impl ClientHelloSpec {
    pub fn new() -> Self {
        Self {
            tls_vers_min: VERSION_TLS12,
            tls_vers_max: VERSION_TLS13,
            cipher_suites: Vec::new(),
            compression_methods: vec![COMPRESSION_NONE],
            extensions: Vec::new(),
            elliptic_curves: Vec::new(),
            signature_algorithms: Vec::new(),
            alpn_protocols: Vec::new(),
            supported_versions: vec![VERSION_TLS13],
            psk_key_exchange_modes: Vec::new(),
            custom_extensions: HashMap::new(),
        }
    }

    pub fn chrome_103() -> Self {
        let mut spec = Self::new();

        spec.cipher_suites = vec![
            GREASE_CS,
            cs::TLS_AES_128_GCM_SHA256,
            cs::TLS_AES_256_GCM_SHA384,
            cs::TLS_CHACHA20_POLY1305_SHA256,
            cs::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
            cs::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
            cs::TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
            cs::TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
            cs::TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA,
            cs::TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA,
            cs::TLS_RSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_RSA_WITH_AES_256_GCM_SHA384,
            cs::TLS_RSA_WITH_AES_128_CBC_SHA,
            cs::TLS_RSA_WITH_AES_256_CBC_SHA,
        ];
        spec.elliptic_curves = vec![GREASE_SG, X25519, CURVE_P256, CURVE_P384];
        spec.signature_algorithms = vec![
            ECDSA_WITH_P256_AND_SHA256,
            PSS_WITH_SHA256,
            PKCS1_WITH_SHA256,
            ECDSA_WITH_P384_AND_SHA384,
            PSS_WITH_SHA384,
            PKCS1_WITH_SHA384,
            PSS_WITH_SHA512,
            PKCS1_WITH_SHA512,
        ];
        spec.alpn_protocols = vec!["h2".into(), "http/1.1".into()];
        spec.supported_versions = vec![GREASE_SG, VERSION_TLS13, VERSION_TLS12];
        spec.psk_key_exchange_modes = vec![PSK_MODE_DHE];

        spec.extensions = vec![
            Extension::Grease,
            Extension::SessionTicket,
            Extension::SignatureAlgorithms(spec.signature_algorithms.clone()),
            Extension::ApplicationSettingsNew(vec!["h2".into()]),
            Extension::KeyShare(vec![
                KeyShareEntry { group: GREASE_SG, data: vec![0] },
                KeyShareEntry { group: X25519, data: vec![0; 32] },
            ]),
            Extension::Sct,
            Extension::SupportedPoints(vec![POINT_FORMAT_UNCOMPRESSED]),
            Extension::SupportedVersions(spec.supported_versions.clone()),
            Extension::StatusRequest,
            Extension::Alpn(spec.alpn_protocols.clone()),
            Extension::ServerName(vec![]),
            Extension::GreaseEch,
            Extension::CompressCertificate(vec![CERT_COMPRESSION_BROTLI]),
            Extension::SupportedCurves(spec.elliptic_curves.clone()),
            Extension::PskKeyExchangeModes(spec.psk_key_exchange_modes.clone()),
            Extension::ExtendedMasterSecret,
            Extension::RenegotiationInfo(RENEGOTIATE_ONCE_AS_CLIENT),
            Extension::Grease,
        ];

        spec
    }

    pub fn chrome_133() -> Self {
        let mut spec = Self::chrome_103();

        spec.elliptic_curves = vec![GREASE_SG, X25519_MLKEM768, X25519, CURVE_P256, CURVE_P384];
        spec.alpn_protocols = vec!["h3".into(), "h2".into(), "http/1.1".into()];

        spec.extensions = vec![
            Extension::Grease,
            Extension::SessionTicket,
            Extension::SignatureAlgorithms(spec.signature_algorithms.clone()),
            Extension::ApplicationSettingsNew(vec!["h3".into(), "h2".into()]),
            Extension::KeyShare(vec![
                KeyShareEntry { group: GREASE_SG, data: vec![0] },
                KeyShareEntry { group: X25519_MLKEM768, data: vec![0; 1216] },
                KeyShareEntry { group: X25519, data: vec![0; 32] },
            ]),
            Extension::Sct,
            Extension::SupportedPoints(vec![POINT_FORMAT_UNCOMPRESSED]),
            Extension::SupportedVersions(spec.supported_versions.clone()),
            Extension::StatusRequest,
            Extension::Alpn(spec.alpn_protocols.clone()),
            Extension::ServerName(vec![]),
            Extension::GreaseEch,
            Extension::CompressCertificate(vec![CERT_COMPRESSION_BROTLI]),
            Extension::SupportedCurves(spec.elliptic_curves.clone()),
            Extension::PskKeyExchangeModes(spec.psk_key_exchange_modes.clone()),
            Extension::ExtendedMasterSecret,
            Extension::RenegotiationInfo(RENEGOTIATE_ONCE_AS_CLIENT),
            Extension::Grease,
        ];

        spec
    }

    pub fn firefox_133() -> Self {
        let mut spec = Self::new();

        spec.cipher_suites = vec![
            cs::TLS_AES_256_GCM_SHA384,
            cs::TLS_AES_128_GCM_SHA256,
            cs::TLS_CHACHA20_POLY1305_SHA256,
            cs::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
            cs::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
            cs::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
            cs::TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
        ];
        spec.elliptic_curves = vec![CURVE_P256, CURVE_P384, SECP521R1, X25519];
        spec.signature_algorithms = vec![
            PSS_WITH_SHA256,
            PSS_WITH_SHA384,
            PSS_WITH_SHA512,
            PKCS1_WITH_SHA256,
            PKCS1_WITH_SHA384,
            PKCS1_WITH_SHA512,
            ECDSA_WITH_P256_AND_SHA256,
            ECDSA_WITH_P384_AND_SHA384,
            ECDSA_WITH_P521_AND_SHA512,
        ];
        spec.alpn_protocols = vec!["h2".into(), "http/1.1".into()];
        spec.supported_versions = vec![VERSION_TLS13, VERSION_TLS12];
        spec.psk_key_exchange_modes = vec![PSK_MODE_DHE];

        spec.extensions = vec![
            Extension::ServerName(vec![]),
            Extension::ExtendedMasterSecret,
            Extension::RenegotiationInfo(RENEGOTIATE_ONCE_AS_CLIENT),
            Extension::SupportedCurves(spec.elliptic_curves.clone()),
            Extension::SupportedPoints(vec![POINT_FORMAT_UNCOMPRESSED]),
            Extension::SessionTicket,
            Extension::Alpn(spec.alpn_protocols.clone()),
            Extension::StatusRequest,
            Extension::KeyShare(vec![
                KeyShareEntry { group: X25519, data: vec![0; 32] },
                KeyShareEntry { group: CURVE_P256, data: vec![0; 65] },
            ]),
            Extension::SupportedVersions(spec.supported_versions.clone()),
            Extension::SignatureAlgorithms(spec.signature_algorithms.clone()),
            Extension::PskKeyExchangeModes(spec.psk_key_exchange_modes.clone()),
        ];

        spec
    }

    pub fn safari_16_0() -> Self {
        let mut spec = Self::new();

        spec.cipher_suites = vec![
            cs::TLS_AES_128_GCM_SHA256,
            cs::TLS_AES_256_GCM_SHA384,
            cs::TLS_CHACHA20_POLY1305_SHA256,
            cs::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
            cs::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
            cs::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
        ];
        spec.elliptic_curves = vec![CURVE_P256, CURVE_P384, X25519];
        spec.signature_algorithms = vec![
            PKCS1_WITH_SHA256,
            PKCS1_WITH_SHA384,
            PKCS1_WITH_SHA512,
            ECDSA_WITH_P256_AND_SHA256,
            ECDSA_WITH_P384_AND_SHA384,
        ];
        spec.alpn_protocols = vec!["h2".into(), "http/1.1".into()];
        spec.supported_versions = vec![VERSION_TLS13, VERSION_TLS12];

        spec.extensions = vec![
            Extension::ServerName(vec![]),
            Extension::SupportedCurves(spec.elliptic_curves.clone()),
            Extension::SupportedPoints(vec![POINT_FORMAT_UNCOMPRESSED]),
            Extension::Alpn(spec.alpn_protocols.clone()),
            Extension::StatusRequest,
            Extension::SignatureAlgorithms(spec.signature_algorithms.clone()),
            Extension::SupportedVersions(spec.supported_versions.clone()),
            Extension::KeyShare(vec![KeyShareEntry { group: X25519, data: vec![0; 32] }]),
            Extension::PskKeyExchangeModes(vec![PSK_MODE_DHE]),
        ];

        spec
    }

    /// C2 SpecCloner: an independent copy with per-connection fields
    /// re-rolled (GREASE placeholders, ephemeral key-share bytes). `Clone`
    /// alone already gives backing-storage independence (§4.2); this layers
    /// the randomization TLS libraries are expected to do per handshake on
    /// top, so the shared template in the profile catalog is never mutated.
    pub fn instantiate_for_connection(&self) -> Self {
        let mut spec = self.clone();
        let mut rng = rand::thread_rng();

        for id in spec.cipher_suites.iter_mut() {
            if is_grease_value(*id) {
                *id = random_grease();
            }
        }
        for id in spec.elliptic_curves.iter_mut() {
            if is_grease_value(*id) {
                *id = random_grease();
            }
        }
        for id in spec.supported_versions.iter_mut() {
            if is_grease_value(*id) {
                *id = random_grease();
            }
        }

        for ext in spec.extensions.iter_mut() {
            match ext {
                Extension::Grease => {}
                Extension::KeyShare(entries) => {
                    for entry in entries.iter_mut() {
                        if is_grease_value(entry.group) {
                            entry.group = random_grease();
                            entry.data = vec![rng.gen()];
                        } else {
                            for b in entry.data.iter_mut() {
                                *b = rng.gen();
                            }
                        }
                    }
                }
                Extension::SupportedCurves(curves) => {
                    for c in curves.iter_mut() {
                        if is_grease_value(*c) {
                            *c = random_grease();
                        }
                    }
                }
                Extension::SupportedVersions(versions) => {
                    for v in versions.iter_mut() {
                        if is_grease_value(*v) {
                            *v = random_grease();
                        }
                    }
                }
                _ => {}
            }
        }

        spec
    }

    /// §4.4 point 4: when `force_http1` is set the clone's ALPN list is
    /// rewritten in place to contain only `http/1.1`.
    pub fn force_http1(&mut self) {
        self.alpn_protocols = vec!["http/1.1".to_string()];
    }
}

impl Default for ClientHelloSpec {
    fn default() -> Self {
        Self::chrome_133()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_is_structurally_independent() {
        let template = ClientHelloSpec::chrome_133();
        let mut clone = template.instantiate_for_connection();
        clone.cipher_suites.push(0xffff);
        clone.alpn_protocols.clear();

        assert_ne!(clone.cipher_suites.len(), template.cipher_suites.len());
        assert!(!template.alpn_protocols.is_empty());
    }

    #[test]
    fn force_http1_rewrites_only_the_clone() {
        let template = ClientHelloSpec::chrome_133();
        let mut clone = template.instantiate_for_connection();
        clone.force_http1();
        assert_eq!(clone.alpn_protocols, vec!["http/1.1".to_string()]);
        assert!(template.alpn_protocols.contains(&"h3".to_string()));
    }

    #[test]
    fn grease_is_rerolled_per_instantiation() {
        let template = ClientHelloSpec::chrome_133();
        let a = template.instantiate_for_connection();
        // cipher_suites[0] is always a GREASE placeholder pre-instantiation;
        // post-instantiation it must be a member of the GREASE set.
        assert!(is_grease_value(a.cipher_suites[0]));
    }
}
