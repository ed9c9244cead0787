//! TLS 1.3 `signature_algorithms` registry values.
//!
//! Source: <https://www.iana.org/assignments/tls-parameters/tls-parameters.xhtml#tls-signaturescheme>

pub const PKCS1_WITH_SHA256: u16 = 0x0401;
pub const PKCS1_WITH_SHA384: u16 = 0x0501;
pub const PKCS1_WITH_SHA512: u16 = 0x0601;

pub const ECDSA_WITH_P256_AND_SHA256: u16 = 0x0403;
pub const ECDSA_WITH_P384_AND_SHA384: u16 = 0x0503;
pub const ECDSA_WITH_P521_AND_SHA512: u16 = 0x0603;

pub const PSS_WITH_SHA256: u16 = 0x0804;
pub const PSS_WITH_SHA384: u16 = 0x0805;
pub const PSS_WITH_SHA512: u16 = 0x0806;

pub const ED25519: u16 = 0x0807;
