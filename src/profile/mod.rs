//! C1 ProfileDB + C2 SpecCloner: browser fingerprint templates and the
//! machinery to hand out an independent, per-connection instance of one.

pub mod catalog;
pub mod h2_profile;
pub mod headers;
pub mod tls_spec;
pub mod types;
pub mod useragent;

pub use catalog::{lookup, known_names, Family, Profile};
pub use h2_profile::H2Profile;
pub use headers::{generate_headers, random_fingerprint, FingerprintResult, HttpHeaders};
pub use tls_spec::{ClientHelloSpec, Extension, KeyShareEntry};
pub use types::{BrowserType, OperatingSystem};
