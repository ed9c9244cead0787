//! `TransportKey`: the composite identity a cached connection is filed
//! under (§3, §4.7). Two requests that would otherwise open byte-identical
//! connections share one cache slot.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransportKey {
    pub host: String,
    pub port: u16,
    pub profile_id: &'static str,
    pub proxy: Option<String>,
    pub force_http1: bool,
}

impl TransportKey {
    pub fn new(host: impl Into<String>, port: u16, profile_id: &'static str) -> Self {
        Self { host: host.into(), port, profile_id, proxy: None, force_http1: false }
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_force_http1(mut self, force: bool) -> Self {
        self.force_http1 = force;
        self
    }
}
