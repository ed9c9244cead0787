//! Per-browser HTTP/2 wire-behavior tables: SETTINGS values and order,
//! pseudo-header order, the phantom-stream PRIORITY tree, and the initial
//! connection-level WINDOW_UPDATE increment. Consumed by `h2::Engine`
//! (§4.5) when it opens a connection.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum SettingId {
    HeaderTableSize = 1,
    EnablePush = 2,
    MaxConcurrentStreams = 3,
    InitialWindowSize = 4,
    MaxFrameSize = 5,
    MaxHeaderListSize = 6,
    EnableConnectProtocol = 8,
}

impl SettingId {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

pub type H2Settings = HashMap<u16, u32>;

/// A single entry in the phantom-stream PRIORITY tree Chrome sends right
/// after SETTINGS (§4.5 point 3).
#[derive(Debug, Clone, Copy)]
pub struct H2Priority {
    pub stream_id: u32,
    pub stream_dependency: u32,
    pub weight: u8,
    pub exclusive: bool,
}

/// Priority parameters attached to the client's actual request stream.
#[derive(Debug, Clone, Copy)]
pub struct H2PriorityParam {
    pub weight: u8,
    pub stream_dependency: u32,
    pub exclusive: bool,
}

impl H2PriorityParam {
    pub fn new(weight: u8, stream_dependency: u32, exclusive: bool) -> Self {
        Self { weight, stream_dependency, exclusive }
    }
}

#[derive(Debug, Clone)]
pub struct H2Profile {
    pub settings: H2Settings,
    pub settings_order: Vec<u16>,
    pub pseudo_header_order: Vec<&'static str>,
    pub connection_flow: u32,
    pub priorities: Vec<H2Priority>,
    pub header_priority: Option<H2PriorityParam>,
}

pub fn chrome() -> H2Profile {
    let mut settings = HashMap::new();
    settings.insert(SettingId::HeaderTableSize.as_u16(), 65536);
    settings.insert(SettingId::EnablePush.as_u16(), 0);
    settings.insert(SettingId::MaxConcurrentStreams.as_u16(), 1000);
    settings.insert(SettingId::InitialWindowSize.as_u16(), 6291456);
    settings.insert(SettingId::MaxHeaderListSize.as_u16(), 262144);

    H2Profile {
        settings,
        settings_order: vec![
            SettingId::HeaderTableSize.as_u16(),
            SettingId::EnablePush.as_u16(),
            SettingId::MaxConcurrentStreams.as_u16(),
            SettingId::InitialWindowSize.as_u16(),
            SettingId::MaxHeaderListSize.as_u16(),
        ],
        pseudo_header_order: vec![":method", ":authority", ":scheme", ":path"],
        connection_flow: 15_663_105,
        priorities: vec![
            H2Priority { stream_id: 3, stream_dependency: 0, weight: 200, exclusive: false },
            H2Priority { stream_id: 5, stream_dependency: 0, weight: 100, exclusive: false },
            H2Priority { stream_id: 7, stream_dependency: 0, weight: 0, exclusive: false },
            H2Priority { stream_id: 9, stream_dependency: 7, weight: 0, exclusive: false },
            H2Priority { stream_id: 11, stream_dependency: 3, weight: 0, exclusive: false },
        ],
        header_priority: Some(H2PriorityParam::new(255, 0, false)),
    }
}

pub fn firefox() -> H2Profile {
    let mut settings = HashMap::new();
    settings.insert(SettingId::HeaderTableSize.as_u16(), 65536);
    settings.insert(SettingId::InitialWindowSize.as_u16(), 131072);
    settings.insert(SettingId::MaxFrameSize.as_u16(), 16384);

    H2Profile {
        settings,
        settings_order: vec![
            SettingId::HeaderTableSize.as_u16(),
            SettingId::InitialWindowSize.as_u16(),
            SettingId::MaxFrameSize.as_u16(),
        ],
        pseudo_header_order: vec![":method", ":path", ":authority", ":scheme"],
        connection_flow: 12_517_377,
        priorities: vec![
            H2Priority { stream_id: 3, stream_dependency: 0, weight: 200, exclusive: false },
            H2Priority { stream_id: 5, stream_dependency: 0, weight: 100, exclusive: false },
            H2Priority { stream_id: 7, stream_dependency: 0, weight: 0, exclusive: false },
            H2Priority { stream_id: 9, stream_dependency: 7, weight: 0, exclusive: false },
            H2Priority { stream_id: 11, stream_dependency: 3, weight: 0, exclusive: false },
            H2Priority { stream_id: 13, stream_dependency: 0, weight: 240, exclusive: false },
        ],
        header_priority: None,
    }
}

pub fn safari() -> H2Profile {
    let mut settings = HashMap::new();
    settings.insert(SettingId::HeaderTableSize.as_u16(), 4096);
    settings.insert(SettingId::MaxConcurrentStreams.as_u16(), 100);
    settings.insert(SettingId::InitialWindowSize.as_u16(), 65535);
    settings.insert(SettingId::MaxFrameSize.as_u16(), 16_777_215);

    H2Profile {
        settings,
        settings_order: vec![
            SettingId::HeaderTableSize.as_u16(),
            SettingId::MaxConcurrentStreams.as_u16(),
            SettingId::InitialWindowSize.as_u16(),
            SettingId::MaxFrameSize.as_u16(),
        ],
        pseudo_header_order: vec![":method", ":scheme", ":path", ":authority"],
        connection_flow: 10_485_760,
        priorities: vec![],
        header_priority: Some(H2PriorityParam::new(254, 0, false)),
    }
}
