//! Hand-rolled HTTP/2 frame codec (RFC 9113 §4). Written in-house rather
//! than delegating to the `h2` crate: `h2` owns SETTINGS/WINDOW_UPDATE/
//! PRIORITY ordering internally and gives callers no way to reproduce a
//! specific browser's wire order, which is the entire point of C5
//! H2Engine (§4.5).

use crate::error::{Error, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

pub const PREFACE: &[u8] = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Data,
    Headers,
    Priority,
    RstStream,
    Settings,
    PushPromise,
    Ping,
    GoAway,
    WindowUpdate,
    Continuation,
}

impl FrameType {
    fn from_u8(b: u8) -> Option<Self> {
        Some(match b {
            0x0 => FrameType::Data,
            0x1 => FrameType::Headers,
            0x2 => FrameType::Priority,
            0x3 => FrameType::RstStream,
            0x4 => FrameType::Settings,
            0x5 => FrameType::PushPromise,
            0x6 => FrameType::Ping,
            0x7 => FrameType::GoAway,
            0x8 => FrameType::WindowUpdate,
            0x9 => FrameType::Continuation,
            _ => return None,
        })
    }

    fn as_u8(self) -> u8 {
        match self {
            FrameType::Data => 0x0,
            FrameType::Headers => 0x1,
            FrameType::Priority => 0x2,
            FrameType::RstStream => 0x3,
            FrameType::Settings => 0x4,
            FrameType::PushPromise => 0x5,
            FrameType::Ping => 0x6,
            FrameType::GoAway => 0x7,
            FrameType::WindowUpdate => 0x8,
            FrameType::Continuation => 0x9,
        }
    }
}

pub mod flags {
    pub const END_STREAM: u8 = 0x1;
    pub const END_HEADERS: u8 = 0x4;
    pub const PADDED: u8 = 0x8;
    pub const PRIORITY: u8 = 0x20;
    pub const ACK: u8 = 0x1;
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub frame_type: FrameType,
    pub flags: u8,
    pub stream_id: u32,
    pub payload: Bytes,
}

impl Frame {
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(9 + self.payload.len());
        let len = self.payload.len() as u32;
        buf.put_u8((len >> 16) as u8);
        buf.put_u8((len >> 8) as u8);
        buf.put_u8(len as u8);
        buf.put_u8(self.frame_type.as_u8());
        buf.put_u8(self.flags);
        buf.put_u32(self.stream_id & 0x7fff_ffff);
        buf.put(self.payload.clone());
        buf.freeze()
    }

    pub fn decode(buf: &mut BytesMut) -> Result<Option<Frame>> {
        if buf.len() < 9 {
            return Ok(None);
        }
        let len = ((buf[0] as usize) << 16) | ((buf[1] as usize) << 8) | buf[2] as usize;
        if buf.len() < 9 + len {
            return Ok(None);
        }
        let frame_type = FrameType::from_u8(buf[3])
            .ok_or_else(|| Error::Protocol(format!("unknown HTTP/2 frame type {}", buf[3])))?;
        let flags = buf[4];
        let stream_id = u32::from_be_bytes([buf[5], buf[6], buf[7], buf[8]]) & 0x7fff_ffff;

        buf.advance(9);
        let payload = buf.split_to(len).freeze();
        Ok(Some(Frame { frame_type, flags, stream_id, payload }))
    }
}

/// Encodes the ordered SETTINGS payload for a connection preface, honoring
/// `settings_order` rather than any fixed/sorted order (§4.5 point 1).
pub fn settings_frame(settings: &crate::profile::H2Profile) -> Frame {
    let mut payload = BytesMut::new();
    for id in &settings.settings_order {
        if let Some(value) = settings.settings.get(id) {
            payload.put_u16(*id);
            payload.put_u32(*value);
        }
    }
    Frame { frame_type: FrameType::Settings, flags: 0, stream_id: 0, payload: payload.freeze() }
}

pub fn settings_ack() -> Frame {
    Frame { frame_type: FrameType::Settings, flags: flags::ACK, stream_id: 0, payload: Bytes::new() }
}

pub fn window_update_frame(stream_id: u32, increment: u32) -> Frame {
    let mut payload = BytesMut::with_capacity(4);
    payload.put_u32(increment & 0x7fff_ffff);
    Frame { frame_type: FrameType::WindowUpdate, flags: 0, stream_id, payload: payload.freeze() }
}

pub fn priority_frame(p: &crate::profile::h2_profile::H2Priority) -> Frame {
    let mut payload = BytesMut::with_capacity(5);
    let dep = p.stream_dependency | if p.exclusive { 0x8000_0000 } else { 0 };
    payload.put_u32(dep);
    payload.put_u8(p.weight);
    Frame { frame_type: FrameType::Priority, flags: 0, stream_id: p.stream_id, payload: payload.freeze() }
}

pub fn rst_stream_frame(stream_id: u32, error_code: u32) -> Frame {
    let mut payload = BytesMut::with_capacity(4);
    payload.put_u32(error_code);
    Frame { frame_type: FrameType::RstStream, flags: 0, stream_id, payload: payload.freeze() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_wire_encoding() {
        let frame = Frame {
            frame_type: FrameType::Headers,
            flags: flags::END_HEADERS | flags::END_STREAM,
            stream_id: 1,
            payload: Bytes::from_static(b"hello"),
        };
        let encoded = frame.encode();
        let mut buf = BytesMut::from(&encoded[..]);
        let decoded = Frame::decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded.frame_type, FrameType::Headers);
        assert_eq!(decoded.stream_id, 1);
        assert_eq!(&decoded.payload[..], b"hello");
    }

    #[test]
    fn settings_frame_preserves_declared_order() {
        let profile = crate::profile::h2_profile::chrome();
        let frame = settings_frame(&profile);
        let mut offset = 0;
        for id in &profile.settings_order {
            let got = u16::from_be_bytes([frame.payload[offset], frame.payload[offset + 1]]);
            assert_eq!(got, *id);
            offset += 6;
        }
    }
}
