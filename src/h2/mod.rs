//! C5 H2Engine: a connection-scoped HTTP/2 client built on the hand-rolled
//! [`frame`]/[`hpack`] codecs instead of the `h2` crate, so that SETTINGS
//! order, the phantom PRIORITY tree, and HPACK indexing decisions match a
//! specific browser byte-for-byte (§4.5).

pub mod frame;
pub mod hpack;

use crate::error::{Error, Result, StreamErrorKind};
use crate::profile::H2Profile;
use bytes::BytesMut;
use frame::{flags, Frame, FrameType};
use hpack::DynamicTable;
use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// One HTTP/2 connection. `next_stream_id`/`send_table`/`recv_table` are
/// connection-scoped mutable state behind an internal mutex so a single
/// `Connection` can be shared across concurrently in-flight requests, same
/// as a real browser multiplexes streams on one socket.
pub struct Connection<S> {
    io: Mutex<S>,
    profile: H2Profile,
    next_stream_id: Mutex<u32>,
    send_table: Mutex<DynamicTable>,
    recv_table: Mutex<DynamicTable>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub async fn handshake(mut io: S, profile: H2Profile) -> Result<Self> {
        io.write_all(frame::PREFACE).await?;

        let settings = frame::settings_frame(&profile);
        io.write_all(&settings.encode()).await?;

        let window_update = frame::window_update_frame(0, profile.connection_flow);
        io.write_all(&window_update.encode()).await?;

        for priority in &profile.priorities {
            let p = frame::priority_frame(priority);
            io.write_all(&p.encode()).await?;
        }

        let conn = Self {
            io: Mutex::new(io),
            profile,
            next_stream_id: Mutex::new(1),
            send_table: Mutex::new(DynamicTable::new(4096)),
            recv_table: Mutex::new(DynamicTable::new(4096)),
        };

        conn.expect_server_settings().await?;
        Ok(conn)
    }

    async fn expect_server_settings(&self) -> Result<()> {
        let mut io = self.io.lock().await;
        let mut buf = BytesMut::with_capacity(4096);
        loop {
            if let Some(f) = Frame::decode(&mut buf)? {
                if f.frame_type == FrameType::Settings && f.flags & flags::ACK == 0 {
                    let ack = frame::settings_ack();
                    io.write_all(&ack.encode()).await?;
                    return Ok(());
                }
                continue;
            }
            let mut chunk = [0u8; 4096];
            let n = io.read(&mut chunk).await?;
            if n == 0 {
                return Err(Error::Protocol("connection closed before SETTINGS".into()));
            }
            buf.extend_from_slice(&chunk[..n]);
        }
    }

    /// Sends one request and waits for the full response. `headers` must
    /// already be ordered: pseudo-headers per `profile.pseudo_header_order`
    /// followed by regular headers in caller order (§4.5 point 4, §8
    /// scenario 3).
    pub async fn send_request(&self, headers: Vec<(String, String)>, body: Option<Vec<u8>>) -> Result<Response> {
        let stream_id = {
            let mut next = self.next_stream_id.lock().await;
            let id = *next;
            *next += 2;
            id
        };

        if let Some(priority) = &self.profile.header_priority {
            let p = frame::priority_frame(&crate::profile::h2_profile::H2Priority {
                stream_id,
                stream_dependency: priority.stream_dependency,
                weight: priority.weight,
                exclusive: priority.exclusive,
            });
            let mut io = self.io.lock().await;
            io.write_all(&p.encode()).await?;
        }

        let has_body = body.as_ref().is_some_and(|b| !b.is_empty());
        let block = {
            let mut table = self.send_table.lock().await;
            hpack::encode(&headers, &mut table)
        };

        let header_flags = if has_body { flags::END_HEADERS } else { flags::END_HEADERS | flags::END_STREAM };
        let header_frame = Frame {
            frame_type: FrameType::Headers,
            flags: header_flags,
            stream_id,
            payload: block.into(),
        };

        let mut io = self.io.lock().await;
        io.write_all(&header_frame.encode()).await?;

        if let Some(body) = body {
            if !body.is_empty() {
                let data_frame = Frame {
                    frame_type: FrameType::Data,
                    flags: flags::END_STREAM,
                    stream_id,
                    payload: body.into(),
                };
                io.write_all(&data_frame.encode()).await?;
            }
        }

        self.read_response(&mut io, stream_id).await
    }

    async fn read_response(&self, io: &mut tokio::sync::MutexGuard<'_, S>, stream_id: u32) -> Result<Response> {
        let mut buf = BytesMut::with_capacity(4096);
        let mut header_block = BytesMut::new();
        let mut body = Vec::new();
        let status = 0u16;
        let mut stream_done = false;

        while !stream_done {
            while let Some(f) = Frame::decode(&mut buf)? {
                if f.stream_id != stream_id && f.frame_type != FrameType::Settings && f.frame_type != FrameType::GoAway
                {
                    continue;
                }
                match f.frame_type {
                    FrameType::Headers => {
                        header_block.extend_from_slice(&f.payload);
                        if f.flags & flags::END_STREAM != 0 {
                            stream_done = true;
                        }
                    }
                    FrameType::Continuation => {
                        header_block.extend_from_slice(&f.payload);
                    }
                    FrameType::Data => {
                        body.extend_from_slice(&f.payload);
                        if f.flags & flags::END_STREAM != 0 {
                            stream_done = true;
                        }
                    }
                    FrameType::RstStream => {
                        let code = u32::from_be_bytes([f.payload[0], f.payload[1], f.payload[2], f.payload[3]]);
                        if let Some(kind) = StreamErrorKind::from_h2_code(code) {
                            return Err(Error::StreamError(kind));
                        }
                        return Err(Error::Protocol(format!("RST_STREAM code {code}")));
                    }
                    FrameType::Settings if f.flags & flags::ACK == 0 => {
                        let ack = frame::settings_ack();
                        io.write_all(&ack.encode()).await?;
                    }
                    FrameType::WindowUpdate | FrameType::Ping | FrameType::GoAway | FrameType::Priority => {}
                    _ => {}
                }
            }

            if stream_done {
                break;
            }

            let mut chunk = [0u8; 4096];
            let n = io.read(&mut chunk).await?;
            if n == 0 {
                return Err(Error::Protocol("connection closed mid-response".into()));
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let mut table = self.recv_table.lock().await;
        let pairs = hpack::decode(header_block, &mut table)?;
        let status_map: HashMap<_, _> = pairs.iter().cloned().collect();
        let status = status_map.get(":status").and_then(|s| s.parse().ok()).unwrap_or(status);
        Ok(Response { status, headers: pairs, body })
    }
}
