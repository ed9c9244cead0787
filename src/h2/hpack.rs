//! Minimal HPACK (RFC 7541) codec good enough to control header order and
//! dynamic-table sizing exactly (§4.5 point 4), at the cost of supporting
//! only the subset of encodings real browsers actually emit: static-table
//! lookups, literal fields without indexing, and literal fields with
//! incremental indexing. Huffman coding is not implemented -- real clients
//! use it for bandwidth, not fingerprinting, and skipping it keeps this
//! codec auditable.

use crate::error::{Error, Result};
use bytes::{Buf, BufMut, BytesMut};

const STATIC_TABLE: &[(&str, &str)] = &[
    (":authority", ""),
    (":method", "GET"),
    (":method", "POST"),
    (":path", "/"),
    (":path", "/index.html"),
    (":scheme", "http"),
    (":scheme", "https"),
    (":status", "200"),
    (":status", "204"),
    (":status", "206"),
    (":status", "304"),
    (":status", "400"),
    (":status", "404"),
    (":status", "500"),
    ("accept-charset", ""),
    ("accept-encoding", "gzip, deflate"),
    ("accept-language", ""),
    ("accept-ranges", ""),
    ("accept", ""),
    ("access-control-allow-origin", ""),
    ("age", ""),
    ("allow", ""),
    ("authorization", ""),
    ("cache-control", ""),
    ("content-disposition", ""),
    ("content-encoding", ""),
    ("content-language", ""),
    ("content-length", ""),
    ("content-location", ""),
    ("content-range", ""),
    ("content-type", ""),
    ("cookie", ""),
    ("date", ""),
    ("etag", ""),
    ("expect", ""),
    ("expires", ""),
    ("from", ""),
    ("host", ""),
    ("if-match", ""),
    ("if-modified-since", ""),
    ("if-none-match", ""),
    ("if-range", ""),
    ("if-unmodified-since", ""),
    ("last-modified", ""),
    ("link", ""),
    ("location", ""),
    ("max-forwards", ""),
    ("proxy-authenticate", ""),
    ("proxy-authorization", ""),
    ("range", ""),
    ("referer", ""),
    ("refresh", ""),
    ("retry-after", ""),
    ("server", ""),
    ("set-cookie", ""),
    ("strict-transport-security", ""),
    ("transfer-encoding", ""),
    ("user-agent", ""),
    ("vary", ""),
    ("via", ""),
    ("www-authenticate", ""),
];

fn static_lookup(name: &str, value: &str) -> Option<(usize, bool)> {
    let mut name_only = None;
    for (i, (n, v)) in STATIC_TABLE.iter().enumerate() {
        if *n == name {
            if *v == value {
                return Some((i + 1, true));
            }
            if name_only.is_none() {
                name_only = Some(i + 1);
            }
        }
    }
    name_only.map(|idx| (idx, false))
}

#[derive(Debug, Clone)]
struct DynamicEntry {
    name: String,
    value: String,
}

/// Per-connection dynamic table, shared between the encoder and decoder
/// directions of one HTTP/2 connection (RFC 7541 §2.3.2).
pub struct DynamicTable {
    entries: Vec<DynamicEntry>,
    max_size: usize,
    size: usize,
}

impl DynamicTable {
    pub fn new(max_size: usize) -> Self {
        Self { entries: Vec::new(), max_size, size: 0 }
    }

    fn entry_size(name: &str, value: &str) -> usize {
        name.len() + value.len() + 32
    }

    fn insert(&mut self, name: String, value: String) {
        let entry_size = Self::entry_size(&name, &value);
        self.size += entry_size;
        self.entries.insert(0, DynamicEntry { name, value });
        while self.size > self.max_size && !self.entries.is_empty() {
            let evicted = self.entries.pop().unwrap();
            self.size -= Self::entry_size(&evicted.name, &evicted.value);
        }
    }

    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        while self.size > self.max_size && !self.entries.is_empty() {
            let evicted = self.entries.pop().unwrap();
            self.size -= Self::entry_size(&evicted.name, &evicted.value);
        }
    }

    fn get(&self, index: usize) -> Option<(&str, &str)> {
        self.entries.get(index).map(|e| (e.name.as_str(), e.value.as_str()))
    }
}

fn encode_int(mut value: u64, prefix_bits: u8, prefix_value: u8, out: &mut BytesMut) {
    let max_prefix = (1u64 << prefix_bits) - 1;
    if value < max_prefix {
        out.put_u8(prefix_value | value as u8);
        return;
    }
    out.put_u8(prefix_value | max_prefix as u8);
    value -= max_prefix;
    while value >= 128 {
        out.put_u8((value % 128 + 128) as u8);
        value /= 128;
    }
    out.put_u8(value as u8);
}

fn encode_string(s: &str, out: &mut BytesMut) {
    encode_int(s.len() as u64, 7, 0x00, out);
    out.put_slice(s.as_bytes());
}

fn decode_int(buf: &mut BytesMut, prefix_bits: u8) -> Result<u64> {
    if buf.is_empty() {
        return Err(Error::Protocol("truncated HPACK integer".into()));
    }
    let max_prefix = (1u64 << prefix_bits) - 1;
    let first = (buf[0] as u64) & max_prefix;
    buf.advance(1);
    if first < max_prefix {
        return Ok(first);
    }
    let mut value = first;
    let mut m = 0u32;
    loop {
        if buf.is_empty() {
            return Err(Error::Protocol("truncated HPACK integer continuation".into()));
        }
        let b = buf[0];
        buf.advance(1);
        value += ((b & 0x7f) as u64) << m;
        m += 7;
        if b & 0x80 == 0 {
            break;
        }
    }
    Ok(value)
}

fn decode_string(buf: &mut BytesMut) -> Result<String> {
    if buf.is_empty() {
        return Err(Error::Protocol("truncated HPACK string".into()));
    }
    let huffman = buf[0] & 0x80 != 0;
    let len = decode_int(buf, 7)? as usize;
    if buf.len() < len {
        return Err(Error::Protocol("truncated HPACK string literal".into()));
    }
    let bytes = buf.split_to(len);
    if huffman {
        return Err(Error::Protocol("Huffman-coded HPACK strings are not supported".into()));
    }
    String::from_utf8(bytes.to_vec()).map_err(|e| Error::Protocol(e.to_string()))
}

/// Encodes `headers` in the exact order given, using incremental indexing
/// for everything except `:path`/`cookie` (never indexed, matching real
/// browser behavior for high-cardinality fields).
pub fn encode(headers: &[(String, String)], table: &mut DynamicTable) -> Vec<u8> {
    let mut out = BytesMut::new();
    for (name, value) in headers {
        if let Some((index, full_match)) = static_lookup(name, value) {
            if full_match {
                encode_int(index as u64, 7, 0x80, &mut out);
                continue;
            }
            let never_index = name == ":path" || name == "cookie";
            let prefix = if never_index { 0x10 } else { 0x40 };
            encode_int(index as u64, if never_index { 4 } else { 6 }, prefix, &mut out);
            encode_string(value, &mut out);
            if !never_index {
                table.insert(name.clone(), value.clone());
            }
            continue;
        }
        let never_index = name == ":path" || name == "cookie";
        out.put_u8(if never_index { 0x10 } else { 0x40 });
        encode_string(name, &mut out);
        encode_string(value, &mut out);
        if !never_index {
            table.insert(name.clone(), value.clone());
        }
    }
    out.to_vec()
}

pub fn decode(mut buf: BytesMut, table: &mut DynamicTable) -> Result<Vec<(String, String)>> {
    let mut headers = Vec::new();
    while !buf.is_empty() {
        let first = buf[0];
        if first & 0x80 != 0 {
            let index = decode_int(&mut buf, 7)? as usize;
            let (name, value) = lookup_indexed(index, table)?;
            headers.push((name, value));
        } else if first & 0x40 != 0 {
            let index = decode_int(&mut buf, 6)?;
            let name = if index == 0 { decode_string(&mut buf)? } else { lookup_indexed(index as usize, table)?.0 };
            let value = decode_string(&mut buf)?;
            table.insert(name.clone(), value.clone());
            headers.push((name, value));
        } else if first & 0x20 != 0 {
            let max_size = decode_int(&mut buf, 5)? as usize;
            table.set_max_size(max_size);
        } else {
            let prefix_bits = if first & 0x10 != 0 { 4 } else { 4 };
            let index = decode_int(&mut buf, prefix_bits)?;
            let name = if index == 0 { decode_string(&mut buf)? } else { lookup_indexed(index as usize, table)?.0 };
            let value = decode_string(&mut buf)?;
            headers.push((name, value));
        }
    }
    Ok(headers)
}

fn lookup_indexed(index: usize, table: &DynamicTable) -> Result<(String, String)> {
    if index == 0 {
        return Err(Error::Protocol("HPACK index 0 is invalid".into()));
    }
    if index <= STATIC_TABLE.len() {
        let (n, v) = STATIC_TABLE[index - 1];
        return Ok((n.to_string(), v.to_string()));
    }
    table
        .get(index - STATIC_TABLE.len() - 1)
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .ok_or_else(|| Error::Protocol(format!("HPACK index {index} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_caller_supplied_header_order() {
        let mut table = DynamicTable::new(4096);
        let headers = vec![
            (":method".to_string(), "GET".to_string()),
            (":authority".to_string(), "example.com".to_string()),
            (":scheme".to_string(), "https".to_string()),
            (":path".to_string(), "/".to_string()),
            ("x-custom".to_string(), "value".to_string()),
        ];
        let encoded = encode(&headers, &mut table);

        let mut decode_table = DynamicTable::new(4096);
        let decoded = decode(BytesMut::from(&encoded[..]), &mut decode_table).unwrap();
        assert_eq!(decoded, headers);
    }

    #[test]
    fn never_indexed_fields_do_not_grow_dynamic_table() {
        let mut table = DynamicTable::new(4096);
        let headers = vec![
            (":path".to_string(), "/a/very/long/unique/path/value".to_string()),
            ("cookie".to_string(), "session=unique-per-request".to_string()),
        ];
        let _ = encode(&headers, &mut table);
        assert_eq!(table.size, 0);
    }
}
