/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::fmt;
use std::net::Ipv4Addr;

use super::error::{Error, Result};
use super::oid::Oid;

/* Universal tags. */

pub(crate) const TAG_INTEGER: u8 = 0x02;
pub(crate) const TAG_OCTET_STRING: u8 = 0x04;
pub(crate) const TAG_NULL: u8 = 0x05;
pub(crate) const TAG_OBJECT_IDENTIFIER: u8 = 0x06;
pub(crate) const TAG_SEQUENCE: u8 = 0x30;

/* SNMP application tags. */

pub(crate) const TAG_IP_ADDRESS: u8 = 0x40;
pub(crate) const TAG_COUNTER32: u8 = 0x41;
pub(crate) const TAG_GAUGE32: u8 = 0x42;
pub(crate) const TAG_TIMETICKS: u8 = 0x43;
pub(crate) const TAG_COUNTER64: u8 = 0x46;

/* Varbind exception markers (context tags). */

pub(crate) const TAG_NO_SUCH_OBJECT: u8 = 0x80;
pub(crate) const TAG_NO_SUCH_INSTANCE: u8 = 0x81;
pub(crate) const TAG_END_OF_MIB_VIEW: u8 = 0x82;

/// A BER-tagged value: the wire-level identity together with the
/// payload. The three SNMPv2c exception markers are ordinary variants
/// so that callers can pattern-match them instead of special-casing
/// control flow.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Value {
    Integer(i64),
    OctetString(Vec<u8>),
    Null,
    ObjectIdentifier(Oid),
    Sequence(Vec<Value>),
    IpAddress([u8; 4]),
    Counter32(u32),
    Gauge32(u32),
    TimeTicks(u32),
    Counter64(u64),
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl Value {
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Self::Integer(n) => encode_integer(out, *n),
            Self::OctetString(bytes) => {
                encode_tlv(out, TAG_OCTET_STRING, bytes)
            }
            Self::Null => encode_tlv(out, TAG_NULL, &[]),
            Self::ObjectIdentifier(oid) => encode_oid(out, oid),
            Self::Sequence(values) => {
                let mut content = Vec::new();
                for value in values {
                    value.encode(&mut content);
                }
                encode_tlv(out, TAG_SEQUENCE, &content);
            }
            Self::IpAddress(addr) => encode_tlv(out, TAG_IP_ADDRESS, addr),
            Self::Counter32(n) => {
                encode_tlv(out, TAG_COUNTER32, &unsigned_content(*n as u64))
            }
            Self::Gauge32(n) => {
                encode_tlv(out, TAG_GAUGE32, &unsigned_content(*n as u64))
            }
            Self::TimeTicks(n) => {
                encode_tlv(out, TAG_TIMETICKS, &unsigned_content(*n as u64))
            }
            Self::Counter64(n) => {
                encode_tlv(out, TAG_COUNTER64, &unsigned_content(*n))
            }
            Self::NoSuchObject => encode_tlv(out, TAG_NO_SUCH_OBJECT, &[]),
            Self::NoSuchInstance => encode_tlv(out, TAG_NO_SUCH_INSTANCE, &[]),
            Self::EndOfMibView => encode_tlv(out, TAG_END_OF_MIB_VIEW, &[]),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }

    /// Decode exactly one value; trailing data is an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(bytes);
        let value = decoder.read_value()?;
        match decoder.is_empty() {
            true => Ok(value),
            false => Err(Error::FaultyResponse(String::from(
                "trailing data after value",
            ))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::OctetString(bytes) => {
                write!(f, "{:?}", String::from_utf8_lossy(bytes))
            }
            Self::Null => write!(f, "null"),
            Self::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Self::Sequence(values) => {
                write!(f, "(")?;
                let mut values = values.iter();
                if let Some(value) = values.next() {
                    write!(f, "{}", value)?;
                    for value in values {
                        write!(f, ", {}", value)?;
                    }
                }
                write!(f, ")")
            }
            Self::IpAddress(addr) => write!(f, "{}", Ipv4Addr::from(*addr)),
            Self::Counter32(n) | Self::Gauge32(n) | Self::TimeTicks(n) => {
                write!(f, "{}", n)
            }
            Self::Counter64(n) => write!(f, "{}", n),
            Self::NoSuchObject => write!(f, "noSuchObject"),
            Self::NoSuchInstance => write!(f, "noSuchInstance"),
            Self::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}

/* Encoding primitives. */

pub(crate) fn encode_tlv(out: &mut Vec<u8>, tag: u8, content: &[u8]) {
    out.push(tag);
    encode_length(out, content.len());
    out.extend_from_slice(content);
}

fn encode_length(out: &mut Vec<u8>, len: usize) {
    if len < 128 {
        out.push(len as u8);
    } else {
        let bytes = len.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        out.push(0x80 | (bytes.len() - skip) as u8);
        out.extend_from_slice(&bytes[skip..]);
    }
}

pub(crate) fn encode_integer(out: &mut Vec<u8>, n: i64) {
    let bytes = n.to_be_bytes();
    let mut skip = 0;
    while skip < 7
        && ((bytes[skip] == 0x00 && bytes[skip + 1] & 0x80 == 0)
            || (bytes[skip] == 0xff && bytes[skip + 1] & 0x80 != 0))
    {
        skip += 1;
    }
    encode_tlv(out, TAG_INTEGER, &bytes[skip..]);
}

/// Minimal unsigned content octets, with a leading zero octet when the
/// high bit of the first octet is set.
fn unsigned_content(n: u64) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count().min(7);
    let mut content = Vec::with_capacity(9);
    if bytes[skip] & 0x80 != 0 {
        content.push(0);
    }
    content.extend_from_slice(&bytes[skip..]);
    content
}

pub(crate) fn encode_oid(out: &mut Vec<u8>, oid: &Oid) {
    let ids = oid.as_slice();
    let mut content = Vec::new();
    match ids {
        [] => {}
        [first] => push_subid(&mut content, first * 40),
        [first, second, rest @ ..] => {
            push_subid(&mut content, first * 40 + second);
            for id in rest {
                push_subid(&mut content, *id);
            }
        }
    }
    encode_tlv(out, TAG_OBJECT_IDENTIFIER, &content);
}

/// Base-128 encoding with continuation bits, big-endian.
fn push_subid(out: &mut Vec<u8>, id: u32) {
    let mut chunks = [0u8; 5];
    let mut n = 0;
    let mut id = id;
    loop {
        chunks[n] = (id & 0x7f) as u8;
        id >>= 7;
        n += 1;
        if id == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        out.push(match i {
            0 => chunks[i],
            _ => chunks[i] | 0x80,
        });
    }
}

/* Decoding. */

pub(crate) struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn byte(&mut self) -> Result<u8> {
        let b = self
            .buf
            .get(self.pos)
            .copied()
            .ok_or_else(|| malformed("unexpected end of data"))?;
        self.pos += 1;
        Ok(b)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        match self.buf.len() - self.pos >= n {
            true => {
                let content = &self.buf[self.pos..self.pos + n];
                self.pos += n;
                Ok(content)
            }
            false => Err(malformed("truncated content")),
        }
    }

    pub(crate) fn read_tlv(&mut self) -> Result<(u8, &'a [u8])> {
        let tag = self.byte()?;
        let len = self.read_length()?;
        Ok((tag, self.take(len)?))
    }

    fn read_length(&mut self) -> Result<usize> {
        let b = self.byte()?;
        if b & 0x80 == 0 {
            return Ok(b as usize);
        }
        let n = (b & 0x7f) as usize;
        if n == 0 || n > std::mem::size_of::<usize>() {
            return Err(malformed("unsupported length encoding"));
        }
        let mut len = 0usize;
        for b in self.take(n)? {
            len = len << 8 | *b as usize;
        }
        Ok(len)
    }

    pub(crate) fn read_integer(&mut self) -> Result<i64> {
        match self.read_tlv()? {
            (TAG_INTEGER, content) => decode_integer(content),
            (tag, _) => {
                Err(malformed(format!("expected integer, got tag {:#x}", tag)))
            }
        }
    }

    pub(crate) fn read_octet_string(&mut self) -> Result<&'a [u8]> {
        match self.read_tlv()? {
            (TAG_OCTET_STRING, content) => Ok(content),
            (tag, _) => Err(malformed(format!(
                "expected octet string, got tag {:#x}",
                tag
            ))),
        }
    }

    pub(crate) fn read_sequence(&mut self) -> Result<Decoder<'a>> {
        match self.read_tlv()? {
            (TAG_SEQUENCE, content) => Ok(Decoder::new(content)),
            (tag, _) => {
                Err(malformed(format!("expected sequence, got tag {:#x}", tag)))
            }
        }
    }

    pub(crate) fn read_oid(&mut self) -> Result<Oid> {
        match self.read_tlv()? {
            (TAG_OBJECT_IDENTIFIER, content) => decode_oid_content(content),
            (tag, _) => {
                Err(malformed(format!("expected OID, got tag {:#x}", tag)))
            }
        }
    }

    pub(crate) fn read_value(&mut self) -> Result<Value> {
        let (tag, content) = self.read_tlv()?;
        match tag {
            TAG_INTEGER => Ok(Value::Integer(decode_integer(content)?)),
            TAG_OCTET_STRING => Ok(Value::OctetString(content.to_vec())),
            TAG_NULL => Ok(Value::Null),
            TAG_OBJECT_IDENTIFIER => {
                Ok(Value::ObjectIdentifier(decode_oid_content(content)?))
            }
            TAG_SEQUENCE => {
                let mut decoder = Decoder::new(content);
                let mut values = Vec::new();
                while !decoder.is_empty() {
                    values.push(decoder.read_value()?);
                }
                Ok(Value::Sequence(values))
            }
            TAG_IP_ADDRESS => match content {
                [a, b, c, d] => Ok(Value::IpAddress([*a, *b, *c, *d])),
                _ => Err(malformed("IP address is not 4 bytes")),
            },
            TAG_COUNTER32 => Ok(Value::Counter32(decode_u32(content)?)),
            TAG_GAUGE32 => Ok(Value::Gauge32(decode_u32(content)?)),
            TAG_TIMETICKS => Ok(Value::TimeTicks(decode_u32(content)?)),
            TAG_COUNTER64 => Ok(Value::Counter64(decode_u64(content)?)),
            TAG_NO_SUCH_OBJECT => Ok(Value::NoSuchObject),
            TAG_NO_SUCH_INSTANCE => Ok(Value::NoSuchInstance),
            TAG_END_OF_MIB_VIEW => Ok(Value::EndOfMibView),
            tag => Err(malformed(format!("unknown tag {:#x}", tag))),
        }
    }
}

fn decode_integer(content: &[u8]) -> Result<i64> {
    match content {
        [] => Err(malformed("empty integer")),
        [first, ..] if content.len() <= 8 => {
            let mut n = match first & 0x80 {
                0 => 0i64,
                _ => -1i64,
            };
            for b in content {
                n = n << 8 | *b as i64;
            }
            Ok(n)
        }
        _ => Err(malformed("oversized integer")),
    }
}

fn decode_u64(content: &[u8]) -> Result<u64> {
    match content {
        [] => Err(malformed("empty integer")),
        [0, rest @ ..] if rest.len() <= 8 => Ok(be_u64(rest)),
        [first, ..] if content.len() <= 8 && first & 0x80 == 0 => {
            Ok(be_u64(content))
        }
        _ => Err(malformed("invalid unsigned integer")),
    }
}

fn decode_u32(content: &[u8]) -> Result<u32> {
    u32::try_from(decode_u64(content)?)
        .map_err(|_| malformed("oversized 32-bit integer"))
}

fn be_u64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |n, b| n << 8 | *b as u64)
}

fn decode_oid_content(content: &[u8]) -> Result<Oid> {
    let mut ids = Vec::new();
    let mut iter = content.iter().peekable();
    let mut first = true;
    while iter.peek().is_some() {
        let mut id = 0u32;
        loop {
            let b = iter.next().ok_or_else(|| malformed("truncated OID"))?;
            if id > u32::MAX >> 7 {
                return Err(malformed("oversized OID sub-identifier"));
            }
            id = id << 7 | (b & 0x7f) as u32;
            if b & 0x80 == 0 {
                break;
            }
        }
        if first {
            first = false;
            match id {
                0..=39 => ids.extend([0, id]),
                40..=79 => ids.extend([1, id - 40]),
                _ => ids.extend([2, id - 80]),
            }
        } else {
            ids.push(id);
        }
    }
    Ok(Oid::from_vec(ids))
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::FaultyResponse(msg.into())
}
