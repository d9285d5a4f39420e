//! Minimal OSC 1.0 packet decoding.
//!
//! Handles messages and (nested) bundles with the standard argument
//! types. Unknown type tags abort the message rather than guessing at its
//! layout.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum OscArg {
    Int(i32),
    Float(f32),
    Str(String),
    Blob(Vec<u8>),
    Long(i64),
    Double(f64),
    TimeTag(u64),
    Char(char),
    Color(u32),
    Midi([u8; 4]),
    Bool(bool),
    Nil,
    Impulse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    pub address: String,
    pub type_tags: String,
    pub args: Vec<OscArg>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("packet truncated")]
    Truncated,
    #[error("unterminated or non-UTF-8 string")]
    BadString,
    #[error("address does not start with '/'")]
    BadAddress,
    #[error("unknown type tag '{0}'")]
    UnknownTag(char),
}

impl fmt::Display for OscArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OscArg::Int(value) => write!(f, "{value}"),
            OscArg::Float(value) => write!(f, "{value}"),
            OscArg::Str(value) => write!(f, "{value}"),
            OscArg::Blob(bytes) => write!(f, "blob[{}]", bytes.len()),
            OscArg::Long(value) => write!(f, "{value}"),
            OscArg::Double(value) => write!(f, "{value}"),
            OscArg::TimeTag(value) => write!(f, "{value}"),
            OscArg::Char(value) => write!(f, "{value}"),
            OscArg::Color(value) => write!(f, "#{value:08x}"),
            OscArg::Midi(bytes) => write!(f, "midi{bytes:?}"),
            OscArg::Bool(value) => write!(f, "{value}"),
            OscArg::Nil => write!(f, "nil"),
            OscArg::Impulse => write!(f, "impulse"),
        }
    }
}

/// Text form used by consoles and visuals: `"/play ,sf kalimba 0.5"`.
impl fmt::Display for OscMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ,{}", self.address, self.type_tags)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

const BUNDLE_TAG: &[u8] = b"#bundle\0";

/// Decode a UDP payload into the messages it carries.
pub fn decode_packet(bytes: &[u8]) -> Result<Vec<OscMessage>, DecodeError> {
    let mut messages = Vec::new();
    decode_into(bytes, &mut messages)?;
    Ok(messages)
}

fn decode_into(bytes: &[u8], out: &mut Vec<OscMessage>) -> Result<(), DecodeError> {
    if bytes.starts_with(BUNDLE_TAG) {
        // Skip the tag and the 8-byte time tag.
        let mut reader = Reader::new(bytes);
        reader.take(BUNDLE_TAG.len() + 8)?;
        while !reader.is_done() {
            let size = reader.read_i32()?;
            let size = usize::try_from(size).map_err(|_| DecodeError::Truncated)?;
            let element = reader.take(size)?;
            decode_into(element, out)?;
        }
        return Ok(());
    }
    out.push(decode_message(bytes)?);
    Ok(())
}

fn decode_message(bytes: &[u8]) -> Result<OscMessage, DecodeError> {
    let mut reader = Reader::new(bytes);
    let address = reader.read_string()?;
    if !address.starts_with('/') {
        return Err(DecodeError::BadAddress);
    }
    // Type tags are optional in very old senders.
    if reader.is_done() {
        return Ok(OscMessage {
            address,
            type_tags: String::new(),
            args: Vec::new(),
        });
    }
    let tags = reader.read_string()?;
    let tags = tags.strip_prefix(',').unwrap_or(&tags).to_string();

    let mut args = Vec::with_capacity(tags.len());
    for tag in tags.chars() {
        let arg = match tag {
            'i' => OscArg::Int(reader.read_i32()?),
            'f' => OscArg::Float(f32::from_bits(reader.read_u32()?)),
            's' | 'S' => OscArg::Str(reader.read_string()?),
            'b' => OscArg::Blob(reader.read_blob()?),
            'h' => OscArg::Long(reader.read_u64()? as i64),
            'd' => OscArg::Double(f64::from_bits(reader.read_u64()?)),
            't' => OscArg::TimeTag(reader.read_u64()?),
            'c' => OscArg::Char(char::from_u32(reader.read_u32()?).unwrap_or('?')),
            'r' => OscArg::Color(reader.read_u32()?),
            'm' => {
                let raw = reader.take(4)?;
                OscArg::Midi([raw[0], raw[1], raw[2], raw[3]])
            }
            'T' => OscArg::Bool(true),
            'F' => OscArg::Bool(false),
            'N' => OscArg::Nil,
            'I' => OscArg::Impulse,
            '[' | ']' => continue,
            other => return Err(DecodeError::UnknownTag(other)),
        };
        args.push(arg);
    }

    Ok(OscMessage {
        address,
        type_tags: tags,
        args,
    })
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn is_done(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.checked_add(len).ok_or(DecodeError::Truncated)?;
        let slice = self.bytes.get(self.pos..end).ok_or(DecodeError::Truncated)?;
        self.pos = end;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let raw = self.take(4)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(self.read_u32()? as i32)
    }

    fn read_u64(&mut self) -> Result<u64, DecodeError> {
        let raw = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(raw);
        Ok(u64::from_be_bytes(buf))
    }

    /// NUL-terminated string padded to a multiple of four bytes.
    fn read_string(&mut self) -> Result<String, DecodeError> {
        let rest = self.bytes.get(self.pos..).ok_or(DecodeError::Truncated)?;
        let nul = rest
            .iter()
            .position(|byte| *byte == 0)
            .ok_or(DecodeError::BadString)?;
        let text = std::str::from_utf8(&rest[..nul]).map_err(|_| DecodeError::BadString)?;
        let text = text.to_string();
        self.take(padded_len(nul + 1))?;
        Ok(text)
    }

    fn read_blob(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = usize::try_from(self.read_i32()?).map_err(|_| DecodeError::Truncated)?;
        let data = self.take(len)?.to_vec();
        self.take(padded_len(len) - len)?;
        Ok(data)
    }
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(4) * 4
}
