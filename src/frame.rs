//! Length-prefixed framing for the native messaging channel
//!
//! Every message in either direction is:
//!
//! ```text
//! +---------------------------+---------------------------+
//! | length: u32 (4 bytes)     | payload (length bytes)    |
//! +---------------------------+---------------------------+
//! ```
//!
//! The length uses [`ByteOrder`], which both peers agree on out of band. For
//! browser native messaging that is the host platform's native order. There
//! is no handshake.

use serde::Deserialize;
use std::io::{self, Read, Write};
use thiserror::Error;

/// Length prefix size in bytes
pub const HEADER_SIZE: usize = 4;

/// Default cap on the payload bytes read for one frame
pub const DEFAULT_MAX_PAYLOAD: usize = 8192;

/// Largest `max_payload` a config may ask for (1 MiB, the browser's own
/// limit for messages sent to a native host)
pub const MAX_PAYLOAD_LIMIT: usize = 1_048_576;

/// Byte order of the length prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Whatever this platform uses
    #[default]
    Native,
    Little,
    Big,
}

impl ByteOrder {
    /// Resolve `Native` to the concrete order of this build
    pub fn resolve(self) -> ByteOrder {
        match self {
            ByteOrder::Native if cfg!(target_endian = "big") => ByteOrder::Big,
            ByteOrder::Native => ByteOrder::Little,
            other => other,
        }
    }

    pub fn read_u32(self, bytes: [u8; HEADER_SIZE]) -> u32 {
        match self.resolve() {
            ByteOrder::Big => u32::from_be_bytes(bytes),
            _ => u32::from_le_bytes(bytes),
        }
    }

    pub fn write_u32(self, value: u32) -> [u8; HEADER_SIZE] {
        match self.resolve() {
            ByteOrder::Big => value.to_be_bytes(),
            _ => value.to_le_bytes(),
        }
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.resolve() {
            ByteOrder::Big => write!(f, "big-endian"),
            _ => write!(f, "little-endian"),
        }
    }
}

/// Framing failures
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// Only returned in strict mode; the payload was left unread
    #[error("frame declares {declared} bytes, limit is {max}")]
    Oversized { declared: usize, max: usize },

    /// The stream ended inside a frame's payload
    #[error("stream ended after {received} of {declared} payload bytes")]
    Truncated { declared: usize, received: usize },

    #[error("payload of {0} bytes does not fit a u32 length")]
    TooLong(usize),
}

/// A frame as read from the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Length announced in the header
    pub declared: usize,

    /// Payload bytes actually kept (at most the codec's limit)
    pub payload: Vec<u8>,
}

impl Frame {
    /// The header announced more bytes than were kept
    pub fn is_truncated(&self) -> bool {
        self.payload.len() < self.declared
    }
}

/// Reads and writes frames
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    byte_order: ByteOrder,
    max_payload: usize,
    strict: bool,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(ByteOrder::Native, DEFAULT_MAX_PAYLOAD, false)
    }
}

impl FrameCodec {
    pub fn new(byte_order: ByteOrder, max_payload: usize, strict: bool) -> Self {
        Self {
            byte_order,
            max_payload,
            strict,
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Read the next frame. `Ok(None)` means the peer closed the stream
    /// before a complete header arrived.
    ///
    /// An oversized frame keeps only its first `max_payload` bytes and the
    /// rest of it is discarded so the next read starts on a frame boundary.
    /// In strict mode it is refused with [`FrameError::Oversized`] instead.
    pub fn read_frame<R: Read>(&self, reader: &mut R) -> Result<Option<Frame>, FrameError> {
        let mut header = [0u8; HEADER_SIZE];
        if read_full(reader, &mut header)? < HEADER_SIZE {
            return Ok(None);
        }

        let declared = self.byte_order.read_u32(header) as usize;
        if declared > self.max_payload && self.strict {
            return Err(FrameError::Oversized {
                declared,
                max: self.max_payload,
            });
        }

        let keep = declared.min(self.max_payload);
        let mut payload = Vec::new();
        let received = reader.by_ref().take(keep as u64).read_to_end(&mut payload)?;
        if received < keep {
            return Err(FrameError::Truncated { declared, received });
        }

        let excess = (declared - keep) as u64;
        if excess > 0 {
            let skipped = io::copy(&mut reader.by_ref().take(excess), &mut io::sink())?;
            if skipped < excess {
                return Err(FrameError::Truncated {
                    declared,
                    received: keep + skipped as usize,
                });
            }
        }

        Ok(Some(Frame { declared, payload }))
    }

    /// Prefix `payload` with its length
    pub fn encode_frame(&self, payload: &[u8]) -> Result<Vec<u8>, FrameError> {
        let len = u32::try_from(payload.len()).map_err(|_| FrameError::TooLong(payload.len()))?;
        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(&self.byte_order.write_u32(len));
        out.extend_from_slice(payload);
        Ok(out)
    }

    /// Write one frame and flush
    pub fn write_frame<W: Write>(&self, writer: &mut W, payload: &[u8]) -> Result<(), FrameError> {
        let bytes = self.encode_frame(payload)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }
}

/// Fill `buf` unless the stream ends first; returns the bytes read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
