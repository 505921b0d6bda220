/*
    message.rs - Protocol message envelope

    A ProtocolMessage is the one-byte code plus opaque payload delivered by
    the transport for every response. It is immutable and handed to exactly
    one ResponseConverter.

    Frame layout on the wire:
        [length: u32 BE][code: u8][payload: length - 1 bytes]
*/

use super::codes::MessageCode;
use super::converter::ResponseConverter;
use super::errors::{DecodeError, DecodeResult};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use tracing::trace;

/// Size of the big-endian length prefix
pub const FRAME_HEADER_LEN: usize = 4;

/// Default upper bound on a single frame (64 MiB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Immutable response envelope
#[derive(Clone, PartialEq, Eq)]
pub struct ProtocolMessage {
    code: u8,
    payload: Bytes,
}

impl ProtocolMessage {
    pub fn new(code: u8, payload: impl Into<Bytes>) -> Self {
        ProtocolMessage { code, payload: payload.into() }
    }

    /// Message with an empty payload
    pub fn empty(code: MessageCode) -> Self {
        Self::new(code.as_u8(), Bytes::new())
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    /// Code as a known enum, if recognised
    pub fn message_code(&self) -> Option<MessageCode> {
        MessageCode::try_from(self.code).ok()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_parts(self) -> (u8, Bytes) {
        (self.code, self.payload)
    }

    /// Interpret this message with the given converter
    pub fn convert_response<C>(&self, converter: &C) -> DecodeResult<C::Output>
    where
        C: ResponseConverter + ?Sized,
    {
        converter.convert(self.code, &self.payload)
    }

    /// Encode as a length-prefixed frame.
    ///
    /// Fails when code plus payload do not fit the 32-bit length prefix.
    pub fn encode_frame(&self) -> DecodeResult<Bytes> {
        let declared = frame_length(self.payload.len())?;
        let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + 1 + self.payload.len());
        buf.put_u32(declared);
        buf.put_u8(self.code);
        buf.extend_from_slice(&self.payload);
        Ok(buf.freeze())
    }

    /// Decode one frame from the front of `buf`.
    ///
    /// Returns the message and the bytes following the frame. The payload is
    /// copied out, so the caller's buffer is not retained.
    pub fn decode_frame(buf: &[u8], max_frame_size: usize) -> DecodeResult<(Self, &[u8])> {
        if buf.len() < FRAME_HEADER_LEN {
            return Err(DecodeError::MalformedFrame(format!(
                "need {} header bytes, have {}",
                FRAME_HEADER_LEN,
                buf.len()
            )));
        }

        let (header, rest) = buf.split_at(FRAME_HEADER_LEN);
        let declared = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;

        if declared == 0 {
            return Err(DecodeError::MalformedFrame("declared length 0 has no code byte".to_string()));
        }
        if declared > max_frame_size {
            return Err(DecodeError::MalformedFrame(format!(
                "declared length {} exceeds max frame size {}",
                declared, max_frame_size
            )));
        }
        if declared > rest.len() {
            let reason = format!("declared length {} exceeds available {} bytes", declared, rest.len());
            return Err(match rest.first() {
                Some(&code) => DecodeError::malformed(code, reason),
                None => DecodeError::MalformedFrame(reason),
            });
        }

        let (body, remainder) = rest.split_at(declared);
        let message = ProtocolMessage::new(body[0], Bytes::copy_from_slice(&body[1..]));
        trace!(code = message.code, payload_len = message.payload.len(), "decoded frame");

        Ok((message, remainder))
    }

    /// Decode every frame in `buf`; the buffer must end on a frame boundary
    pub fn decode_frames(mut buf: &[u8], max_frame_size: usize) -> DecodeResult<Vec<Self>> {
        let mut messages = Vec::new();
        while !buf.is_empty() {
            let (message, rest) = Self::decode_frame(buf, max_frame_size)?;
            messages.push(message);
            buf = rest;
        }
        Ok(messages)
    }
}

/// Length prefix for a payload of `payload_len` bytes (the code byte counts)
fn frame_length(payload_len: usize) -> DecodeResult<u32> {
    payload_len
        .checked_add(1)
        .and_then(|len| u32::try_from(len).ok())
        .ok_or_else(|| {
            DecodeError::MalformedFrame(format!("payload of {} bytes does not fit a frame", payload_len))
        })
}

impl fmt::Debug for ProtocolMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ProtocolMessage");
        match self.message_code() {
            Some(code) => s.field("code", &code),
            None => s.field("code", &self.code),
        };
        s.field("payload_len", &self.payload.len()).finish()
    }
}
