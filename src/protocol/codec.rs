//! Wire encoding and decoding of Pixels messages
//!
//! The framing layer is a single kind byte followed by opaque payload bytes,
//! with no padding and no length prefix (packets are delimited by the
//! notification transport). Kind-specific payload layouts are handled by the
//! parsers and builders below; the framing codec itself never inspects them.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::core::{AnimationSet, Error, Message, MessageKind, Result};

/// Encodes a message as kind byte + payload, in wire order
pub fn encode(kind: MessageKind, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + payload.len());
    buf.put_u8(kind.as_byte());
    buf.extend_from_slice(payload);
    buf.freeze()
}

/// Decodes a raw notification packet into a message
///
/// Fails with [`Error::UnknownMessageKind`] when the first byte has no mapping,
/// and with a protocol error on an empty packet. Payload bytes are copied out
/// unmodified.
pub fn decode(packet: &[u8]) -> Result<Message> {
    let (&kind_byte, payload) = packet
        .split_first()
        .ok_or_else(|| Error::protocol("empty notification packet"))?;
    let kind = MessageKind::from_byte(kind_byte)
        .ok_or(Error::UnknownMessageKind { byte: kind_byte })?;
    Ok(Message::new(kind, Bytes::copy_from_slice(payload)))
}

/// Parses a BatteryLevel payload: 4-byte IEEE-754 little-endian voltage
pub fn battery_voltage(payload: &[u8]) -> Result<f32> {
    if payload.len() < 4 {
        return Err(Error::protocol("BatteryLevel payload shorter than 4 bytes"));
    }
    let mut buf = payload;
    Ok(buf.get_f32_le())
}

/// Parses a State payload: state byte followed by zero-based face index
pub fn state_payload(payload: &[u8]) -> Result<(u8, u8)> {
    if payload.len() < 2 {
        return Err(Error::protocol("State payload shorter than 2 bytes"));
    }
    Ok((payload[0], payload[1]))
}

/// A decoded NotifyUser request from the die
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyUserRequest {
    /// How long the die waits for an answer, in seconds
    pub timeout_secs: u8,
    /// Whether the die offers an "ok" choice
    pub ok: bool,
    /// Whether the die offers a "cancel" choice
    pub cancel: bool,
    /// Text to show the user
    pub text: String,
}

impl NotifyUserRequest {
    /// The user may abort only when both choices are offered
    pub fn can_abort(&self) -> bool {
        self.ok && self.cancel
    }
}

/// Parses a NotifyUser payload: timeout byte, ok flag, cancel flag, UTF-8 text
pub fn notify_user(payload: &[u8]) -> Result<NotifyUserRequest> {
    if payload.len() < 3 {
        return Err(Error::protocol("NotifyUser payload shorter than 3 bytes"));
    }
    let text = std::str::from_utf8(&payload[3..])
        .map_err(|e| Error::protocol(format!("NotifyUser text is not valid UTF-8: {}", e)))?;
    Ok(NotifyUserRequest {
        timeout_secs: payload[0],
        ok: payload[1] != 0,
        cancel: payload[2] != 0,
        text: text.to_owned(),
    })
}

/// Builds a BulkSetup payload: the total transfer length as u16 little-endian
pub fn bulk_setup_payload(total_len: u16) -> Bytes {
    let mut buf = BytesMut::with_capacity(2);
    buf.put_u16_le(total_len);
    buf.freeze()
}

/// Builds a TransferAnimSet header payload
///
/// Five u16 little-endian counts followed by the heat-track index byte, in the
/// fixed order the firmware expects: palette length, keyframe count, rgb-track
/// count, track count, animation count, heat-track index.
pub fn anim_set_header(set: &AnimationSet) -> Bytes {
    let mut buf = BytesMut::with_capacity(11);
    buf.put_u16_le(set.palette_len);
    buf.put_u16_le(set.keyframe_count);
    buf.put_u16_le(set.rgb_track_count);
    buf.put_u16_le(set.track_count);
    buf.put_u16_le(set.animation_count);
    buf.put_u8(set.heat_track_index);
    buf.freeze()
}
