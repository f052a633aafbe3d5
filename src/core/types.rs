use std::time::Duration;

use bytes::Bytes;
use serde::{Serialize, Deserialize};

/// Identifier of a Pixels message, carried as the first byte of every wire packet
///
/// The enumeration is closed: a packet whose first byte maps to no variant is a
/// decode error, never silently dropped. New firmware messages must be added
/// here with explicit codec support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageKind {
    None = 0,
    WhoAreYou = 1,
    IAmADie = 2,
    State = 3,
    Telemetry = 4,
    BulkSetup = 5,
    BulkSetupAck = 6,
    BulkData = 7,
    BulkDataAck = 8,
    TransferAnimSet = 9,
    TransferAnimSetAck = 10,
    TransferSettings = 11,
    TransferSettingsAck = 12,
    DebugLog = 13,
    PlayAnim = 14,
    PlayAnimEvent = 15,
    StopAnim = 16,
    RequestState = 17,
    RequestAnimSet = 18,
    RequestSettings = 19,
    RequestTelemetry = 20,
    ProgramDefaultAnimSet = 21,
    ProgramDefaultAnimSetFinished = 22,
    Flash = 23,
    FlashFinished = 24,
    RequestDefaultAnimSetColor = 25,
    DefaultAnimSetColor = 26,
    RequestBatteryLevel = 27,
    BatteryLevel = 28,
    Calibrate = 29,
    CalibrateFace = 30,
    NotifyUser = 31,
    NotifyUserAck = 32,
    TestHardware = 33,
    SetStandardState = 34,
    SetLEDAnimState = 35,
    SetBattleState = 36,
    ProgramDefaultParameters = 37,
    ProgramDefaultParametersFinished = 38,
}

impl MessageKind {
    /// Maps a wire byte to its message kind, or None for unmapped values
    pub fn from_byte(byte: u8) -> Option<Self> {
        use MessageKind::*;
        Some(match byte {
            0 => None,
            1 => WhoAreYou,
            2 => IAmADie,
            3 => State,
            4 => Telemetry,
            5 => BulkSetup,
            6 => BulkSetupAck,
            7 => BulkData,
            8 => BulkDataAck,
            9 => TransferAnimSet,
            10 => TransferAnimSetAck,
            11 => TransferSettings,
            12 => TransferSettingsAck,
            13 => DebugLog,
            14 => PlayAnim,
            15 => PlayAnimEvent,
            16 => StopAnim,
            17 => RequestState,
            18 => RequestAnimSet,
            19 => RequestSettings,
            20 => RequestTelemetry,
            21 => ProgramDefaultAnimSet,
            22 => ProgramDefaultAnimSetFinished,
            23 => Flash,
            24 => FlashFinished,
            25 => RequestDefaultAnimSetColor,
            26 => DefaultAnimSetColor,
            27 => RequestBatteryLevel,
            28 => BatteryLevel,
            29 => Calibrate,
            30 => CalibrateFace,
            31 => NotifyUser,
            32 => NotifyUserAck,
            33 => TestHardware,
            34 => SetStandardState,
            35 => SetLEDAnimState,
            36 => SetBattleState,
            37 => ProgramDefaultParameters,
            38 => ProgramDefaultParametersFinished,
            _ => return Option::None,
        })
    }

    /// Returns the wire byte for this kind
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Physical die type, identified once during the connection handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DeviceKind {
    /// Not yet identified
    None = 0,
    /// Six-sided die
    D6 = 1,
    /// Twenty-sided die
    D20 = 2,
}

impl DeviceKind {
    /// Maps the IAmADie payload byte to a device kind
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(DeviceKind::None),
            1 => Some(DeviceKind::D6),
            2 => Some(DeviceKind::D20),
            _ => None,
        }
    }
}

/// One decoded wire message: a kind plus its opaque payload bytes
///
/// Payload length and layout are kind-specific; the framing codec does not
/// validate them. See [`crate::protocol::codec`] for the per-kind parsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The message kind (first wire byte)
    pub kind: MessageKind,
    /// The remaining payload bytes, unmodified
    pub payload: Bytes,
}

impl Message {
    /// Creates a new message
    pub fn new(kind: MessageKind, payload: impl Into<Bytes>) -> Self {
        Message {
            kind,
            payload: payload.into(),
        }
    }
}

/// Descriptor for an animation-set upload
///
/// The library does not encode animation tables; callers hand over the packed
/// table bytes together with the counts the firmware needs to size its buffers.
#[derive(Debug, Clone, Default)]
pub struct AnimationSet {
    /// Number of palette entries
    pub palette_len: u16,
    /// Number of keyframes
    pub keyframe_count: u16,
    /// Number of RGB tracks
    pub rgb_track_count: u16,
    /// Number of tracks
    pub track_count: u16,
    /// Number of animations
    pub animation_count: u16,
    /// Index of the heat track
    pub heat_track_index: u8,
    /// Packed animation-table bytes, sent through the bulk sub-protocol
    pub data: Vec<u8>,
}

/// Configuration for one die link session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Log every sent and received message at trace level
    pub trace: bool,
    /// Deadline for each step of the identification handshake
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub handshake_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            trace: false,
            handshake_timeout: Duration::from_secs(1),
        }
    }
}
