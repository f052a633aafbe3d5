//! Session management for one connected die
//!
//! A [`Session`] owns the transport to a single die, runs the identification
//! handshake at construction, dispatches inbound notifications to state
//! handlers and event channels, and exposes the public operations (play,
//! calibrate, battery refresh, animation-set upload).
//!
//! Concurrency model: one logical thread of control per session. The
//! transport's notification delivery and the caller's blocking waits
//! interleave cooperatively inside [`Session::wait_for_message`]; no locks are
//! used and at most one acknowledgement wait may be outstanding at a time.
//! Callers must not issue two blocking operations concurrently — the types are
//! `!Send`, which rules out cross-thread misuse.

use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::core::{
    AnimationSet, DeviceKind, Error, LinkConfig, Message, MessageKind, Result,
};
use crate::protocol::ack::AckWaiter;
use crate::protocol::codec;
use crate::protocol::event::EventBus;
use super::bulk::BulkChunks;
use super::transport::{Transport, UserPrompt};

/// An established connection to one die
pub struct Session<T: Transport> {
    transport: T,
    prompt: Box<dyn UserPrompt>,
    config: LinkConfig,
    address: String,
    name: String,
    device_kind: DeviceKind,
    face_up: u8,
    battery_voltage: f32,
    message_received: Rc<EventBus<Message>>,
    face_up_changed: Rc<EventBus<u8>>,
    battery_voltage_changed: Rc<EventBus<f32>>,
}

impl<T: Transport> Session<T> {
    /// Establishes a session over an already-connected transport
    ///
    /// Runs the identification handshake: WhoAreYou is answered by IAmADie
    /// (fixing the device kind), then RequestBatteryLevel by BatteryLevel.
    /// Each step is bounded by [`LinkConfig::handshake_timeout`]. On any
    /// failure the transport is disconnected and the error returned — a
    /// half-initialized session is never observable.
    pub fn establish(
        transport: T,
        address: impl Into<String>,
        name: impl Into<String>,
        prompt: Box<dyn UserPrompt>,
        config: LinkConfig,
    ) -> Result<Self> {
        let mut session = Session {
            transport,
            prompt,
            config,
            address: address.into(),
            name: name.into(),
            device_kind: DeviceKind::None,
            face_up: 0,
            battery_voltage: -1.0,
            message_received: Rc::new(EventBus::new()),
            face_up_changed: Rc::new(EventBus::new()),
            battery_voltage_changed: Rc::new(EventBus::new()),
        };

        if let Err(err) = session.identify() {
            session.transport.disconnect();
            return Err(err);
        }
        Ok(session)
    }

    fn identify(&mut self) -> Result<()> {
        let timeout = self.config.handshake_timeout;

        self.send_and_wait_for_ack(MessageKind::WhoAreYou, &[], MessageKind::IAmADie, timeout)
            .map_err(|err| Error::identification(format!("identity handshake failed: {}", err)))?;
        if self.device_kind == DeviceKind::None {
            return Err(Error::identification(
                "peer did not report a usable device kind",
            ));
        }

        self.send_and_wait_for_ack(
            MessageKind::RequestBatteryLevel,
            &[],
            MessageKind::BatteryLevel,
            timeout,
        )
        .map_err(|err| Error::identification(format!("battery handshake failed: {}", err)))?;

        debug!(
            address = %self.address,
            name = %self.name,
            kind = ?self.device_kind,
            "session established"
        );
        Ok(())
    }

    /// Peer address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Peer advertised name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Die type reported during the handshake
    pub fn device_kind(&self) -> DeviceKind {
        self.device_kind
    }

    /// Current face-up value: 1-based face index, or 0 when no face is up
    ///
    /// Associated event: [`Session::face_up_changed`]
    pub fn face_up(&self) -> u8 {
        self.face_up
    }

    /// Battery voltage, usually between 2.5 and 4.2 volts
    ///
    /// −1.0 until the first reading. Associated event:
    /// [`Session::battery_voltage_changed`]
    pub fn battery_voltage(&self) -> f32 {
        self.battery_voltage
    }

    /// Event channel carrying every dispatched inbound message
    pub fn message_received(&self) -> &EventBus<Message> {
        &self.message_received
    }

    /// Event channel firing on each face-up change
    pub fn face_up_changed(&self) -> &EventBus<u8> {
        &self.face_up_changed
    }

    /// Event channel firing on each battery voltage change
    pub fn battery_voltage_changed(&self) -> &EventBus<f32> {
        &self.battery_voltage_changed
    }

    /// Waits up to `timeout` for the next notification and dispatches it
    ///
    /// Returns the decoded message, or None when the wait elapsed quietly.
    /// An undecodable packet is reported as an error; the session stays
    /// usable.
    pub fn wait_for_message(&mut self, timeout: Duration) -> Result<Option<Message>> {
        let packet = match self.transport.poll_notification(timeout)? {
            Some(packet) => packet,
            None => return Ok(None),
        };
        let message = match codec::decode(&packet) {
            Ok(message) => message,
            Err(err) => {
                warn!(address = %self.address, error = %err, "undecodable notification");
                return Err(err);
            }
        };
        self.dispatch(&message)?;
        Ok(Some(message))
    }

    /// Starts an animation by index
    pub fn play(&mut self, index: u8, remap_face: u8, loop_anim: bool) -> Result<()> {
        self.send(
            MessageKind::PlayAnim,
            &[index, remap_face, u8::from(loop_anim)],
        )
    }

    /// Starts the face calibration procedure on the die
    pub fn calibrate(&mut self) -> Result<()> {
        self.send(MessageKind::Calibrate, &[])
    }

    /// Requests a fresh battery reading; the result arrives asynchronously
    pub fn refresh_battery_voltage(&mut self) -> Result<()> {
        self.send(MessageKind::RequestBatteryLevel, &[])
    }

    /// Requests a fresh State notification
    pub fn request_state(&mut self) -> Result<()> {
        self.send(MessageKind::RequestState, &[])
    }

    /// Uploads an animation set to the die
    ///
    /// Sends the table-sizing header and waits for its acknowledgement, then
    /// pushes the packed table bytes through the bulk sub-protocol. A timeout
    /// anywhere fails the whole upload; the session itself remains usable and
    /// a retry restarts from the header.
    pub fn upload_animation_set(&mut self, set: &AnimationSet, timeout: Duration) -> Result<()> {
        let header = codec::anim_set_header(set);
        self.send_and_wait_for_ack(
            MessageKind::TransferAnimSet,
            &header,
            MessageKind::TransferAnimSetAck,
            timeout,
        )?;
        self.upload_bulk_data(&set.data, timeout)
    }

    /// Pushes an arbitrary payload through the bulk-data sub-protocol
    ///
    /// BulkSetup announces the total length, then each 16-byte chunk is sent
    /// and individually acknowledged, strictly in sequence. No retries happen
    /// at this layer.
    pub fn upload_bulk_data(&mut self, data: &[u8], timeout: Duration) -> Result<()> {
        let chunks = BulkChunks::new(data)?;
        let setup = codec::bulk_setup_payload(chunks.total_len());
        self.send_and_wait_for_ack(
            MessageKind::BulkSetup,
            &setup,
            MessageKind::BulkSetupAck,
            timeout,
        )?;
        for chunk in chunks {
            self.send_and_wait_for_ack(
                MessageKind::BulkData,
                &chunk.frame(),
                MessageKind::BulkDataAck,
                timeout,
            )?;
        }
        Ok(())
    }

    /// Sends a request and blocks until the matching acknowledgement arrives
    ///
    /// The acknowledgement listener is registered before the request is
    /// written, so the ack cannot slip past unobserved. Notifications of other
    /// kinds received while waiting are dispatched normally (state updates and
    /// events keep flowing) and do not satisfy the wait. Fails with
    /// [`Error::AckTimeout`] once the deadline elapses.
    pub fn send_and_wait_for_ack(
        &mut self,
        kind: MessageKind,
        payload: &[u8],
        ack: MessageKind,
        timeout: Duration,
    ) -> Result<Message> {
        let waiter = AckWaiter::register(&self.message_received, ack);
        self.send(kind, payload)?;

        let started = Instant::now();
        loop {
            if let Some(ack_message) = waiter.take() {
                return Ok(ack_message);
            }
            let remaining = match timeout.checked_sub(started.elapsed()) {
                Some(remaining) => remaining,
                None => break,
            };
            if self.wait_for_message(remaining)?.is_none() {
                break;
            }
        }
        Err(Error::AckTimeout { ack, timeout })
    }

    /// Disconnects the transport, consuming the session
    pub fn disconnect(mut self) {
        self.transport.disconnect();
    }

    fn send(&mut self, kind: MessageKind, payload: &[u8]) -> Result<()> {
        if self.config.trace {
            trace!(address = %self.address, kind = ?kind, payload = ?payload, "sending");
        }
        let packet = codec::encode(kind, payload);
        self.transport.write(&packet)
    }

    /// Routes one decoded message: kind-specific handlers first, then the
    /// unconditional publish on the message-received channel
    fn dispatch(&mut self, message: &Message) -> Result<()> {
        if self.config.trace {
            trace!(
                address = %self.address,
                kind = ?message.kind,
                payload = ?&message.payload[..],
                "received"
            );
        }
        match message.kind {
            MessageKind::IAmADie => self.handle_identity(message)?,
            MessageKind::State => self.handle_state(message)?,
            MessageKind::BatteryLevel => self.handle_battery_level(message)?,
            MessageKind::DebugLog => self.handle_debug_log(message),
            MessageKind::NotifyUser => self.handle_notify_user(message)?,
            _ => {}
        }
        self.message_received.notify(message);
        Ok(())
    }

    fn handle_identity(&mut self, message: &Message) -> Result<()> {
        // Device kind is fixed once identified
        if self.device_kind != DeviceKind::None {
            return Ok(());
        }
        let byte = *message
            .payload
            .first()
            .ok_or_else(|| Error::protocol("IAmADie payload is empty"))?;
        self.device_kind = DeviceKind::from_byte(byte).ok_or_else(|| {
            Error::protocol(format!("IAmADie reported unknown device kind {}", byte))
        })?;
        Ok(())
    }

    fn handle_state(&mut self, message: &Message) -> Result<()> {
        let (state, face) = codec::state_payload(&message.payload)?;
        let face_up = if state == 1 {
            // The wire face index is zero-based; 255 has no 1-based form
            face.checked_add(1).ok_or_else(|| {
                Error::protocol(format!("State reported out-of-range face index {}", face))
            })?
        } else {
            0
        };
        if self.face_up != face_up {
            self.face_up = face_up;
            self.face_up_changed.notify(&face_up);
        }
        Ok(())
    }

    #[allow(clippy::float_cmp)]
    fn handle_battery_level(&mut self, message: &Message) -> Result<()> {
        let voltage = codec::battery_voltage(&message.payload)?;
        // Exact comparison on purpose: duplicate suppression applies to
        // bit-identical repeated readings
        if self.battery_voltage != voltage {
            self.battery_voltage = voltage;
            self.battery_voltage_changed.notify(&voltage);
        }
        Ok(())
    }

    fn handle_debug_log(&self, message: &Message) {
        match std::str::from_utf8(&message.payload) {
            Ok(text) => debug!(address = %self.address, "die log: {}", text),
            Err(_) => warn!(address = %self.address, "DebugLog payload is not valid UTF-8"),
        }
    }

    fn handle_notify_user(&mut self, message: &Message) -> Result<()> {
        let request = codec::notify_user(&message.payload)?;
        let can_abort = request.can_abort();
        let mut proceed = self
            .prompt
            .confirm(&request.text, request.timeout_secs, can_abort);
        if !can_abort {
            proceed = true;
        }
        self.send(MessageKind::NotifyUserAck, &[u8::from(proceed)])
    }
}
