//! Main [`Session`] client implementation.
//!
//! A session owns one transport exclusively and runs one transaction at a
//! time. Every request method takes `&mut self`, so a second request can
//! only be issued once the previous one has finished.

use std::fmt;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::protocol::{Opcode, ReplyStatus, Request, parse_alive, parse_query_state, parse_status};
use crate::transaction::{TransactionConfig, TransactionEngine};
use crate::transport::{SerialConfig, SerialTransport, Transport};
use crate::types::{Buttons, DeviceState, Hat, StickPosition};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No line open.
    Closed,
    /// Line open, buffers not yet cleared.
    Open,
    /// Line open and stale data discarded.
    Cleared,
    /// At least one transaction has run.
    Active,
}

impl SessionState {
    /// Returns true if transactions may run.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Cleared | Self::Active)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::Cleared => "cleared",
            Self::Active => "active",
        };
        f.write_str(name)
    }
}

/// Client session with a gamebot peripheral.
pub struct Session<T> {
    transport: T,
    engine: TransactionEngine,
    state: SessionState,
}

impl Session<SerialTransport> {
    /// Creates a new session for a serial port.
    ///
    /// # Arguments
    ///
    /// * `port` - Serial port path (e.g., "/dev/ttyUSB0")
    ///
    /// # Returns
    ///
    /// A new session (not yet opened).
    #[must_use]
    pub fn serial(port: impl Into<String>) -> Self {
        Self::with_serial_config(SerialConfig::new(port))
    }

    /// Creates a new session with custom serial configuration.
    #[must_use]
    pub fn with_serial_config(config: SerialConfig) -> Self {
        Self::new(SerialTransport::new(config))
    }
}

impl<T: Transport> Session<T> {
    /// Creates a new session over the given transport.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, TransactionConfig::default())
    }

    /// Creates a new session with custom retry and timeout settings.
    #[must_use]
    pub fn with_config(transport: T, config: TransactionConfig) -> Self {
        Self {
            transport,
            engine: TransactionEngine::new(config),
            state: SessionState::Closed,
        }
    }

    /// Opens the line and discards anything stale on it.
    ///
    /// This will:
    /// 1. Open the transport
    /// 2. Reset the input and output buffers
    /// 3. Reset the frame decoder
    pub async fn open_and_clear(&mut self) -> Result<()> {
        self.transport.connect().await?;
        self.state = SessionState::Open;

        match self.transport.bytes_available() {
            Ok(0) | Err(_) => {}
            Ok(stale) => tracing::debug!("discarding {} stale bytes", stale),
        }
        self.transport.reset_input_buffer()?;
        self.transport.reset_output_buffer()?;
        self.engine.reset();
        self.state = SessionState::Cleared;

        tracing::info!("session ready");
        Ok(())
    }

    /// Closes the line.
    pub async fn close(&mut self) -> Result<()> {
        if self.state != SessionState::Closed {
            tracing::info!("closing session");
        }
        self.state = SessionState::Closed;
        self.engine.reset();
        self.transport.disconnect().await
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the transaction settings.
    #[must_use]
    pub const fn config(&self) -> &TransactionConfig {
        self.engine.config()
    }

    /// Replaces the transaction settings.
    pub fn set_config(&mut self, config: TransactionConfig) {
        self.engine.set_config(config);
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.state.is_ready() && self.transport.is_connected() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    // ==================== Transactions ====================

    /// Runs one transaction and returns the raw reply payload.
    pub async fn execute(&mut self, request: &Request) -> Result<Bytes> {
        self.ensure_ready()?;
        self.state = SessionState::Active;
        let result = self.engine.execute(&mut self.transport, request).await;
        if let Some(e) = result.as_ref().err().filter(|e| e.is_transport()) {
            tracing::error!("transport failure during {:?}: {}", request.opcode(), e);
        }
        result
    }

    /// Runs a single attempt without retrying.
    pub async fn execute_once(&mut self, request: &Request) -> Result<Bytes> {
        self.ensure_ready()?;
        self.state = SessionState::Active;
        self.engine.execute_once(&mut self.transport, request).await
    }

    /// Sends any catalogued opcode with raw parameters.
    ///
    /// Parameter blocks longer than `MAX_PARAMS` fail with
    /// `Error::ParamsTooLong` before anything is written.
    pub async fn request(&mut self, opcode: Opcode, params: &[u8]) -> Result<Bytes> {
        let request = Request::try_with_params(opcode, params)?;
        self.execute(&request).await
    }

    /// Sends a request that must be answered with the success status.
    async fn expect_success(&mut self, request: Request) -> Result<()> {
        let reply = self.execute(&request).await?;
        match parse_status(&reply)? {
            ReplyStatus::Success => Ok(()),
            ReplyStatus::Alive => Err(Error::protocol(format!(
                "{:?} answered with the alive marker",
                request.opcode()
            ))),
            status => Err(Error::Rejected { status }),
        }
    }

    // ==================== Queries ====================

    /// Checks that the peripheral is responding.
    ///
    /// A reply other than the alive marker is a valid "no".
    pub async fn test_alive(&mut self) -> Result<bool> {
        let reply = self.execute(&Request::test()).await?;
        let alive = parse_alive(&reply);
        if !alive {
            tracing::debug!("unexpected liveness reply: {}", hex::encode(&reply));
        }
        Ok(alive)
    }

    /// Reads queue and counter state.
    pub async fn query_state(&mut self) -> Result<DeviceState> {
        let reply = self.execute(&Request::query_state()).await?;
        parse_query_state(&reply)
    }

    // ==================== Input Commands ====================

    /// Drops queued commands and resets inputs.
    pub async fn clear_state(&mut self) -> Result<()> {
        self.expect_success(Request::clear_state()).await
    }

    /// Presses buttons, optionally for a fixed time.
    pub async fn press_buttons(&mut self, buttons: Buttons, duration_ms: Option<u16>) -> Result<()> {
        self.expect_success(Request::press_buttons(buttons, duration_ms))
            .await
    }

    /// Presses the hat in one direction.
    pub async fn press_hat(&mut self, hat: Hat, duration_ms: Option<u16>) -> Result<()> {
        self.expect_success(Request::press_hat(hat, duration_ms))
            .await
    }

    /// Deflects the left stick. Out-of-range axes are saturated.
    pub async fn move_left_joy(&mut self, x: i32, y: i32, duration_ms: Option<u16>) -> Result<()> {
        self.expect_success(Request::move_left_joy(x, y, duration_ms))
            .await
    }

    /// Deflects the right stick. Out-of-range axes are saturated.
    pub async fn move_right_joy(&mut self, x: i32, y: i32, duration_ms: Option<u16>) -> Result<()> {
        self.expect_success(Request::move_right_joy(x, y, duration_ms))
            .await
    }

    /// Deflects the left stick towards a compass heading.
    ///
    /// See [`StickPosition::from_heading`].
    pub async fn left_joy_heading(
        &mut self,
        heading_degrees: f64,
        extent: f64,
        duration_ms: Option<u16>,
    ) -> Result<()> {
        let position = StickPosition::from_heading(heading_degrees, extent);
        self.expect_success(Request::stick(Opcode::MoveLeftJoy, position, duration_ms))
            .await
    }

    /// Deflects the right stick towards a compass heading.
    pub async fn right_joy_heading(
        &mut self,
        heading_degrees: f64,
        extent: f64,
        duration_ms: Option<u16>,
    ) -> Result<()> {
        let position = StickPosition::from_heading(heading_degrees, extent);
        self.expect_success(Request::stick(Opcode::MoveRightJoy, position, duration_ms))
            .await
    }

    /// Presses buttons, hat and both sticks together.
    pub async fn press_all(
        &mut self,
        buttons: Buttons,
        hat: Hat,
        left: StickPosition,
        right: StickPosition,
        duration_ms: Option<u16>,
    ) -> Result<()> {
        self.expect_success(Request::press_all(buttons, hat, left, right, duration_ms))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encode_frame;
    use crate::transport::mock::{MockTransport, Response};

    fn init_tracing() {
        if std::env::var_os("RUST_LOG").is_some() {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        }
    }

    async fn open(script: Vec<Response>) -> Session<MockTransport> {
        init_tracing();
        let mut session = Session::new(MockTransport::new(script));
        session.open_and_clear().await.unwrap();
        session
    }

    /// Payload of the `n`th request written to the line.
    fn sent_payload(session: &Session<MockTransport>, n: usize) -> Vec<u8> {
        let written = &session.transport().writes[n];
        written[2..written.len() - 4].to_vec()
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let mut session = Session::new(MockTransport::new(vec![]));
        assert_eq!(session.state(), SessionState::Closed);
        assert!(matches!(
            session.test_alive().await,
            Err(Error::NotConnected)
        ));

        session.open_and_clear().await.unwrap();
        assert_eq!(session.state(), SessionState::Cleared);
        assert_eq!(session.transport().input_resets, 1);
        assert_eq!(session.transport().output_resets, 1);

        session.close().await.unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(!session.transport().is_connected());
        assert!(matches!(
            session.query_state().await,
            Err(Error::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_alive() {
        let mut session = open(vec![Response::frame(b"A")]).await;
        assert!(session.test_alive().await.unwrap());
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(
            &session.transport().writes[0][..],
            &[0x50, 0xE1, b'T', 0x60, 0x45, b'\r', b'\n']
        );
    }

    #[tokio::test]
    async fn test_not_alive_is_not_an_error() {
        let mut session = open(vec![Response::frame(b"1")]).await;
        assert!(!session.test_alive().await.unwrap());
    }

    #[tokio::test]
    async fn test_query_state() {
        let reply = [
            b'Q', 0x01, 0x02, 0x03, 0x04, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x20, 0x05,
        ];
        let mut session = open(vec![Response::frame(&reply)]).await;

        let state = session.query_state().await.unwrap();
        assert!(state.configured());
        assert_eq!(state.head, 2);
        assert_eq!(state.tail, 3);
        assert_eq!(state.count, 4);
        assert_eq!(state.interrupt_counter, 16);
        assert_eq!(state.command_elapsed_counter, 32);
        assert_eq!(state.echo_count, 5);
    }

    #[tokio::test]
    async fn test_query_state_short_reply_is_not_retried() {
        let mut session = open(vec![Response::frame(b"Q\x01"), Response::frame(b"A")]).await;
        let err = session.query_state().await.unwrap_err();
        assert!(matches!(err, Error::ProtocolViolation { .. }));
        assert_eq!(session.transport().writes.len(), 1);
    }

    #[tokio::test]
    async fn test_move_left_joy_clamps_axes() {
        let mut session = open(vec![Response::frame(b"0")]).await;
        session.move_left_joy(300, -10, None).await.unwrap();
        assert_eq!(sent_payload(&session, 0), vec![b'l', 255, 0]);
    }

    #[tokio::test]
    async fn test_right_joy_heading() {
        let mut session = open(vec![Response::frame(b"0")]).await;
        session
            .right_joy_heading(90.0, 1.0, Some(250))
            .await
            .unwrap();
        assert_eq!(sent_payload(&session, 0), vec![b'r', 255, 128, 0x00, 0xFA]);
    }

    #[tokio::test]
    async fn test_press_buttons_overflow_is_rejected() {
        let mut session = open(vec![Response::frame(b"2")]).await;
        let err = session
            .press_buttons(Buttons::A, Some(100))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Rejected {
                status: ReplyStatus::Overflow
            }
        ));
    }

    #[tokio::test]
    async fn test_press_all_and_hat() {
        let mut session = open(vec![Response::frame(b"0"), Response::frame(b"0")]).await;
        session
            .press_all(
                Buttons::L | Buttons::R,
                Hat::Center,
                StickPosition::CENTER,
                StickPosition::CENTER,
                None,
            )
            .await
            .unwrap();
        session.press_hat(Hat::TopLeft, None).await.unwrap();

        assert_eq!(
            sent_payload(&session, 0),
            vec![b's', 0x00, 0x30, 0x08, 0x80, 0x80, 0x80, 0x80]
        );
        assert_eq!(sent_payload(&session, 1), vec![b'h', 0x07]);
    }

    #[tokio::test]
    async fn test_clear_state_recovers_from_noise() {
        let mut noisy = b"\r\n\x13".to_vec();
        noisy.extend_from_slice(&encode_frame(b"0"));
        let mut session = open(vec![Response::corrupted(b"0"), Response::Raw(noisy)]).await;

        session.clear_state().await.unwrap();
        assert_eq!(session.transport().writes.len(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_as_tagged_error() {
        let mut session = open(vec![Response::corrupted(b"0"); 3]).await;
        let err = session.clear_state().await.unwrap_err();
        assert!(matches!(err, Error::RetriesExhausted { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_raw_request() {
        let mut session = open(vec![Response::frame(b"1")]).await;
        let reply = session
            .request(Opcode::PauseMsec, &[0x00, 0x64])
            .await
            .unwrap();
        assert_eq!(&reply[..], b"1");
        assert_eq!(sent_payload(&session, 0), vec![b'P', 0x00, 0x64]);
    }

    #[tokio::test]
    async fn test_raw_request_with_too_many_params() {
        let mut session = open(vec![Response::frame(b"0")]).await;
        let err = session
            .request(Opcode::PressAll, &[0u8; 10])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ParamsTooLong { len: 10, max: 9 }));
        assert!(session.transport().writes.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mut session = Session::new(MockTransport::new(vec![]).failing_writes());
        session.open_and_clear().await.unwrap();
        let err = session.test_alive().await.unwrap_err();
        assert!(err.is_transport());
    }
}
