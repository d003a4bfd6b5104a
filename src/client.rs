//! DoIP client facade.
//!
//! Composes the transport, session state machine, request/response
//! correlation, and the TesterPresent keep-alive loop into the operations
//! a diagnostic tester needs: connect, activate routing, exchange
//! diagnostic messages, keep the session alive.
//!
//! # Concurrency
//!
//! Exactly one TCP connection is shared between the caller's synchronous
//! operations and the keep-alive thread. All socket access goes through
//! one mutex, held for the duration of a full send (and, for correlated
//! exchanges, the paired receives), so a keep-alive write can never
//! interleave with a diagnostic exchange and a reply can never be consumed
//! by the wrong path.
//!
//! # Example
//!
//! ```no_run
//! use doip_rs::{ClientConfig, DoipClient, LogicalAddress, TesterPresentMode};
//!
//! let client = DoipClient::with_logger(ClientConfig::default(), Box::new(|line| {
//!     println!("{line}");
//! }));
//!
//! let tester = LogicalAddress(0x0E00);
//! let ecu = LogicalAddress(0x1000);
//!
//! client.connect("192.168.0.10").unwrap();
//! client.activate_routing(tester).unwrap();
//! client.start_tester_present(tester, ecu, TesterPresentMode::Functional).unwrap();
//!
//! let response = client.send_diagnostic(tester, ecu, &[0x22, 0xF1, 0x90]).unwrap();
//! println!("UDS response: {:02X?}", response.uds_data());
//!
//! client.disconnect();
//! ```

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{DoipError, Result};
use crate::frame::{ACTIVATION_SUCCESS, Frame};
use crate::log::{LogSink, frame_summary, hex_upper, null_sink};
use crate::session::{SessionState, SessionStats};
use crate::transport::TcpTransport;
use crate::types::{LogicalAddress, PayloadType, TesterPresentMode};

/// Connection half of the session, guarded by one mutex.
///
/// The transport lives only inside this struct; it is never handed out.
struct Conn {
    transport: Option<TcpTransport>,
    state: SessionState,
    active_source: Option<LogicalAddress>,
    stats: SessionStats,
}

impl Conn {
    fn new() -> Self {
        Self {
            transport: None,
            state: SessionState::Disconnected,
            active_source: None,
            stats: SessionStats::default(),
        }
    }

    /// Close the transport and force the session back to `Disconnected`.
    fn teardown(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        if self.state.is_connected() {
            self.stats.record_disconnect();
        }
        self.state = SessionState::Disconnected;
        self.active_source = None;
    }

    /// Send one frame, fire-and-forget. A fatal error tears the session
    /// down before it is returned.
    fn send_only(&mut self, frame: &Frame) -> Result<()> {
        let result = match self.transport.as_mut() {
            Some(transport) => transport.send_frame(frame),
            None => return Err(DoipError::NotConnected),
        };
        match result {
            Ok(()) => {
                self.stats.record_send(frame.total_size());
                Ok(())
            }
            Err(e) => {
                if e.is_fatal() {
                    self.teardown();
                }
                Err(e)
            }
        }
    }

    /// Block until one frame arrives. A timeout leaves the connection
    /// open; a peer close or malformed header tears the session down.
    fn recv_one(&mut self) -> Result<Frame> {
        let result = match self.transport.as_mut() {
            Some(transport) => transport.recv_frame(),
            None => return Err(DoipError::NotConnected),
        };
        match result {
            Ok(frame) => {
                self.stats.record_receive(frame.total_size());
                Ok(frame)
            }
            Err(e) => {
                if e.is_fatal() {
                    self.teardown();
                }
                Err(e)
            }
        }
    }

    /// Send a request and await exactly one reply frame.
    fn exchange(&mut self, frame: &Frame) -> Result<Frame> {
        self.send_only(frame)?;
        self.recv_one()
    }
}

/// State shared between the facade and the keep-alive thread.
struct ClientInner {
    config: ClientConfig,
    conn: Mutex<Conn>,
    log: LogSink,
}

impl ClientInner {
    fn emit(&self, line: &str) {
        (self.log)(line);
    }
}

/// Cooperative stop flag with an interruptible sleep.
#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    fn stop(&self) {
        *self.stopped.lock().unwrap() = true;
        self.wake.notify_all();
    }

    fn is_stopped(&self) -> bool {
        *self.stopped.lock().unwrap()
    }

    /// Sleep for `interval` unless stopped first. Returns true if stopped.
    fn wait_interval(&self, interval: Duration) -> bool {
        let guard = self.stopped.lock().unwrap();
        if *guard {
            return true;
        }
        let (guard, _) = self.wake.wait_timeout(guard, interval).unwrap();
        *guard
    }
}

/// Handle to a running keep-alive loop.
struct KeepAlive {
    signal: Arc<StopSignal>,
    handle: JoinHandle<()>,
    done: Receiver<()>,
}

/// A DoIP tester client over one TCP session.
///
/// All operations take `&self`; internal locking serializes socket access
/// between callers and the keep-alive thread. No operation ever retries or
/// reconnects on its own: a broken transport drives the session to
/// `Disconnected` and stays there until the caller connects again.
pub struct DoipClient {
    inner: Arc<ClientInner>,
    keep_alive: Mutex<Option<KeepAlive>>,
}

impl DoipClient {
    /// Create a client that discards log output.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_logger(config, null_sink())
    }

    /// Create a client emitting one line per protocol event to `log`.
    pub fn with_logger(config: ClientConfig, log: LogSink) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config,
                conn: Mutex::new(Conn::new()),
                log,
            }),
            keep_alive: Mutex::new(None),
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.inner.conn.lock().unwrap().state
    }

    /// Snapshot of the session statistics.
    pub fn stats(&self) -> SessionStats {
        self.inner.conn.lock().unwrap().stats.clone()
    }

    /// Open a TCP session to the gateway at `host` on the configured port.
    ///
    /// Any previous session is torn down first. On failure the session
    /// stays `Disconnected`.
    pub fn connect(&self, host: &str) -> Result<()> {
        self.stop_tester_present();

        let mut conn = self.inner.conn.lock().unwrap();
        conn.teardown();

        self.inner.emit(&format!(
            "Connecting to {host}:{}...",
            self.inner.config.port
        ));
        match TcpTransport::connect(host, &self.inner.config) {
            Ok(transport) => {
                self.inner
                    .emit(&format!("Connected to {}", transport.peer_addr()));
                conn.transport = Some(transport);
                conn.state = SessionState::Connected;
                conn.stats.record_connect();
                Ok(())
            }
            Err(e) => {
                conn.stats.record_failure();
                self.inner.emit(&format!("Connection failed: {e}"));
                Err(e)
            }
        }
    }

    /// Perform the routing activation handshake for the tester address
    /// `source`.
    ///
    /// On success the session becomes `Activated` and `source` is retained
    /// for keep-alive use. A rejected activation closes the socket:
    /// activation failure is not recoverable on the same connection. A
    /// plain read timeout leaves the connection open for retry.
    pub fn activate_routing(&self, source: LogicalAddress) -> Result<()> {
        let mut conn = self.inner.conn.lock().unwrap();
        if !conn.state.is_connected() {
            return Err(DoipError::NotConnected);
        }

        let request = Frame::routing_activation_request(source);
        self.inner
            .emit(&format!("Sending routing activation request (source {source})"));

        let response = match conn.exchange(&request) {
            Ok(response) => response,
            Err(e) => {
                self.inner.emit(&format!("Routing activation failed: {e}"));
                return Err(e);
            }
        };
        self.inner
            .emit(&format!("Received frame: {}", frame_summary(&response)));

        match (response.kind(), response.activation_code()) {
            (Some(PayloadType::RoutingActivationResponse), Some(ACTIVATION_SUCCESS)) => {
                conn.state = SessionState::Activated;
                conn.active_source = Some(source);
                self.inner.emit("Routing activation successful.");
                Ok(())
            }
            (Some(PayloadType::RoutingActivationResponse), code) => {
                let err = DoipError::ActivationRejected {
                    code: code.unwrap_or(0x00),
                };
                self.inner
                    .emit(&format!("Routing activation failed: {err}. Disconnecting."));
                conn.teardown();
                Err(err)
            }
            _ => {
                let err = DoipError::UnexpectedPayloadType {
                    expected: PayloadType::RoutingActivationResponse as u16,
                    actual: response.raw_type(),
                };
                self.inner
                    .emit(&format!("Routing activation failed: {err}. Disconnecting."));
                conn.teardown();
                Err(err)
            }
        }
    }

    /// Send a diagnostic message and return the correlated response.
    ///
    /// The gateway normally confirms with an ACK before the diagnostic
    /// response; some stacks send the response directly, which is accepted
    /// as well. A NACK fails the exchange but leaves the connection open.
    ///
    /// The socket lock is held across the send and both receives, so
    /// keep-alive traffic cannot interleave with the exchange.
    pub fn send_diagnostic(
        &self,
        source: LogicalAddress,
        target: LogicalAddress,
        uds: &[u8],
    ) -> Result<Frame> {
        let mut conn = self.inner.conn.lock().unwrap();
        if !conn.state.is_connected() {
            return Err(DoipError::NotConnected);
        }

        let request = Frame::diagnostic(source, target, uds);
        self.inner.emit(&format!(
            "Sending diagnostic message {source} -> {target}, UDS {}",
            hex_upper(uds)
        ));

        let first = match conn.exchange(&request) {
            Ok(frame) => frame,
            Err(e) => {
                self.inner.emit(&format!("Diagnostic message failed: {e}"));
                return Err(e);
            }
        };
        self.inner
            .emit(&format!("Received frame: {}", frame_summary(&first)));

        match first.kind() {
            Some(PayloadType::DiagnosticMessageAck) => {
                let response = match conn.recv_one() {
                    Ok(frame) => frame,
                    Err(e) => {
                        self.inner
                            .emit(&format!("Diagnostic response not received: {e}"));
                        return Err(e);
                    }
                };
                self.inner
                    .emit(&format!("Received frame: {}", frame_summary(&response)));
                Ok(response)
            }
            // Gateways that skip the ACK deliver the response directly.
            Some(PayloadType::DiagnosticMessage) => Ok(first),
            Some(PayloadType::DiagnosticMessageNack) => {
                let err = DoipError::NackReceived {
                    code: first.nack_code().unwrap_or(0x00),
                };
                self.inner.emit(&format!("Diagnostic message failed: {err}"));
                Err(err)
            }
            _ => {
                let err = DoipError::UnexpectedPayloadType {
                    expected: PayloadType::DiagnosticMessageAck as u16,
                    actual: first.raw_type(),
                };
                self.inner.emit(&format!("Diagnostic message failed: {err}"));
                Err(err)
            }
        }
    }

    /// Start the TesterPresent keep-alive loop.
    ///
    /// Requires an activated session. The loop sends one fire-and-forget
    /// TesterPresent every `keep_alive_interval` until stopped or until
    /// the session leaves `Activated`. Starting an already running loop is
    /// a no-op.
    pub fn start_tester_present(
        &self,
        source: LogicalAddress,
        physical_target: LogicalAddress,
        mode: TesterPresentMode,
    ) -> Result<()> {
        if !self.state().is_activated() {
            return Err(DoipError::NotConnected);
        }

        let mut slot = self.keep_alive.lock().unwrap();
        if slot.is_some() {
            return Ok(());
        }

        let signal = Arc::new(StopSignal::default());
        let (done_tx, done_rx) = mpsc::channel();

        let inner = Arc::clone(&self.inner);
        let loop_signal = Arc::clone(&signal);
        let interval = self.inner.config.keep_alive_interval;
        let handle = thread::spawn(move || {
            keep_alive_loop(&inner, &loop_signal, source, physical_target, mode, interval);
            let _ = done_tx.send(());
        });

        *slot = Some(KeepAlive {
            signal,
            handle,
            done: done_rx,
        });
        self.inner
            .emit(&format!("Tester present loop started ({mode})"));
        Ok(())
    }

    /// Stop the keep-alive loop.
    ///
    /// Synchronous: interrupts the loop's sleep, then waits up to
    /// `stop_timeout` for it to finish. After this returns, the loop
    /// writes no further frame.
    pub fn stop_tester_present(&self) {
        let keep_alive = self.keep_alive.lock().unwrap().take();
        let Some(keep_alive) = keep_alive else {
            return;
        };

        keep_alive.signal.stop();
        match keep_alive.done.recv_timeout(self.inner.config.stop_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = keep_alive.handle.join();
            }
            // The loop did not confirm in time; it can only be stuck in a
            // bounded socket operation and will observe the stop flag
            // before its next send. Treat it as stopped and detach.
            Err(RecvTimeoutError::Timeout) => drop(keep_alive.handle),
        }
        self.inner.emit("Tester present loop stopped.");
    }

    /// Tear the session down: stop the keep-alive loop, close the socket,
    /// return to `Disconnected`.
    ///
    /// The loop is joined before the socket closes, so no keep-alive send
    /// can race the teardown.
    pub fn disconnect(&self) {
        self.stop_tester_present();

        let mut conn = self.inner.conn.lock().unwrap();
        if conn.state.is_connected() || conn.transport.is_some() {
            conn.teardown();
            self.inner.emit("Disconnected.");
        }
    }

    /// Connect and activate routing in one call.
    pub fn connect_and_activate(&self, host: &str, source: LogicalAddress) -> Result<()> {
        self.connect(host)?;
        self.activate_routing(source)
    }
}

impl Drop for DoipClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for DoipClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoipClient")
            .field("state", &self.state())
            .finish()
    }
}

/// Body of the keep-alive thread.
///
/// Checks the stop flag at the top of each iteration, takes the socket
/// lock only for the duration of one send, and sleeps on the signal's
/// condvar so a stop interrupts the wait immediately. A send failure or a
/// session no longer `Activated` ends the loop.
fn keep_alive_loop(
    inner: &ClientInner,
    signal: &StopSignal,
    source: LogicalAddress,
    physical_target: LogicalAddress,
    mode: TesterPresentMode,
    interval: Duration,
) {
    let frame = Frame::tester_present(source, physical_target, mode);

    loop {
        if signal.is_stopped() {
            break;
        }

        {
            let mut conn = inner.conn.lock().unwrap();
            if !conn.state.is_activated() {
                break;
            }
            match conn.send_only(&frame) {
                Ok(()) => inner.emit(&format!(
                    "Sent {mode} tester present: {}",
                    hex_upper(frame.uds_data().unwrap_or_default())
                )),
                Err(e) => {
                    inner.emit(&format!("Tester present send failed: {e}"));
                    break;
                }
            }
        }

        if signal.wait_interval(interval) {
            break;
        }
    }
}
