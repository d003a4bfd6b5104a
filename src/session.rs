//! Session lifecycle state and statistics.

use std::time::Instant;

/// Session lifecycle state.
///
/// `Disconnected` is both the initial and the terminal state; any
/// unrecoverable transport error forces the session back to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No TCP connection.
    #[default]
    Disconnected,
    /// TCP connection established, routing not yet activated.
    Connected,
    /// Routing activation accepted; diagnostic traffic may flow.
    Activated,
}

impl SessionState {
    /// Check if a TCP connection exists (Connected or Activated).
    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected | SessionState::Activated)
    }

    /// Check if routing has been activated.
    pub fn is_activated(&self) -> bool {
        *self == SessionState::Activated
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Disconnected => write!(f, "Disconnected"),
            SessionState::Connected => write!(f, "Connected"),
            SessionState::Activated => write!(f, "Activated"),
        }
    }
}

/// Session statistics.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Number of successful connections.
    pub connect_count: u64,
    /// Number of connection failures.
    pub failure_count: u64,
    /// Number of frames sent.
    pub frames_sent: u64,
    /// Number of frames received.
    pub frames_received: u64,
    /// Total bytes sent.
    pub bytes_sent: u64,
    /// Total bytes received.
    pub bytes_received: u64,
    /// Time of last successful connection.
    pub last_connected: Option<Instant>,
    /// Time of last disconnect.
    pub last_disconnected: Option<Instant>,
}

impl SessionStats {
    /// Record a successful connection.
    pub fn record_connect(&mut self) {
        self.connect_count += 1;
        self.last_connected = Some(Instant::now());
    }

    /// Record a connection failure.
    pub fn record_failure(&mut self) {
        self.failure_count += 1;
    }

    /// Record a disconnection.
    pub fn record_disconnect(&mut self) {
        self.last_disconnected = Some(Instant::now());
    }

    /// Record a sent frame.
    pub fn record_send(&mut self, bytes: usize) {
        self.frames_sent += 1;
        self.bytes_sent += bytes as u64;
    }

    /// Record a received frame.
    pub fn record_receive(&mut self, bytes: usize) {
        self.frames_received += 1;
        self.bytes_received += bytes as u64;
    }

    /// Time since the last successful connection.
    pub fn uptime(&self) -> Option<std::time::Duration> {
        self.last_connected.map(|t| t.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state() {
        assert!(!SessionState::Disconnected.is_connected());
        assert!(SessionState::Connected.is_connected());
        assert!(SessionState::Activated.is_connected());

        assert!(!SessionState::Connected.is_activated());
        assert!(SessionState::Activated.is_activated());

        assert_eq!(SessionState::default(), SessionState::Disconnected);
    }

    #[test]
    fn test_session_stats() {
        let mut stats = SessionStats::default();

        stats.record_connect();
        assert_eq!(stats.connect_count, 1);
        assert!(stats.last_connected.is_some());

        stats.record_send(15);
        stats.record_receive(13);
        assert_eq!(stats.frames_sent, 1);
        assert_eq!(stats.bytes_sent, 15);
        assert_eq!(stats.frames_received, 1);
        assert_eq!(stats.bytes_received, 13);

        stats.record_failure();
        assert_eq!(stats.failure_count, 1);

        stats.record_disconnect();
        assert!(stats.last_disconnected.is_some());
    }
}
