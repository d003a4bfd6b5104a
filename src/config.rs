//! Client configuration.

use std::time::Duration;

use crate::transport::DEFAULT_PORT;

/// Configuration for a [`DoipClient`](crate::client::DoipClient).
///
/// A broken transport is never retried automatically; resuming operation
/// always requires an explicit `connect()` from the caller.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// TCP port of the DoIP gateway.
    pub port: u16,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Read timeout applied to every blocking receive.
    pub read_timeout: Duration,
    /// Write timeout applied to every send.
    pub write_timeout: Duration,
    /// Interval between TesterPresent keep-alive messages.
    pub keep_alive_interval: Duration,
    /// Bounded wait for the keep-alive loop to finish when stopping it.
    pub stop_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),
            keep_alive_interval: Duration::from_secs(2),
            stop_timeout: Duration::from_millis(500),
        }
    }
}

impl ClientConfig {
    /// Set the gateway TCP port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the write timeout.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the keep-alive interval.
    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    /// Set the bounded wait used when stopping the keep-alive loop.
    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }
}
