//! TCP transport for DoIP.

use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

use crate::codec::{read_frame, write_frame};
use crate::config::ClientConfig;
use crate::error::{DoipError, Result};
use crate::frame::Frame;

/// Default TCP port for DoIP (ISO 13400).
pub const DEFAULT_PORT: u16 = 13400;

/// One TCP connection to a DoIP gateway.
///
/// The stream is owned exclusively; callers serialize access through the
/// session's lock. Any short write or socket error is fatal to the
/// connection.
#[derive(Debug)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
    peer_addr: SocketAddr,
}

impl TcpTransport {
    /// Open a TCP stream to the gateway with bounded connect, read, and
    /// write timeouts taken from the configuration.
    pub fn connect(host: &str, config: &ClientConfig) -> Result<Self> {
        let addr = (host, config.port)
            .to_socket_addrs()
            .map_err(DoipError::ConnectFailed)?
            .next()
            .ok_or_else(|| {
                DoipError::ConnectFailed(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "no address resolved",
                ))
            })?;

        let stream = TcpStream::connect_timeout(&addr, config.connect_timeout)
            .map_err(DoipError::ConnectFailed)?;
        stream
            .set_read_timeout(Some(config.read_timeout))
            .map_err(DoipError::ConnectFailed)?;
        stream
            .set_write_timeout(Some(config.write_timeout))
            .map_err(DoipError::ConnectFailed)?;

        Ok(Self {
            stream: Some(stream),
            peer_addr: addr,
        })
    }

    /// The gateway address this transport is connected to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Check if the transport is open.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream> {
        self.stream.as_mut().ok_or(DoipError::NotConnected)
    }

    /// Write one complete frame to the gateway.
    pub fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        let stream = self.stream_mut()?;
        write_frame(stream, frame)?;
        stream.flush()?;
        Ok(())
    }

    /// Block until one complete frame arrives or the read deadline expires.
    pub fn recv_frame(&mut self) -> Result<Frame> {
        read_frame(self.stream_mut()?)
    }

    /// Send a frame and await exactly one frame in reply.
    ///
    /// The caller checks that the reply's payload type matches its
    /// expectation.
    pub fn request(&mut self, frame: &Frame) -> Result<Frame> {
        self.send_frame(frame)?;
        self.recv_frame()
    }

    /// Close the transport. Idempotent.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}
