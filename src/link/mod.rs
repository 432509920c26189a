pub mod header;

use std::fmt;
use std::io;
use std::net::Ipv4Addr;

use async_trait::async_trait;
use tokio::net::UdpSocket;

use crate::utils::localhost_with_port;
use header::{HeaderError, WireHeader, HEADER_LEN};

/// Largest datagram this layer will send or receive. Payloads are never
/// fragmented; anything larger is rejected before the send.
pub const MAX_DATAGRAM_SZ: usize = 1400;

/// Largest payload that fits one datagram next to the header.
pub const MAX_PAYLOAD_SZ: usize = MAX_DATAGRAM_SZ - HEADER_LEN;

#[derive(Debug)]
pub enum SendError {
    /// Header plus payload exceeds [`MAX_DATAGRAM_SZ`]. No send attempted.
    PayloadTooLarge { size: usize },
    Header(HeaderError),
    Io(io::Error),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::PayloadTooLarge { size } => {
                write!(f, "datagram would be {size} bytes, limit is {MAX_DATAGRAM_SZ}")
            }
            SendError::Header(e) => write!(f, "header encode failed: {e}"),
            SendError::Io(e) => write!(f, "send failed: {e}"),
        }
    }
}

impl From<HeaderError> for SendError {
    fn from(e: HeaderError) -> Self {
        SendError::Header(e)
    }
}

#[derive(Debug)]
pub enum RecvError {
    /// The datagram is shorter than the fixed header.
    Header(HeaderError),
    Io(io::Error),
}

impl fmt::Display for RecvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecvError::Header(e) => write!(f, "header decode failed: {e}"),
            RecvError::Io(e) => write!(f, "receive failed: {e}"),
        }
    }
}

impl From<HeaderError> for RecvError {
    fn from(e: HeaderError) -> Self {
        RecvError::Header(e)
    }
}

/// Sending side of the transport, as a seam for tests and the forwarder.
#[async_trait]
pub trait Wire: Send + Sync {
    async fn send(
        &self,
        header: &WireHeader,
        payload: &[u8],
        dest_ip: Ipv4Addr,
        dest_port: u16,
    ) -> Result<usize, SendError>;
}

/// Owner of this node's single UDP socket.
///
/// All peer addressing in the simulation is loopback plus port; the local
/// port doubles as the node's identity.
pub struct Transport {
    sock: UdpSocket,
    local_port: u16,
}

impl Transport {
    /// Bind the node's socket.
    ///
    /// There is no local recovery from a bind failure; callers are expected
    /// to terminate with the returned diagnostic.
    pub async fn bind(port: u16) -> io::Result<Self> {
        let sock = UdpSocket::bind(localhost_with_port(port)).await?;
        // port 0 asks the OS for an ephemeral port; record what we got
        let local_port = sock.local_addr()?.port();
        Ok(Self { sock, local_port })
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Block until one datagram arrives, split off its header.
    ///
    /// The payload is exactly the bytes following the fixed header, so a
    /// datagram of exactly [`HEADER_LEN`] bytes yields an empty payload and
    /// anything shorter is an error.
    pub async fn recv(&self) -> Result<(WireHeader, Vec<u8>), RecvError> {
        let mut buf = [0u8; MAX_DATAGRAM_SZ];
        let sz = self.sock.recv(&mut buf).await.map_err(RecvError::Io)?;
        let header = WireHeader::decode(&buf[..sz])?;
        Ok((header, buf[HEADER_LEN..sz].to_vec()))
    }
}

#[async_trait]
impl Wire for Transport {
    /// Send one datagram of header plus payload.
    ///
    /// The size limit is enforced before encoding or any syscall. A short
    /// send is reported through the returned byte count, not retried.
    async fn send(
        &self,
        header: &WireHeader,
        payload: &[u8],
        dest_ip: Ipv4Addr,
        dest_port: u16,
    ) -> Result<usize, SendError> {
        let size = HEADER_LEN + payload.len();
        if size > MAX_DATAGRAM_SZ {
            return Err(SendError::PayloadTooLarge { size });
        }

        let mut datagram = Vec::with_capacity(size);
        datagram.extend_from_slice(&header.encode()?);
        datagram.extend_from_slice(payload);

        self.sock
            .send_to(&datagram, (dest_ip, dest_port))
            .await
            .map_err(SendError::Io)
    }
}
