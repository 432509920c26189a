pub mod quit;
pub mod user;

use async_trait::async_trait;

use crate::link::header::WireHeader;

/// Message kinds carried in the wire header's protocol field.
///
/// The control-plane kinds occupy the high range; any other value is a
/// caller-defined user protocol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Protocol {
    RoutingTable,
    NodesInfo,
    Quit,
    User(u8),
}

impl From<u8> for Protocol {
    fn from(value: u8) -> Self {
        match value {
            200 => Protocol::RoutingTable,
            201 => Protocol::NodesInfo,
            202 => Protocol::Quit,
            other => Protocol::User(other),
        }
    }
}

impl From<Protocol> for u8 {
    fn from(protocol: Protocol) -> u8 {
        match protocol {
            Protocol::RoutingTable => 200,
            Protocol::NodesInfo => 201,
            Protocol::Quit => 202,
            Protocol::User(value) => value,
        }
    }
}

#[async_trait]
pub trait ProtocolHandler: Send + Sync {
    async fn handle_packet(&self, header: &WireHeader, payload: &[u8]);
}

struct Registration {
    protocol: u8,
    handler: Box<dyn ProtocolHandler>,
}

/// Ordered protocol-number to handler registry.
///
/// Registrations are scanned in order and only the first handler whose
/// protocol number matches is invoked, so a duplicate registration for the
/// same protocol is unreachable. Duplicates are accepted anyway; uniqueness
/// is the caller's concern.
#[derive(Default)]
pub struct Dispatcher {
    handlers: Vec<Registration>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P: Into<u8>, H: ProtocolHandler + 'static>(&mut self, protocol: P, handler: H) {
        self.handlers.push(Registration {
            protocol: protocol.into(),
            handler: Box::new(handler),
        });
    }

    /// Hand a received packet to the first matching handler.
    ///
    /// A packet with no matching handler is dropped without error; unknown
    /// protocol numbers are simply unhandled.
    pub async fn dispatch(&self, header: &WireHeader, payload: &[u8]) {
        match self
            .handlers
            .iter()
            .find(|r| r.protocol == header.protocol)
        {
            Some(registration) => registration.handler.handle_packet(header, payload).await,
            None => log::debug!("no handler for protocol {}, dropping packet", header.protocol),
        }
    }
}
