//! Next-hop resolution and header construction for outgoing packets.

use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;

use crate::codec::{self, SerializeError};
use crate::link::header::WireHeader;
use crate::link::{SendError, Wire};
use crate::protocol::Protocol;
use crate::route::{NodeInfo, RouteInfo, Routing};

#[derive(Debug)]
pub enum ForwardError {
    /// The destination has no node-info or no routing-table entry. The
    /// packet is dropped; nothing was sent.
    Unreachable,
    Codec(SerializeError),
    Send(SendError),
}

impl fmt::Display for ForwardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardError::Unreachable => write!(f, "destination unreachable"),
            ForwardError::Codec(e) => write!(f, "payload serialization failed: {e}"),
            ForwardError::Send(e) => write!(f, "{e}"),
        }
    }
}

impl From<SendError> for ForwardError {
    fn from(e: SendError) -> Self {
        ForwardError::Send(e)
    }
}

impl From<SerializeError> for ForwardError {
    fn from(e: SerializeError) -> Self {
        ForwardError::Codec(e)
    }
}

/// Builds headers and picks next hops for packets leaving this node.
///
/// The forwarder borrows the socket through [`Wire`] and reads routing
/// snapshots passed in per call; it owns no routing state of its own.
pub struct Forwarder<W> {
    wire: Arc<W>,
    local_port: u16,
}

impl<W: Wire> Forwarder<W> {
    pub fn new(wire: Arc<W>, local_port: u16) -> Self {
        Self { wire, local_port }
    }

    /// Originate user data addressed to a virtual IP.
    ///
    /// The destination resolves to a port through the node info, then to a
    /// next hop through the routing table. `source_ip` is left empty on
    /// freshly originated data.
    pub async fn send_user_data(
        &self,
        dest_virtual_ip: &str,
        payload: &[u8],
        routing: &dyn Routing,
        protocol: Protocol,
    ) -> Result<usize, ForwardError> {
        let dest_port = match routing.get_nodes_info().get(dest_virtual_ip) {
            Some(info) => info.port,
            None => {
                log::warn!("{dest_virtual_ip} has no known physical endpoint, dropping send");
                return Err(ForwardError::Unreachable);
            }
        };
        let next_hop_port = self.next_hop(dest_port, routing)?;

        let header = WireHeader {
            protocol: protocol.into(),
            saddr: self.local_port,
            daddr: dest_port,
            lhaddr: self.local_port,
            lh_ip: routing.find_interface(next_hop_port).unwrap_or_default(),
            source_ip: String::new(),
            dest_ip: dest_virtual_ip.to_string(),
        };

        Ok(self
            .wire
            .send(&header, payload, Ipv4Addr::LOCALHOST, next_hop_port)
            .await?)
    }

    /// Relay an in-flight packet one hop closer to its destination.
    ///
    /// The destination fields travel unchanged; only the last-hop metadata
    /// is rewritten to this node. The payload is never inspected.
    pub async fn forward(
        &self,
        header: &WireHeader,
        payload: &[u8],
        routing: &dyn Routing,
        protocol: Protocol,
    ) -> Result<usize, ForwardError> {
        let next_hop_port = self.next_hop(header.daddr, routing)?;

        let header = WireHeader {
            protocol: protocol.into(),
            lhaddr: self.local_port,
            lh_ip: routing.find_interface(next_hop_port).unwrap_or_default(),
            ..header.clone()
        };

        Ok(self
            .wire
            .send(&header, payload, Ipv4Addr::LOCALHOST, next_hop_port)
            .await?)
    }

    /// Push a routing-table snapshot to a peer's physical endpoint.
    pub async fn send_routing_table(
        &self,
        table: &HashMap<u16, RouteInfo>,
        dest_ip: Ipv4Addr,
        dest_port: u16,
    ) -> Result<usize, ForwardError> {
        let text = codec::serialize_routing_table(table);
        let header = self.control_header(Protocol::RoutingTable, dest_port);
        Ok(self
            .wire
            .send(&header, text.as_bytes(), dest_ip, dest_port)
            .await?)
    }

    /// Push a node-info snapshot to a peer's physical endpoint.
    pub async fn send_nodes_info(
        &self,
        nodes: &HashMap<String, NodeInfo>,
        dest_ip: Ipv4Addr,
        dest_port: u16,
    ) -> Result<usize, ForwardError> {
        let text = codec::serialize_nodes_info(nodes)?;
        let header = self.control_header(Protocol::NodesInfo, dest_port);
        Ok(self
            .wire
            .send(&header, text.as_bytes(), dest_ip, dest_port)
            .await?)
    }

    fn next_hop(&self, dest_port: u16, routing: &dyn Routing) -> Result<u16, ForwardError> {
        match routing.get_routing_table().get(&dest_port) {
            Some(route) => Ok(route.best_route_port),
            None => {
                log::warn!("no route to port {dest_port}, dropping packet");
                Err(ForwardError::Unreachable)
            }
        }
    }

    fn control_header(&self, protocol: Protocol, dest_port: u16) -> WireHeader {
        WireHeader {
            protocol: protocol.into(),
            saddr: self.local_port,
            daddr: dest_port,
            lhaddr: self.local_port,
            lh_ip: String::new(),
            source_ip: String::new(),
            dest_ip: String::new(),
        }
    }
}

/// Index of the interface a packet arrived on, given its last-hop port.
///
/// `None` means the port has no adjacency entry or no interface matches the
/// adjacent virtual address; that is a valid outcome, not a failure.
pub fn arrived_interface(last_hop_port: u16, routing: &dyn Routing) -> Option<usize> {
    let adj = routing.get_adj_mapping();
    let virtual_ip = adj.get(&last_hop_port)?;
    routing
        .get_interfaces()
        .iter()
        .position(|i| i.local == *virtual_ip)
}
