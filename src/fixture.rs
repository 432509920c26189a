//! Shared test doubles: a canned routing snapshot, a recording wire, and
//! small helpers for socket tests.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::link::header::WireHeader;
use crate::link::{SendError, Transport, Wire};
use crate::route::{Interface, NodeInfo, RouteInfo, Routing};

/// In-memory [`Routing`] snapshot with builder-style setup.
#[derive(Default)]
pub struct StaticRouting {
    routing_table: HashMap<u16, RouteInfo>,
    nodes_info: HashMap<String, NodeInfo>,
    adj_mapping: HashMap<u16, String>,
    interfaces: Vec<Interface>,
}

impl StaticRouting {
    pub fn with_route(mut self, dest_port: u16, best_route_port: u16, cost: u32) -> Self {
        self.routing_table.insert(
            dest_port,
            RouteInfo {
                best_route_port,
                cost,
            },
        );
        self
    }

    pub fn with_node(mut self, virtual_ip: &str, phys_ip: Ipv4Addr, port: u16) -> Self {
        self.nodes_info
            .insert(virtual_ip.to_string(), NodeInfo { phys_ip, port });
        self
    }

    pub fn with_adjacency(mut self, port: u16, virtual_ip: &str) -> Self {
        self.adj_mapping.insert(port, virtual_ip.to_string());
        self
    }

    pub fn with_interface(mut self, local: &str, peer_port: u16) -> Self {
        self.interfaces.push(Interface {
            local: local.to_string(),
            peer_port,
        });
        self
    }
}

impl Routing for StaticRouting {
    fn get_routing_table(&self) -> HashMap<u16, RouteInfo> {
        self.routing_table.clone()
    }

    fn get_nodes_info(&self) -> HashMap<String, NodeInfo> {
        self.nodes_info.clone()
    }

    fn get_adj_mapping(&self) -> HashMap<u16, String> {
        self.adj_mapping.clone()
    }

    fn get_interfaces(&self) -> Vec<Interface> {
        self.interfaces.clone()
    }

    fn find_interface(&self, port: u16) -> Option<String> {
        self.interfaces
            .iter()
            .find(|i| i.peer_port == port)
            .map(|i| i.local.clone())
    }
}

pub struct SentDatagram {
    pub header: WireHeader,
    pub payload: Vec<u8>,
    pub dest_ip: Ipv4Addr,
    pub dest_port: u16,
}

/// [`Wire`] that records sends instead of touching the network.
#[derive(Default)]
pub struct StubWire {
    sent: Mutex<Vec<SentDatagram>>,
}

impl StubWire {
    pub fn sent(&self) -> Vec<SentDatagram> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

#[async_trait]
impl Wire for StubWire {
    async fn send(
        &self,
        header: &WireHeader,
        payload: &[u8],
        dest_ip: Ipv4Addr,
        dest_port: u16,
    ) -> Result<usize, SendError> {
        self.sent.lock().unwrap().push(SentDatagram {
            header: header.clone(),
            payload: payload.to_vec(),
            dest_ip,
            dest_port,
        });
        Ok(crate::link::header::HEADER_LEN + payload.len())
    }
}

/// A transport bound to an ephemeral loopback port.
pub async fn transport() -> Transport {
    Transport::bind(0).await.expect("test bind failed")
}

pub async fn transport_pair() -> (Transport, Transport) {
    (transport().await, transport().await)
}

/// Poll a condition until it holds, failing the test after a few seconds.
pub async fn wait_until(cond: impl Fn() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within timeout");
}
