//! Interface to the routing collaborator.
//!
//! Route computation, adjacency discovery and convergence live outside this
//! crate. The core only reads per-call snapshots through [`Routing`]; it
//! never mutates them, so no synchronization is required here as long as
//! each accessor returns a consistent snapshot.

use std::collections::HashMap;
use std::net::Ipv4Addr;

/// Best known route to one destination port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteInfo {
    /// Port of the adjacent node a packet should be sent to next.
    pub best_route_port: u16,
    pub cost: u32,
}

/// Physical endpoint a virtual address is reachable at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeInfo {
    pub phys_ip: Ipv4Addr,
    pub port: u16,
}

/// One adjacency of this node, identified by its local virtual address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// Virtual address of this end of the link.
    pub local: String,
    /// Port of the neighbor on the other end.
    pub peer_port: u16,
}

pub trait Routing: Send + Sync {
    /// Destination port to best-route snapshot.
    fn get_routing_table(&self) -> HashMap<u16, RouteInfo>;

    /// Virtual address to physical endpoint snapshot.
    fn get_nodes_info(&self) -> HashMap<String, NodeInfo>;

    /// Adjacent port to that neighbor's virtual address.
    fn get_adj_mapping(&self) -> HashMap<u16, String>;

    /// This node's interfaces, ordered by interface index.
    fn get_interfaces(&self) -> Vec<Interface>;

    /// Local virtual address of the interface facing the given adjacent
    /// port, if any.
    fn find_interface(&self, port: u16) -> Option<String>;
}
