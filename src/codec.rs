//! Text codec for the two control-plane record collections.
//!
//! Records are newline-delimited rows of space-separated fields, embedded as
//! a datagram payload. Row order follows the iteration order of the input
//! map; the grammar has no escaping, so string fields must not contain
//! whitespace. Serialization rejects such fields instead of corrupting the
//! record boundaries.

use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;

use crate::route::{NodeInfo, RouteInfo};

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// A row has fewer fields than the record requires.
    MissingColumn { line: usize },
    /// A numeric field did not parse as an integer.
    MalformedNumber { line: usize },
    /// A physical IP field did not parse as an IPv4 address.
    MalformedAddr { line: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingColumn { line } => write!(f, "line {line}: too few fields"),
            ParseError::MalformedNumber { line } => write!(f, "line {line}: malformed integer"),
            ParseError::MalformedAddr { line } => write!(f, "line {line}: malformed address"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SerializeError {
    /// A string field is empty or contains whitespace and would break the
    /// row grammar.
    InvalidField { value: String },
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializeError::InvalidField { value } => {
                write!(f, "field {value:?} does not fit the record grammar")
            }
        }
    }
}

/// One row per destination: `"<dest_port> <best_route_port> <cost>\n"`.
///
/// An empty table serializes to an empty string.
pub fn serialize_routing_table(table: &HashMap<u16, RouteInfo>) -> String {
    let mut out = String::new();
    for (dest_port, info) in table {
        out.push_str(&format!(
            "{} {} {}\n",
            dest_port, info.best_route_port, info.cost
        ));
    }
    out
}

/// Inverse of [`serialize_routing_table`].
///
/// Rows may carry extra trailing fields, which are ignored. A destination
/// port appearing twice keeps the later row.
pub fn deserialize_routing_table(text: &str) -> Result<HashMap<u16, RouteInfo>, ParseError> {
    let mut table = HashMap::new();
    for (line, row) in text.lines().enumerate() {
        let mut cols = row.split(' ');
        let dest_port = next_int::<u16>(&mut cols, line)?;
        let best_route_port = next_int::<u16>(&mut cols, line)?;
        let cost = next_int::<u32>(&mut cols, line)?;
        table.insert(
            dest_port,
            RouteInfo {
                best_route_port,
                cost,
            },
        );
    }
    Ok(table)
}

/// One row per node: `"<virtual_ip> <phys_ip> <port>\n"`.
pub fn serialize_nodes_info(nodes: &HashMap<String, NodeInfo>) -> Result<String, SerializeError> {
    let mut out = String::new();
    for (virtual_ip, info) in nodes {
        check_field(virtual_ip)?;
        out.push_str(&format!("{} {} {}\n", virtual_ip, info.phys_ip, info.port));
    }
    Ok(out)
}

/// Inverse of [`serialize_nodes_info`], with the same duplicate and extra
/// field behavior as [`deserialize_routing_table`].
pub fn deserialize_nodes_info(text: &str) -> Result<HashMap<String, NodeInfo>, ParseError> {
    let mut nodes = HashMap::new();
    for (line, row) in text.lines().enumerate() {
        let mut cols = row.split(' ');
        let virtual_ip = cols
            .next()
            .filter(|c| !c.is_empty())
            .ok_or(ParseError::MissingColumn { line })?;
        let phys_ip: Ipv4Addr = cols
            .next()
            .ok_or(ParseError::MissingColumn { line })?
            .parse()
            .map_err(|_| ParseError::MalformedAddr { line })?;
        let port = next_int::<u16>(&mut cols, line)?;
        nodes.insert(virtual_ip.to_string(), NodeInfo { phys_ip, port });
    }
    Ok(nodes)
}

fn next_int<'a, T: std::str::FromStr>(
    cols: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<T, ParseError> {
    cols.next()
        .ok_or(ParseError::MissingColumn { line })?
        .parse()
        .map_err(|_| ParseError::MalformedNumber { line })
}

fn check_field(value: &str) -> Result<(), SerializeError> {
    if value.is_empty() || value.contains(char::is_whitespace) {
        Err(SerializeError::InvalidField {
            value: value.to_string(),
        })
    } else {
        Ok(())
    }
}
