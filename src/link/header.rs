use std::fmt;

use bytes::{Buf, BufMut};

/// Capacity of an embedded virtual-address slot, in bytes.
pub const VIRTUAL_ADDR_CAP: usize = 16;

/// Serialized size of a [`WireHeader`]: one protocol byte, three ports, and
/// three length-prefixed address slots.
pub const HEADER_LEN: usize = 1 + 3 * 2 + 3 * (1 + VIRTUAL_ADDR_CAP);

/// The fixed header carried at the front of every datagram.
///
/// Ports are the UDP ports nodes are bound to; they double as node
/// identities within the simulation. The string fields hold virtual
/// addresses and are encoded as fixed-capacity, length-prefixed slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireHeader {
    /// Message kind; see [`crate::protocol::Protocol`].
    pub protocol: u8,
    /// Port of the originating node.
    pub saddr: u16,
    /// Port of the final destination node.
    pub daddr: u16,
    /// Port of the last node that forwarded this packet.
    pub lhaddr: u16,
    /// Virtual address of the last hop.
    pub lh_ip: String,
    /// Virtual address of the original sender; empty for freshly
    /// originated data.
    pub source_ip: String,
    /// Virtual address of the final destination.
    pub dest_ip: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum HeaderError {
    /// A virtual-address field does not fit its slot. Nothing is written.
    FieldTooLong { field: &'static str, len: usize },
    /// The byte block is shorter than [`HEADER_LEN`].
    Truncated { len: usize },
    /// A slot length exceeds the capacity, or slot bytes are not UTF-8.
    BadEncoding,
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::FieldTooLong { field, len } => {
                write!(
                    f,
                    "header field {field} is {len} bytes, capacity is {VIRTUAL_ADDR_CAP}"
                )
            }
            HeaderError::Truncated { len } => {
                write!(f, "header block is {len} bytes, expected {HEADER_LEN}")
            }
            HeaderError::BadEncoding => write!(f, "malformed address slot"),
        }
    }
}

impl WireHeader {
    /// Serialize into the fixed wire layout.
    ///
    /// Fails before writing anything if an address string exceeds its slot,
    /// rather than truncating it into the adjacent field.
    pub fn encode(&self) -> Result<[u8; HEADER_LEN], HeaderError> {
        check_capacity("lh_ip", &self.lh_ip)?;
        check_capacity("source_ip", &self.source_ip)?;
        check_capacity("dest_ip", &self.dest_ip)?;

        let mut block = [0u8; HEADER_LEN];
        let mut buf = &mut block[..];
        buf.put_u8(self.protocol);
        buf.put_u16(self.saddr);
        buf.put_u16(self.daddr);
        buf.put_u16(self.lhaddr);
        put_addr_slot(&mut buf, &self.lh_ip);
        put_addr_slot(&mut buf, &self.source_ip);
        put_addr_slot(&mut buf, &self.dest_ip);

        Ok(block)
    }

    /// Deserialize from the first [`HEADER_LEN`] bytes of a datagram.
    pub fn decode(bytes: &[u8]) -> Result<Self, HeaderError> {
        if bytes.len() < HEADER_LEN {
            return Err(HeaderError::Truncated { len: bytes.len() });
        }

        let mut buf = &bytes[..HEADER_LEN];
        let protocol = buf.get_u8();
        let saddr = buf.get_u16();
        let daddr = buf.get_u16();
        let lhaddr = buf.get_u16();
        let lh_ip = get_addr_slot(&mut buf)?;
        let source_ip = get_addr_slot(&mut buf)?;
        let dest_ip = get_addr_slot(&mut buf)?;

        Ok(Self {
            protocol,
            saddr,
            daddr,
            lhaddr,
            lh_ip,
            source_ip,
            dest_ip,
        })
    }
}

fn check_capacity(field: &'static str, value: &str) -> Result<(), HeaderError> {
    if value.len() > VIRTUAL_ADDR_CAP {
        Err(HeaderError::FieldTooLong {
            field,
            len: value.len(),
        })
    } else {
        Ok(())
    }
}

fn put_addr_slot(buf: &mut &mut [u8], value: &str) {
    buf.put_u8(value.len() as u8);
    buf.put_slice(value.as_bytes());
    // zero padding up to capacity
    for _ in value.len()..VIRTUAL_ADDR_CAP {
        buf.put_u8(0);
    }
}

fn get_addr_slot(buf: &mut &[u8]) -> Result<String, HeaderError> {
    let len = buf.get_u8() as usize;
    if len > VIRTUAL_ADDR_CAP {
        return Err(HeaderError::BadEncoding);
    }
    let value = String::from_utf8(buf[..len].to_vec()).map_err(|_| HeaderError::BadEncoding)?;
    buf.advance(VIRTUAL_ADDR_CAP);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> WireHeader {
        WireHeader {
            protocol: 17,
            saddr: 5000,
            daddr: 5002,
            lhaddr: 5001,
            lh_ip: "10.0.0.3".into(),
            source_ip: "10.0.0.1".into(),
            dest_ip: "10.0.0.5".into(),
        }
    }

    #[test]
    fn round_trip() {
        let header = sample_header();
        let block = header.encode().unwrap();
        assert_eq!(block.len(), HEADER_LEN);
        assert_eq!(WireHeader::decode(&block).unwrap(), header);
    }

    #[test]
    fn round_trip_empty_addresses() {
        let header = WireHeader {
            lh_ip: String::new(),
            source_ip: String::new(),
            dest_ip: String::new(),
            ..sample_header()
        };
        let block = header.encode().unwrap();
        assert_eq!(WireHeader::decode(&block).unwrap(), header);
    }

    #[test]
    fn oversized_address_is_rejected() {
        let header = WireHeader {
            dest_ip: "a".repeat(VIRTUAL_ADDR_CAP + 1),
            ..sample_header()
        };
        assert_eq!(
            header.encode(),
            Err(HeaderError::FieldTooLong {
                field: "dest_ip",
                len: VIRTUAL_ADDR_CAP + 1
            })
        );
    }

    #[test]
    fn address_at_capacity_fits() {
        let header = WireHeader {
            dest_ip: "a".repeat(VIRTUAL_ADDR_CAP),
            ..sample_header()
        };
        let block = header.encode().unwrap();
        assert_eq!(WireHeader::decode(&block).unwrap(), header);
    }

    #[test]
    fn short_block_is_truncated() {
        let block = sample_header().encode().unwrap();
        assert_eq!(
            WireHeader::decode(&block[..HEADER_LEN - 1]),
            Err(HeaderError::Truncated {
                len: HEADER_LEN - 1
            })
        );
        assert_eq!(
            WireHeader::decode(&[]),
            Err(HeaderError::Truncated { len: 0 })
        );
    }

    #[test]
    fn corrupt_slot_length_is_rejected() {
        let mut block = sample_header().encode().unwrap();
        // first slot length byte sits right after the three ports
        block[7] = (VIRTUAL_ADDR_CAP + 1) as u8;
        assert_eq!(WireHeader::decode(&block), Err(HeaderError::BadEncoding));
    }

    #[test]
    fn decode_ignores_trailing_payload() {
        let header = sample_header();
        let mut bytes = header.encode().unwrap().to_vec();
        bytes.extend_from_slice(b"payload bytes");
        assert_eq!(WireHeader::decode(&bytes).unwrap(), header);
    }
}
