use std::fmt;

use async_trait::async_trait;

use crate::link::header::WireHeader;
use crate::protocol::ProtocolHandler;

/// Prints user-data packets that terminated at this node.
#[derive(Default)]
pub struct UserDataHandler {}

struct UserData<'a> {
    header: &'a WireHeader,
    payload: &'a [u8],
}

#[async_trait]
impl ProtocolHandler for UserDataHandler {
    async fn handle_packet(&self, header: &WireHeader, payload: &[u8]) {
        print!("{}", UserData { header, payload });
    }
}

impl fmt::Display for UserData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "---Node received packet!---\n\
            \tsource IP\t:\t{}\n\
            \tdestination IP\t:\t{}\n\
            \tlast hop\t:\t{} ({})\n\
            \tprotocol\t:\t{}\n\
            \tpayload length\t:\t{}\n\
            \tpayload\t\t:\t{}\n\
            ---------------------------
            ",
            self.header.source_ip,
            self.header.dest_ip,
            self.header.lh_ip,
            self.header.lhaddr,
            self.header.protocol,
            self.payload.len(),
            String::from_utf8_lossy(self.payload)
        )
    }
}
