use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::link::header::WireHeader;
use crate::protocol::ProtocolHandler;

/// Stops the node's receive loop when a QUIT packet arrives.
pub struct QuitHandler {
    cancel: CancellationToken,
}

impl QuitHandler {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

#[async_trait]
impl ProtocolHandler for QuitHandler {
    async fn handle_packet(&self, header: &WireHeader, _payload: &[u8]) {
        log::info!("received quit from {}, shutting down", header.saddr);
        self.cancel.cancel();
    }
}
