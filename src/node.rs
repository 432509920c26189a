//! The per-node receive loop.

use std::io;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::link::Transport;
use crate::protocol::{Dispatcher, ProtocolHandler};

pub struct NodeBuilder {
    port: u16,
    dispatcher: Dispatcher,
    cancel: CancellationToken,
}

impl NodeBuilder {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            dispatcher: Dispatcher::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Register a handler for a protocol number.
    ///
    /// Registration order matters: on receipt, the first matching handler
    /// wins and later duplicates for the same protocol are never invoked.
    pub fn with_protocol_handler<P: Into<u8>, H: ProtocolHandler + 'static>(
        mut self,
        protocol: P,
        handler: H,
    ) -> Self {
        self.dispatcher.register(protocol, handler);
        self
    }

    /// Token that stops the receive loop; hand a clone to a
    /// [`crate::protocol::quit::QuitHandler`] or cancel it directly.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Bind the node's socket. A bind failure is fatal to the node; the
    /// caller should terminate with the returned diagnostic.
    pub async fn build(self) -> io::Result<Node> {
        let transport = Arc::new(Transport::bind(self.port).await?);
        Ok(Node {
            transport,
            dispatcher: self.dispatcher,
            cancel: self.cancel,
        })
    }
}

/// One overlay node: a bound transport plus its handler registry.
pub struct Node {
    transport: Arc<Transport>,
    dispatcher: Dispatcher,
    cancel: CancellationToken,
}

impl Node {
    pub fn builder(port: u16) -> NodeBuilder {
        NodeBuilder::new(port)
    }

    pub fn transport(&self) -> Arc<Transport> {
        self.transport.clone()
    }

    pub fn local_port(&self) -> u16 {
        self.transport.local_port()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Receive datagrams until cancelled.
    ///
    /// Strictly sequential: each datagram is fully dispatched before the
    /// next one is read, so handlers observe packets in arrival order. A
    /// failed receive is logged and the loop keeps serving; one bad packet
    /// never stops the node.
    pub async fn run(&self) {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    log::info!("receive loop on port {} stopped", self.local_port());
                    return;
                }
                received = self.transport.recv() => match received {
                    Ok((header, payload)) => {
                        self.dispatcher.dispatch(&header, &payload).await;
                    }
                    Err(e) => log::warn!("dropping datagram: {e}"),
                },
            }
        }
    }
}
