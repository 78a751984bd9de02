//! Dispatch of unsolicited helper output.

use async_trait::async_trait;

use crate::protocol::InboundMessage;
use crate::transport::Transport;

/// Receives every inbound message that is not a command completion.
///
/// Messages are routed one at a time, in the order the helper wrote them, on
/// a task separate from the read loop. A router that runs long work (an
/// invoke handler, say) should spawn it so later events are not held up.
/// Routers reply through the supplied transport.
#[async_trait]
pub trait EventRouter: Send + Sync + 'static {
    async fn route(&self, message: InboundMessage, transport: Transport);

    /// Called once when the transport tears down.
    fn on_destroyed(&self) {}
}

/// Router that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRouter;

#[async_trait]
impl EventRouter for NullRouter {
    async fn route(&self, message: InboundMessage, transport: Transport) {
        tracing::debug!(
            helper = transport.name(),
            kind = message.kind(),
            "ignoring unsolicited message"
        );
    }
}
