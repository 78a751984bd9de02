//! Process bridge to out-of-process UI helpers.
//!
//! A helper is an opaque executable driven through newline-delimited JSON
//! over its standard streams:
//! - **Host -> helper**: `{"method", "id", "params"}` commands written to stdin.
//! - **Helper -> host**: `{"type":"response","id",...}` completions, or
//!   unsolicited events (menu clicks, calls from web content) on stdout.
//!
//! [`Transport`] owns the child, correlates responses with pending commands,
//! enforces per-command deadlines, and hands everything else to an
//! [`EventRouter`] without blocking the read loop.

pub mod callback;
pub mod framing;
pub mod protocol;
pub mod router;
pub mod transport;

pub use callback::Callback;
pub use framing::LineBuffer;
pub use protocol::{InboundMessage, OutboundCommand, RESPONSE_TYPE};
pub use router::{EventRouter, NullRouter};
pub use transport::{PendingReply, Transport, TransportConfig, DEFAULT_COMMAND_TIMEOUT};
