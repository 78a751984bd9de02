//! Background tasks attached to a helper's standard streams.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::Transport;
use crate::framing::LineBuffer;
use crate::protocol::InboundMessage;

const READ_CHUNK: usize = 8 * 1024;

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Drain queued command lines into the helper's stdin, one at a time, so
/// lines never interleave.
pub(crate) async fn writer_loop<W>(
    helper: String,
    mut stdin: W,
    mut lines: mpsc::UnboundedReceiver<String>,
    shutdown: CancellationToken,
) where
    W: AsyncWrite + Unpin,
{
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.recv() => match line {
                Some(line) => line,
                None => break,
            },
        };

        if let Err(e) = stdin.write_all(line.as_bytes()).await {
            warn!(helper = %helper, error = %e, "failed to write command");
            break;
        }
        if let Err(e) = stdin.flush().await {
            warn!(helper = %helper, error = %e, "failed to flush command");
            break;
        }
    }

    let _ = stdin.shutdown().await;
    debug!(helper = %helper, "stdin closed");
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Frame stdout into lines and dispatch each one. End of stream tears the
/// transport down.
pub(crate) async fn reader_loop<R>(transport: Transport, mut stdout: R)
where
    R: AsyncRead + Unpin,
{
    let shutdown = transport.shared.shutdown.clone();
    let mut framer = LineBuffer::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    let (events, queue) = mpsc::unbounded_channel();
    tokio::spawn(event_loop(transport.clone(), queue));

    loop {
        let n = tokio::select! {
            _ = shutdown.cancelled() => break,
            read = stdout.read(&mut chunk) => match read {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    debug!(helper = transport.name(), error = %e, "stdout read failed");
                    break;
                }
            },
        };

        for line in framer.push(&chunk[..n]) {
            handle_line(&transport, &events, &line);
        }
    }

    if !framer.is_empty() {
        debug!(
            helper = transport.name(),
            bytes = framer.remainder().len(),
            "discarding unterminated output"
        );
    }
    transport.cleanup();
}

/// Route one stdout line: settle a pending command, or queue the message for
/// the event router.
pub(crate) fn handle_line(
    transport: &Transport,
    events: &mpsc::UnboundedSender<InboundMessage>,
    line: &str,
) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    let message: InboundMessage = match serde_json::from_str(line) {
        Ok(message) => message,
        Err(_) => {
            debug!(helper = transport.name(), output = line, "non-protocol output");
            return;
        }
    };

    if let Some(id) = message.id.as_deref() {
        if let Some(entry) = transport.shared.pending.take(id) {
            debug!(helper = transport.name(), id, method = entry.method(), "command settled");
            entry.settle(message);
            return;
        }
    }

    if message.is_response() {
        debug!(
            helper = transport.name(),
            id = message.id.as_deref().unwrap_or(""),
            "dropping response with no pending command"
        );
        return;
    }

    let _ = events.send(message);
}

/// Hand queued events to the router one at a time, in arrival order. Runs
/// off the read loop so responses keep settling while a router is busy.
/// Ends once the reader is gone and the queue is drained, or at teardown.
pub(crate) async fn event_loop(
    transport: Transport,
    mut queue: mpsc::UnboundedReceiver<InboundMessage>,
) {
    let router = Arc::clone(&transport.shared.router);
    let closed = transport.shared.closed.clone();

    loop {
        let message = tokio::select! {
            biased;
            message = queue.recv() => match message {
                Some(message) => message,
                None => break,
            },
            _ = closed.cancelled() => break,
        };
        router.route(message, transport.clone()).await;
    }
}

// ---------------------------------------------------------------------------
// Stderr relay
// ---------------------------------------------------------------------------

/// Drain the helper's stderr for as long as it runs. With `relay` set each
/// line is copied to the host's stderr as `[<helper>] <line>`; otherwise it
/// is logged at debug level.
///
/// The pipe must be read either way: a helper that writes diagnostics into a
/// closed pipe is killed by SIGPIPE.
pub(crate) async fn stderr_loop<R>(
    helper: String,
    stderr: R,
    relay: bool,
    shutdown: CancellationToken,
) where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stderr).lines();
    let mut out = tokio::io::stderr();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => line,
                _ => break,
            },
        };
        if relay {
            let _ = out.write_all(format!("[{helper}] {line}\n").as_bytes()).await;
        } else {
            debug!(helper = %helper, output = %line, "helper stderr");
        }
    }
}

// ---------------------------------------------------------------------------
// Exit monitor
// ---------------------------------------------------------------------------

/// Own the child until it exits, killing it when the transport shuts down.
pub(crate) async fn exit_monitor(transport: Transport, mut child: Child) {
    let shutdown = transport.shared.shutdown.clone();

    let status = tokio::select! {
        status = child.wait() => status,
        _ = shutdown.cancelled() => {
            if let Err(e) = child.start_kill() {
                debug!(helper = transport.name(), error = %e, "kill failed");
            }
            child.wait().await
        }
    };

    match status {
        Ok(status) => info!(helper = transport.name(), code = ?status.code(), "helper exited"),
        Err(e) => warn!(helper = transport.name(), error = %e, "failed to reap helper"),
    }
    transport.cleanup();
}
