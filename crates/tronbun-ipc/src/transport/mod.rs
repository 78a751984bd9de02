//! Request/response transport over a helper's standard streams.

mod connection;
mod pending;
mod types;


pub use types::{TransportConfig, DEFAULT_COMMAND_TIMEOUT};

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tronbun_common::{new_command_id, TransportError};

use crate::protocol::OutboundCommand;
use crate::router::EventRouter;
use connection::{exit_monitor, reader_loop, stderr_loop, writer_loop};
use pending::{PendingTable, Settlement};

pub(crate) struct Shared {
    config: TransportConfig,
    outbound: mpsc::UnboundedSender<String>,
    pending: PendingTable,
    destroyed: AtomicBool,
    /// Stops the stream tasks and kills the child.
    shutdown: CancellationToken,
    /// Fires once teardown has finished.
    closed: CancellationToken,
    router: Arc<dyn EventRouter>,
}

/// Handle to one helper process. Cheap to clone; all clones share the child.
///
/// Commands are written in issue order and settle exactly once: with the
/// helper's result, its error, a timeout, or a teardown error.
#[derive(Clone)]
pub struct Transport {
    shared: Arc<Shared>,
}

impl Transport {
    /// Launch `path` with piped stdio and start the stream tasks.
    ///
    /// The child runs in the executable's directory. Must be called from
    /// within a Tokio runtime.
    pub fn spawn(
        path: impl AsRef<Path>,
        config: TransportConfig,
        router: Arc<dyn EventRouter>,
    ) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let mut command = Command::new(path);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            command.current_dir(dir);
        }
        Self::spawn_command(command, config, router)
    }

    /// Launch a prepared command. Its stdio is replaced with pipes.
    pub fn spawn_command(
        mut command: Command,
        config: TransportConfig,
        router: Arc<dyn EventRouter>,
    ) -> Result<Self, TransportError> {
        let path = PathBuf::from(command.as_std().get_program());
        let spawn_failure = |source: std::io::Error| TransportError::SpawnFailure {
            helper: config.name.clone(),
            path: path.clone(),
            source: Arc::new(source),
        };

        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(spawn_failure)?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_failure(std::io::Error::other("stdin not captured")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_failure(std::io::Error::other("stdout not captured")))?;
        let stderr = child.stderr.take();

        info!(
            helper = %config.name,
            path = %path.display(),
            pid = ?child.id(),
            "helper started"
        );

        let relay = config.relay_stderr;
        let transport = Self::from_streams(stdin, stdout, config, router);
        if let Some(stderr) = stderr {
            tokio::spawn(stderr_loop(
                transport.name().to_string(),
                stderr,
                relay,
                transport.shared.shutdown.clone(),
            ));
        }
        tokio::spawn(exit_monitor(transport.clone(), child));
        Ok(transport)
    }

    /// Attach to an already-connected pair of streams.
    ///
    /// End of `stdout` is treated as helper exit.
    pub fn from_streams<W, R>(
        stdin: W,
        stdout: R,
        config: TransportConfig,
        router: Arc<dyn EventRouter>,
    ) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
        R: AsyncRead + Send + Unpin + 'static,
    {
        let (outbound, lines) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let transport = Self {
            shared: Arc::new(Shared {
                config,
                outbound,
                pending: PendingTable::default(),
                destroyed: AtomicBool::new(false),
                shutdown: shutdown.clone(),
                closed: CancellationToken::new(),
                router,
            }),
        };

        tokio::spawn(writer_loop(
            transport.name().to_string(),
            stdin,
            lines,
            shutdown,
        ));
        tokio::spawn(reader_loop(transport.clone(), stdout));
        transport
    }

    pub fn name(&self) -> &str {
        &self.shared.config.name
    }

    pub fn command_timeout(&self) -> Duration {
        self.shared.config.command_timeout
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.destroyed.load(Ordering::SeqCst)
    }

    /// Number of commands still awaiting a response.
    pub fn pending_count(&self) -> usize {
        self.shared.pending.len()
    }

    /// Register and enqueue a command without waiting for its completion.
    ///
    /// The deadline starts now. A generated id is used when `id` is `None`.
    pub fn dispatch(
        &self,
        method: &str,
        params: Value,
        id: Option<String>,
    ) -> Result<PendingReply, TransportError> {
        if self.is_destroyed() {
            return Err(self.destroyed_error());
        }

        let id = id.unwrap_or_else(new_command_id);
        let line = OutboundCommand::new(method, id.clone(), params)
            .encode()
            .map_err(|e| TransportError::Encode {
                method: method.to_string(),
                message: e.to_string(),
            })?;

        let (sender, receiver) = oneshot::channel();
        let (token, expiry) = self
            .shared
            .pending
            .insert(id.clone(), method, sender)
            .ok_or_else(|| self.destroyed_error())?;

        debug!(helper = self.name(), command = line.trim_end(), "sending");
        if self.shared.outbound.send(line).is_err() {
            self.shared.pending.take_owned(&id, token);
            return Err(self.destroyed_error());
        }

        tokio::spawn(expire(
            Arc::downgrade(&self.shared),
            id.clone(),
            token,
            expiry,
            Instant::now() + self.command_timeout(),
        ));
        Ok(PendingReply {
            id,
            method: method.to_string(),
            token,
            receiver,
            transport: self.clone(),
        })
    }

    /// Send a command and wait for its completion.
    pub async fn send_command(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        self.dispatch(method, params, None)?.wait().await
    }

    /// Send a command under a caller-chosen id.
    pub async fn send_command_with_id(
        &self,
        method: &str,
        params: Value,
        id: impl Into<String>,
    ) -> Result<Value, TransportError> {
        self.dispatch(method, params, Some(id.into()))?.wait().await
    }

    /// Send a command whose outcome nobody waits for. Failures are logged.
    pub fn send_detached(&self, method: &str, params: Value) {
        self.send_detached_with_id(method, params, None);
    }

    pub fn send_detached_with_id(&self, method: &str, params: Value, id: Option<String>) {
        match self.dispatch(method, params, id) {
            Ok(reply) => {
                let helper = self.name().to_string();
                tokio::spawn(async move {
                    let method = reply.method.clone();
                    if let Err(e) = reply.wait().await {
                        debug!(helper = %helper, method = %method, error = %e, "detached command failed");
                    }
                });
            }
            Err(e) => debug!(helper = self.name(), method, error = %e, "detached command not sent"),
        }
    }

    /// Tear down: reject every pending command, stop the stream tasks and
    /// terminate the child. Runs once; later calls do nothing.
    pub fn cleanup(&self) {
        if self.shared.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }

        let drained = self.shared.pending.close();
        let rejected = drained.len();
        for (_, entry) in drained {
            entry.reject(TransportError::ProcessDestroyed {
                helper: self.name().to_string(),
            });
        }

        self.shared.router.on_destroyed();
        self.shared.shutdown.cancel();
        self.shared.closed.cancel();
        info!(helper = self.name(), rejected, "transport destroyed");
    }

    /// Terminate the child. Teardown follows from its exit.
    pub fn close(&self) {
        debug!(helper = self.name(), "close requested");
        self.shared.shutdown.cancel();
    }

    /// Resolves once the transport has torn down.
    pub async fn closed(&self) {
        self.shared.closed.cancelled().await
    }

    fn destroyed_error(&self) -> TransportError {
        TransportError::TransportDestroyed {
            helper: self.name().to_string(),
        }
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("name", &self.name())
            .field("destroyed", &self.is_destroyed())
            .field("pending", &self.pending_count())
            .finish()
    }
}

/// Reject the command registered under `id` and `token` once `deadline`
/// passes, unless it left the table first.
async fn expire(
    shared: Weak<Shared>,
    id: String,
    token: u64,
    expiry: CancellationToken,
    deadline: Instant,
) {
    tokio::select! {
        _ = expiry.cancelled() => return,
        _ = tokio::time::sleep_until(deadline) => {}
    }
    let Some(shared) = shared.upgrade() else {
        return;
    };
    if let Some(entry) = shared.pending.take_owned(&id, token) {
        debug!(
            helper = %shared.config.name,
            id = %id,
            method = entry.method(),
            "command timed out"
        );
        let error = TransportError::CommandTimeout {
            method: entry.method().to_string(),
            timeout_ms: shared.config.command_timeout.as_millis() as u64,
        };
        entry.reject(error);
    }
}

// ---------------------------------------------------------------------------
// PendingReply
// ---------------------------------------------------------------------------

/// A registered command awaiting its completion.
///
/// The deadline runs from dispatch whether or not the reply is awaited.
/// Dropping it before completion abandons the command.
pub struct PendingReply {
    id: String,
    method: String,
    token: u64,
    receiver: oneshot::Receiver<Settlement>,
    transport: Transport,
}

impl PendingReply {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Wait for the helper's completion, its deadline or teardown.
    pub async fn wait(mut self) -> Result<Value, TransportError> {
        (&mut self.receiver).await.unwrap_or_else(|_| {
            Err(TransportError::ProcessDestroyed {
                helper: self.transport.name().to_string(),
            })
        })
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        self.transport
            .shared
            .pending
            .take_owned(&self.id, self.token);
    }
}
