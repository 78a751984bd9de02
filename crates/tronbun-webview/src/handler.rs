//! Host-side handler types invoked from web content.

use futures_util::future::BoxFuture;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tronbun_common::HandlerError;

/// Answers `window.tronbun.invoke(channel, data)` calls for one channel.
pub type IpcHandler =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, HandlerError>> + Send + Sync>;

/// Receives the argument array of a function bound with `bind`.
pub type BindHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, ()> + Send + Sync>;

pub fn ipc_handler<F, Fut>(f: F) -> IpcHandler
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    Arc::new(move |data| Box::pin(f(data)))
}

pub fn bind_handler<F, Fut>(f: F) -> BindHandler
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |args| Box::pin(f(args)))
}
