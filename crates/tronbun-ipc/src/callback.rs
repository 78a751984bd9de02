//! Shareable event callbacks for menu items and bound names.

use futures_util::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type CallbackFn = dyn Fn(String) -> BoxFuture<'static, ()> + Send + Sync;

/// A cloneable handler invoked with the id of the element that fired.
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    /// Wrap a synchronous closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        Self(Arc::new(move |id| {
            f(id);
            Box::pin(std::future::ready(()))
        }))
    }

    /// Wrap a closure returning a future.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self(Arc::new(move |id| Box::pin(f(id))))
    }

    pub async fn invoke(&self, id: impl Into<String>) {
        (self.0)(id.into()).await
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn sync_callback_receives_id() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let cb = Callback::new(move |id| sink.lock().unwrap().push(id));

        cb.invoke("quit").await;
        cb.clone().invoke("about").await;
        assert_eq!(*seen.lock().unwrap(), vec!["quit", "about"]);
    }

    #[tokio::test]
    async fn async_callback_is_awaited() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let cb = Callback::from_async(move |id| {
            let tx = tx.clone();
            async move {
                tokio::task::yield_now().await;
                let _ = tx.send(id);
            }
        });

        cb.invoke("save").await;
        assert_eq!(rx.try_recv().unwrap(), "save");
    }

    #[test]
    fn clones_share_identity() {
        let a = Callback::new(|_| {});
        let b = a.clone();
        let c = Callback::new(|_| {});
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }
}
