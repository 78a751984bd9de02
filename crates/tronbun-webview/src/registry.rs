//! Process-wide table of window types and the handlers they expose.
//!
//! Each window type gets a logical name (the namespace exposed to the page)
//! and an ordered list of handlers. Types declare themselves once through
//! [`IpcWindow::declare`]; the free functions [`window_name`] and
//! [`main_handler`] do the same registration without the trait.

use futures_util::future::BoxFuture;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, LazyLock, Mutex, PoisonError, RwLock};
use tracing::debug;
use tronbun_common::HandlerError;

use crate::handler::IpcHandler;

/// A handler method not yet bound to an instance.
type Method<T> =
    Arc<dyn Fn(Arc<T>, Value) -> BoxFuture<'static, Result<Value, HandlerError>> + Send + Sync>;

static REGISTRY: LazyLock<RwLock<HashMap<TypeId, Entry>>> = LazyLock::new(Default::default);
static DECLARED: LazyLock<Mutex<HashSet<TypeId>>> = LazyLock::new(Default::default);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerMetadata {
    /// Channel name the page invokes.
    pub name: String,
    /// Host-side method it lands on.
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowMetadata {
    pub name: String,
    pub handlers: Vec<HandlerMetadata>,
}

impl WindowMetadata {
    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name.as_str()).collect()
    }
}

struct Slot {
    metadata: HandlerMetadata,
    // Holds a `Method<T>` for the entry's type.
    method: Arc<dyn Any + Send + Sync>,
}

struct Entry {
    name: Option<String>,
    type_name: &'static str,
    slots: Vec<Slot>,
}

impl Entry {
    fn new<T: 'static>() -> Self {
        Self {
            name: None,
            type_name: std::any::type_name::<T>(),
            slots: Vec::new(),
        }
    }

    fn metadata(&self) -> WindowMetadata {
        WindowMetadata {
            name: self
                .name
                .clone()
                .unwrap_or_else(|| short_type_name(self.type_name).to_string()),
            handlers: self.slots.iter().map(|s| s.metadata.clone()).collect(),
        }
    }

    /// Insert or replace the slot for `metadata.name`, keeping its position.
    fn put(&mut self, metadata: HandlerMetadata, method: Arc<dyn Any + Send + Sync>) {
        match self
            .slots
            .iter_mut()
            .find(|s| s.metadata.name == metadata.name)
        {
            Some(slot) => {
                debug!(handler = %metadata.name, "replacing handler");
                *slot = Slot { metadata, method };
            }
            None => self.slots.push(Slot { metadata, method }),
        }
    }
}

/// Last path segment of a type name, without generic arguments.
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn with_entry<T: 'static, R>(f: impl FnOnce(&mut Entry) -> R) -> R {
    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    let entry = registry
        .entry(TypeId::of::<T>())
        .or_insert_with(Entry::new::<T>);
    f(entry)
}

fn erase<T, F, Fut>(f: F) -> Arc<dyn Any + Send + Sync>
where
    T: Send + Sync + 'static,
    F: Fn(Arc<T>, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    let method: Method<T> = Arc::new(move |this, data| Box::pin(f(this, data)));
    Arc::new(method)
}

// ---- Registration ----

/// Set the logical name of `T`.
pub fn window_name<T: 'static>(name: impl Into<String>) {
    let name = name.into();
    with_entry::<T, _>(|entry| entry.name = Some(name));
}

/// Expose `f` to the page as handler `name` of `T`.
///
/// Registering the same name again replaces the earlier handler in place.
pub fn main_handler<T, F, Fut>(name: impl Into<String>, method: impl Into<String>, f: F)
where
    T: Send + Sync + 'static,
    F: Fn(Arc<T>, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    let metadata = HandlerMetadata {
        name: name.into(),
        method: method.into(),
    };
    let erased = erase::<T, F, Fut>(f);
    with_entry::<T, _>(|entry| entry.put(metadata, erased));
}

// ---- Lookup ----

/// Metadata for `T`, or `None` if it never registered anything.
pub fn metadata<T: 'static>() -> Option<WindowMetadata> {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    registry.get(&TypeId::of::<T>()).map(Entry::metadata)
}

/// Every registered window type, sorted by logical name.
pub fn all_metadata() -> Vec<WindowMetadata> {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    let mut all: Vec<WindowMetadata> = registry.values().map(Entry::metadata).collect();
    all.sort_by(|a, b| a.name.cmp(&b.name));
    all
}

/// Bind every handler of `T` to `instance`, in declaration order.
pub fn bind_handlers<T: Send + Sync + 'static>(instance: &Arc<T>) -> Vec<(String, IpcHandler)> {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    let Some(entry) = registry.get(&TypeId::of::<T>()) else {
        return Vec::new();
    };

    entry
        .slots
        .iter()
        .filter_map(|slot| {
            let method = slot.method.downcast_ref::<Method<T>>()?.clone();
            let this = Arc::clone(instance);
            let handler: IpcHandler = Arc::new(move |data: Value| method(Arc::clone(&this), data));
            Some((slot.metadata.name.clone(), handler))
        })
        .collect()
}

// ---- Declarative registration ----

/// A window type whose handlers are reachable from its page.
pub trait IpcWindow: Send + Sync + Sized + 'static {
    /// Declare the logical name and handlers. Runs once per type.
    fn declare(decl: &mut Declaration<Self>);
}

/// Collects what an [`IpcWindow`] declares.
pub struct Declaration<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Declaration<T> {
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        window_name::<T>(name);
        self
    }

    /// Register a handler whose page-side name matches the method name.
    pub fn handler<F, Fut>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(Arc<T>, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        main_handler::<T, F, Fut>(name, name, f);
        self
    }

    pub fn handler_for<F, Fut>(&mut self, name: &str, method: &str, f: F) -> &mut Self
    where
        F: Fn(Arc<T>, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        main_handler::<T, F, Fut>(name, method, f);
        self
    }
}

/// Run `T::declare` unless it already ran.
pub fn ensure_declared<T: IpcWindow>() {
    let mut declared = DECLARED.lock().unwrap_or_else(PoisonError::into_inner);
    if !declared.insert(TypeId::of::<T>()) {
        return;
    }
    debug!(window = std::any::type_name::<T>(), "declaring window handlers");
    with_entry::<T, _>(|_| ());
    T::declare(&mut Declaration {
        _marker: PhantomData,
    });
}
