//! execution context
//!
//! an immutable, type-keyed side channel that travels with a request and its
//! responses. every `with`/`merge` returns a new context; nothing is shared
//! mutably between pipeline stages.

use reqwest::header::HeaderMap;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// which side wins when a request entry and a transport entry share a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextMergePolicy {
    /// transport entries replace request entries of the same type
    #[default]
    TransportWins,
    /// request entries are kept, transport only fills in missing types
    RequestWins,
}

#[derive(Clone)]
struct Entry {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

/// key-value side channel keyed by element type
#[derive(Clone, Default)]
pub struct ExecutionContext {
    entries: Arc<HashMap<TypeId, Entry>>,
}

impl ExecutionContext {
    /// create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// return a copy of this context with `value` added, replacing any
    /// element of the same type
    pub fn with<T: Send + Sync + 'static>(&self, value: T) -> Self {
        let mut entries = (*self.entries).clone();
        entries.insert(
            TypeId::of::<T>(),
            Entry {
                type_name: std::any::type_name::<T>(),
                value: Arc::new(value),
            },
        );
        Self {
            entries: Arc::new(entries),
        }
    }

    /// look up an element by type
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value.downcast_ref::<T>())
    }

    /// true if an element of type `T` is present
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// number of elements
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// true if the context has no elements
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// combine two contexts into a new one
    ///
    /// every key of both sides is present in the result. keys present on
    /// both sides are resolved by `policy`.
    pub fn merge(&self, other: &ExecutionContext, policy: ContextMergePolicy) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }

        let (base, overlay) = match policy {
            ContextMergePolicy::TransportWins => (self, other),
            ContextMergePolicy::RequestWins => (other, self),
        };
        let mut entries = (*base.entries).clone();
        for (key, entry) in overlay.entries.iter() {
            entries.insert(*key, entry.clone());
        }
        Self {
            entries: Arc::new(entries),
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        f.debug_set().entries(names).finish()
    }
}

/// status and headers of the http exchange that produced a response
#[derive(Debug, Clone)]
pub struct HttpResponseInfo {
    pub status: u16,
    pub headers: HeaderMap,
}

/// extra headers for a single request, read by the http transport
#[derive(Debug, Clone, Default)]
pub struct RequestHeaders(pub HeaderMap);
