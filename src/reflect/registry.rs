//! Collaborators the codec consumes but does not own: a registry resolving type
//! names to descriptors, and a resolver mapping host handles to stable paths.

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;

use super::descriptor::TypeRef;
use super::value::HostHandle;

/// Resolves persisted type names to descriptors.
#[cfg_attr(test, mockall::automock)]
pub trait TypeRegistry {
    fn resolve(&self, type_name: &str) -> Option<TypeRef>;
}

/// Maps live host handles to stable name/path strings and back.
#[cfg_attr(test, mockall::automock)]
pub trait HostResolver {
    /// Stable path of a live handle, if the host still knows it.
    fn path_of(&self, handle: HostHandle) -> Option<String>;

    /// Handle currently registered under `path`.
    fn resolve(&self, path: &str) -> Option<HostHandle>;
}

/// Registry backed by a name → descriptor map.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTypeRegistry {
    types: HashMap<String, TypeRef>,
}

impl InMemoryTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its own type name, replacing any previous entry.
    pub fn register(&mut self, ty: TypeRef) -> &mut Self {
        self.types.insert(ty.type_name().to_string(), ty);
        self
    }

    pub fn with_type(mut self, ty: TypeRef) -> Self {
        self.register(ty);
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeRegistry for InMemoryTypeRegistry {
    fn resolve(&self, type_name: &str) -> Option<TypeRef> {
        self.types.get(type_name).map(Arc::clone)
    }
}

/// Resolver that knows no host objects: every lookup is absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHostResolver;

impl HostResolver for NullHostResolver {
    fn path_of(&self, _handle: HostHandle) -> Option<String> {
        None
    }

    fn resolve(&self, _path: &str) -> Option<HostHandle> {
        None
    }
}

/// Bidirectional path ↔ handle table, handing out sequential handles.
#[derive(Debug, Default, Clone)]
pub struct InMemoryHostResolver {
    by_path: HashMap<String, HostHandle>,
    by_handle: HashMap<HostHandle, String>,
    issued: u64,
}

impl InMemoryHostResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object path, returning its (possibly existing) handle.
    pub fn register(&mut self, path: impl Into<String>) -> HostHandle {
        let path = path.into();
        if let Some(handle) = self.by_path.get(&path) {
            return *handle;
        }

        let handle = HostHandle::from(NonZeroU64::MIN.saturating_add(self.issued));
        self.issued += 1;
        self.by_path.insert(path.clone(), handle);
        self.by_handle.insert(handle, path);
        handle
    }

    /// Forget an object; later lookups of its path or handle are absent.
    pub fn unregister(&mut self, handle: HostHandle) -> Option<String> {
        let path = self.by_handle.remove(&handle)?;
        self.by_path.remove(&path);
        Some(path)
    }
}

impl HostResolver for InMemoryHostResolver {
    fn path_of(&self, handle: HostHandle) -> Option<String> {
        self.by_handle.get(&handle).cloned()
    }

    fn resolve(&self, path: &str) -> Option<HostHandle> {
        self.by_path.get(path).copied()
    }
}
