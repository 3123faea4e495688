//! Explicit registration of host types and their tagged methods.

use std::{any, fmt, sync::Arc};

use indexmap::IndexMap;

use crate::{
    config::HostDescriptor,
    error::{HarnessError, InvocationError},
    metadata::MethodMetadata,
    value::{Args, Value},
};

type Callable = dyn Fn(Args<'_>) -> Result<Value, InvocationError> + Send + Sync;
type Factory<T> = Arc<dyn Fn() -> anyhow::Result<T> + Send + Sync>;

/// Declared shape of a registered method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Number of parameters the method accepts.
    pub arity: usize,
    /// Display name of the return type.
    pub return_type: String,
}

/// Method entry in a host type's registry.
pub struct RegisteredMethod {
    name: String,
    metadata: Option<MethodMetadata>,
    signature: MethodSignature,
    call: Box<Callable>,
}

impl RegisteredMethod {
    /// Method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execution metadata; `None` for untagged methods.
    #[must_use]
    pub const fn metadata(&self) -> Option<&MethodMetadata> {
        self.metadata.as_ref()
    }

    /// Declared arity and return type.
    #[must_use]
    pub const fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// Builds a fresh host instance and calls the method on it.
    pub(crate) fn call(&self, args: &[Value]) -> Result<Value, InvocationError> {
        (self.call)(Args::new(args))
    }
}

impl fmt::Debug for RegisteredMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredMethod")
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Host type: a named set of methods plus an optional type-level descriptor.
#[derive(Debug)]
pub struct HostType {
    name: String,
    descriptor: Option<HostDescriptor>,
    methods: IndexMap<String, RegisteredMethod>,
}

impl HostType {
    /// Starts registering a host type whose instances come from `factory`.
    #[must_use]
    pub fn builder<T, F>(name: impl Into<String>, factory: F) -> HostTypeBuilder<T>
    where
        T: 'static,
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        HostTypeBuilder {
            host: Self {
                name: name.into(),
                descriptor: None,
                methods: IndexMap::new(),
            },
            factory: Arc::new(factory),
        }
    }

    /// Starts registering a host type built with `T::default()`.
    #[must_use]
    pub fn with_default<T>(name: impl Into<String>) -> HostTypeBuilder<T>
    where
        T: Default + 'static,
    {
        Self::builder(name, || Ok(T::default()))
    }

    /// Host type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type-level descriptor, if declared.
    #[must_use]
    pub const fn descriptor(&self) -> Option<&HostDescriptor> {
        self.descriptor.as_ref()
    }

    /// Replaces the descriptor before a run.
    pub fn set_descriptor(&mut self, descriptor: Option<HostDescriptor>) {
        self.descriptor = descriptor;
    }

    /// All declared methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &RegisteredMethod> {
        self.methods.values()
    }

    /// Methods carrying metadata, in declaration order.
    pub fn tagged_methods(&self) -> impl Iterator<Item = (&RegisteredMethod, &MethodMetadata)> {
        self.methods
            .values()
            .filter_map(|method| method.metadata().map(|metadata| (method, metadata)))
    }

    /// Looks up a method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&RegisteredMethod> {
        self.methods.get(name)
    }
}

/// Builder registering methods against a concrete instance type `T`.
pub struct HostTypeBuilder<T> {
    host: HostType,
    factory: Factory<T>,
}

impl<T: 'static> HostTypeBuilder<T> {
    /// Marks the host as runnable with the given descriptor.
    #[must_use]
    pub fn descriptor(mut self, descriptor: HostDescriptor) -> Self {
        self.host.descriptor = Some(descriptor);
        self
    }

    /// Registers a tagged method. Metadata is validated here.
    pub fn method<R, F>(
        self,
        name: impl Into<String>,
        metadata: MethodMetadata,
        arity: usize,
        body: F,
    ) -> Result<Self, HarnessError>
    where
        R: Into<Value> + 'static,
        F: Fn(&mut T, Args<'_>) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        let name = name.into();
        metadata
            .validate()
            .map_err(|reason| HarnessError::InvalidMetadata {
                method: name.clone(),
                reason,
            })?;
        self.insert::<R, F>(name, Some(metadata), arity, body)
    }

    /// Registers a method without metadata; discovery skips it.
    pub fn untagged<R, F>(
        self,
        name: impl Into<String>,
        arity: usize,
        body: F,
    ) -> Result<Self, HarnessError>
    where
        R: Into<Value> + 'static,
        F: Fn(&mut T, Args<'_>) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        self.insert::<R, F>(name.into(), None, arity, body)
    }

    /// Finishes registration.
    #[must_use]
    pub fn build(self) -> HostType {
        self.host
    }

    fn insert<R, F>(
        mut self,
        name: String,
        metadata: Option<MethodMetadata>,
        arity: usize,
        body: F,
    ) -> Result<Self, HarnessError>
    where
        R: Into<Value> + 'static,
        F: Fn(&mut T, Args<'_>) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        if self.host.methods.contains_key(&name) {
            return Err(HarnessError::DuplicateMethod {
                host: self.host.name.clone(),
                method: name,
            });
        }
        let factory = Arc::clone(&self.factory);
        let call = move |args: Args<'_>| -> Result<Value, InvocationError> {
            let mut instance =
                factory().map_err(|err| InvocationError::Instantiation(format!("{err:#}")))?;
            body(&mut instance, args).map(Into::into).map_err(raised)
        };
        let method = RegisteredMethod {
            name: name.clone(),
            metadata,
            signature: MethodSignature {
                arity,
                return_type: short_type_name(any::type_name::<R>()),
            },
            call: Box::new(call),
        };
        self.host.methods.insert(name, method);
        Ok(self)
    }
}

fn raised(err: anyhow::Error) -> InvocationError {
    match err.downcast::<InvocationError>() {
        Ok(inner) => inner,
        Err(err) => InvocationError::Raised(format!("{err:#}")),
    }
}

/// Strips module paths from a type name: `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`.
fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
        } else {
            out.push_str(segment.rsplit("::").next().unwrap_or_default());
            segment.clear();
            out.push(ch);
        }
    }
    out.push_str(segment.rsplit("::").next().unwrap_or_default());
    out
}

/// Named collection of host types that can be resolved at run time.
#[derive(Debug, Default)]
pub struct HostCatalog {
    hosts: IndexMap<String, HostType>,
}

impl HostCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a host type, replacing any previous host with the same name.
    pub fn register(&mut self, host: HostType) {
        self.hosts.insert(host.name().to_string(), host);
    }

    /// Resolves a host type by name.
    pub fn resolve(&self, name: &str) -> Result<&HostType, HarnessError> {
        self.hosts
            .get(name)
            .ok_or_else(|| HarnessError::HostNotFound(name.to_string()))
    }

    /// Removes and returns a host type so its descriptor can be replaced.
    pub fn take(&mut self, name: &str) -> Result<HostType, HarnessError> {
        self.hosts
            .shift_remove(name)
            .ok_or_else(|| HarnessError::HostNotFound(name.to_string()))
    }

    /// Registered host types in registration order.
    pub fn hosts(&self) -> impl Iterator<Item = &HostType> {
        self.hosts.values()
    }
}
