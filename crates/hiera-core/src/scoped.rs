//! A resolver view with a fixed context

use crate::context::Context;
use crate::resolver::{LookupOptions, Resolver};
use crate::Result;
use serde_json::Value;
use std::ops::Deref;

/// Applies a fixed context to every lookup of the underlying [`Resolver`].
///
/// The scope sits between the resolver's base context and the per-call
/// context. Everything other than lookups reaches the resolver through
/// `Deref`.
#[derive(Debug, Clone)]
pub struct ScopedResolver<'a> {
    resolver: &'a Resolver,
    context: Context,
}

impl<'a> ScopedResolver<'a> {
    pub fn new(resolver: &'a Resolver, context: Context) -> Self {
        Self { resolver, context }
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        self.get_with(key, &LookupOptions::default())
    }

    pub fn get_with(&self, key: &str, options: &LookupOptions) -> Result<Option<Value>> {
        self.resolver.lookup(key, &self.scope(), options)
    }

    /// Dotted-path lookup under this scope. See [`Resolver::get_nested`].
    pub fn get_nested(&self, path: &str) -> Result<Option<Value>> {
        self.resolver.nested_in(path, &self.scope())
    }

    /// Whether `key` is found; `context` wins over the scope.
    pub fn has(&self, key: &str, context: &Context) -> Result<bool> {
        self.resolver.has_in(key, &self.scope(), context)
    }

    /// A narrower view: `context` applied on top of this scope.
    pub fn scoped(&self, context: Context) -> ScopedResolver<'a> {
        ScopedResolver::new(self.resolver, self.context.merged(&context))
    }

    /// The fixed context of this view.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn resolver(&self) -> &'a Resolver {
        self.resolver
    }

    fn scope(&self) -> Context {
        self.resolver.context().merged(&self.context)
    }
}

impl Deref for ScopedResolver<'_> {
    type Target = Resolver;

    fn deref(&self) -> &Resolver {
        self.resolver
    }
}
