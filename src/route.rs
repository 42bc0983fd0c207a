//! Route table: composed handlers stored in a matchit radix tree.
//!
//! Pattern syntax, parameter extraction and precedence all belong to
//! [`matchit`]. This module only keeps, per pattern, the registrations made
//! for it in order, each with its method constraint. A lookup walks that list
//! and takes the first registration that accepts the request method; one
//! without any constraint accepts every method.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::method::Method;

struct RouteEntry {
    pattern: Arc<str>,
    methods: Vec<Method>,
    handler: BoxedHandler,
}

impl RouteEntry {
    fn accepts(&self, method: &str) -> bool {
        self.methods.is_empty() || self.methods.iter().any(|m| m.matches(method))
    }
}

/// A registered route. Returned by [`Router::handle`](crate::Router::handle)
/// so method constraints can be attached after the fact:
///
/// ```rust
/// # use switchyard::{Method, Router, Request, Response};
/// let mut app = Router::new();
/// app.handle("/items", |res: &mut Response, _req: &Request| res.write_str("items"))
///     .methods(&[Method::Get, Method::Head]);
/// ```
pub struct Route<'a> {
    entry: &'a mut RouteEntry,
}

impl Route<'_> {
    /// Restricts the route to `method` (in addition to any methods already set).
    pub fn method(self, method: Method) -> Self {
        if !self.entry.methods.contains(&method) {
            self.entry.methods.push(method);
        }
        self
    }

    pub fn methods(self, methods: &[Method]) -> Self {
        methods.iter().fold(self, |route, &m| route.method(m))
    }

    pub fn pattern(&self) -> &str {
        &self.entry.pattern
    }

    /// The method constraints; empty means any method.
    pub fn allowed_methods(&self) -> &[Method] {
        &self.entry.methods
    }
}

/// What the matcher found for a request, handed to the application hook.
#[derive(Clone, Debug, Default)]
pub struct RouteMatch {
    pattern: Option<Arc<str>>,
    params: HashMap<String, String>,
}

impl RouteMatch {
    /// Metadata for a request no route accepted.
    pub fn unmatched() -> Self {
        Self::default()
    }

    pub fn matched(&self) -> bool {
        self.pattern.is_some()
    }

    /// The pattern of the matched route, as registered.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

#[derive(Default)]
pub(crate) struct RouteTable {
    tree: MatchitRouter<usize>,
    slots: Vec<Vec<RouteEntry>>,
    patterns: HashMap<String, usize>,
}

impl RouteTable {
    pub(crate) fn insert(&mut self, pattern: &str, handler: BoxedHandler) -> Result<Route<'_>, Error> {
        let slot = match self.patterns.get(pattern) {
            Some(&slot) => slot,
            None => {
                let slot = self.slots.len();
                self.tree
                    .insert(pattern, slot)
                    .map_err(|source| Error::InvalidRoute { pattern: pattern.to_owned(), source })?;
                self.patterns.insert(pattern.to_owned(), slot);
                self.slots.push(Vec::new());
                slot
            }
        };

        let entries = &mut self.slots[slot];
        entries.push(RouteEntry { pattern: Arc::from(pattern), methods: Vec::new(), handler });
        let last = entries.len() - 1;
        Ok(Route { entry: &mut entries[last] })
    }

    pub(crate) fn lookup(&self, method: &str, path: &str) -> Option<(BoxedHandler, RouteMatch)> {
        let matched = self.tree.at(path).ok()?;
        let entry = self.slots[*matched.value].iter().find(|e| e.accepts(method))?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((
            Arc::clone(&entry.handler),
            RouteMatch { pattern: Some(Arc::clone(&entry.pattern)), params },
        ))
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }
}
