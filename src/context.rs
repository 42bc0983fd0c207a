//! Per-request context.
//!
//! A [`Context`] is created for each request, passed by `&mut` through every
//! middleware and into the terminal handler, and dropped when dispatch
//! returns. Nothing request-scoped lives anywhere else.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Request-scoped state: matched path parameters plus a string-keyed
/// environment middleware use to hand values downstream.
#[derive(Default)]
pub struct Context {
    params: HashMap<String, String>,
    env: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `ctx.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub(crate) fn extend_params(&mut self, params: HashMap<String, String>) {
        self.params.extend(params);
    }

    /// Stores `value` under `key`, replacing whatever was there.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.env.insert(key.into(), Box::new(value));
    }

    /// Returns the value under `key` if it exists and has type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.env.get(key)?.downcast_ref()
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.env.get_mut(key)?.downcast_mut()
    }

    /// Removes and returns the value under `key` if it has type `T`.
    /// A value of another type is left in place.
    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        if !self.env.get(key)?.is::<T>() {
            return None;
        }
        let boxed = self.env.remove(key)?;
        boxed.downcast().ok().map(|b| *b)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.env.contains_key(key)
    }

    /// Drops all parameters and environment entries.
    pub fn clear(&mut self) {
        self.params.clear();
        self.env.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.env.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("params", &self.params)
            .field("env", &self.env.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_env_access() {
        let mut ctx = Context::new();
        ctx.insert("user", String::from("alice"));
        ctx.insert("attempts", 3_u32);

        assert_eq!(ctx.get::<String>("user").map(String::as_str), Some("alice"));
        assert_eq!(ctx.get::<u64>("attempts"), None);

        *ctx.get_mut::<u32>("attempts").unwrap() += 1;
        assert_eq!(ctx.get::<u32>("attempts"), Some(&4));
    }

    #[test]
    fn remove_respects_type() {
        let mut ctx = Context::new();
        ctx.insert("n", 1_i32);
        assert_eq!(ctx.remove::<String>("n"), None);
        assert!(ctx.contains("n"));
        assert_eq!(ctx.remove::<i32>("n"), Some(1));
        assert!(!ctx.contains("n"));
    }

    #[test]
    fn clear_empties_everything() {
        let mut ctx = Context::new();
        ctx.extend_params(HashMap::from([("id".to_owned(), "7".to_owned())]));
        ctx.insert("k", ());
        assert_eq!(ctx.param("id"), Some("7"));
        ctx.clear();
        assert!(ctx.is_empty());
    }
}
