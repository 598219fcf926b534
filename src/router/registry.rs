//! Task handler registry.
//!
//! Handlers are registered per root domain and owned by the registry for the lifetime of the
//! session. A lookup hands back the same instance every turn, so a handler's own slot-filling
//! progress survives between turns of one task.

use crate::collab::TaskHandler;
use std::collections::HashMap;

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn TaskHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `root_domain`, returning the handler it replaces.
    pub fn register(
        &mut self,
        root_domain: impl Into<String>,
        handler: Box<dyn TaskHandler>,
    ) -> Option<Box<dyn TaskHandler>> {
        self.handlers.insert(root_domain.into(), handler)
    }

    pub fn with(mut self, root_domain: impl Into<String>, handler: impl TaskHandler + 'static) -> Self {
        self.register(root_domain, Box::new(handler));
        self
    }

    pub fn remove(&mut self, root_domain: &str) -> Option<Box<dyn TaskHandler>> {
        self.handlers.remove(root_domain)
    }

    pub fn contains(&self, root_domain: &str) -> bool {
        self.handlers.contains_key(root_domain)
    }

    /// `None` when no handler implements tasks for `root_domain`.
    pub fn lookup(&mut self, root_domain: &str) -> Option<&mut (dyn TaskHandler + 'static)> {
        self.handlers.get_mut(root_domain).map(|h| h.as_mut())
    }

    pub fn domains(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry").field("domains", &self.domains()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{NextQuery, TaskReply};
    use std::io::{self, Write};

    #[derive(Default)]
    struct Counter {
        calls: usize,
    }

    impl TaskHandler for Counter {
        fn respond(&mut self, _utterance: &str, _domain: &str, _target: Option<&str>) -> TaskReply {
            self.calls += 1;
            TaskReply::answer(format!("call {}", self.calls))
        }

        fn next_query(&self) -> NextQuery {
            NextQuery::default()
        }

        fn trace(&self, _sink: &mut dyn Write) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn lookup_misses_unregistered_domain() {
        let mut registry = HandlerRegistry::new().with("travel", Counter::default());
        assert!(registry.lookup("weather").is_none());
        assert!(registry.contains("travel"));
    }

    #[test]
    fn lookup_reuses_the_same_instance() {
        let mut registry = HandlerRegistry::new().with("travel", Counter::default());

        let first = registry.lookup("travel").unwrap().respond("a", "flight", None);
        let second = registry.lookup("travel").unwrap().respond("b", "flight", None);

        assert_eq!(first.response.as_deref(), Some("call 1"));
        assert_eq!(second.response.as_deref(), Some("call 2"));
    }

    #[test]
    fn register_returns_replaced_handler() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.register("travel", Box::new(Counter::default())).is_none());
        assert!(registry.register("travel", Box::new(Counter::default())).is_some());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.domains(), vec!["travel"]);
    }
}
