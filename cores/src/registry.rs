
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;

use crate::context::HandlerContext;
use crate::interaction::Interaction;
use crate::response::InteractionResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// The handler's response is returned as the interaction reply.
    Synchronous,
    /// The reply is a placeholder; the handler runs out of band and its
    /// response becomes a single follow-up edit.
    Deferred { ephemeral: bool },
}

#[async_trait]
pub trait InteractionHandler: Send + Sync {
    fn mode(&self) -> ResponseMode {
        ResponseMode::Synchronous
    }

    async fn handle(&self, interaction: &Interaction, context: &HandlerContext) -> Result<InteractionResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Exact(String),
    Prefix(String),
}

impl Matcher {
    pub fn exact(value: impl Into<String>) -> Self {
        Self::Exact(value.into())
    }

    pub fn prefix(value: impl Into<String>) -> Self {
        Self::Prefix(value.into())
    }
}

#[derive(Default)]
struct RouteTable {
    exact: HashMap<String, Arc<dyn InteractionHandler>>,
    // longest prefix first
    prefixes: Vec<(String, Arc<dyn InteractionHandler>)>,
}

impl RouteTable {
    fn insert(&mut self, matcher: Matcher, handler: Arc<dyn InteractionHandler>) -> Result<()> {
        match matcher {
            Matcher::Exact(key) => {
                if self.exact.contains_key(&key) {
                    bail!("duplicate exact route `{key}`");
                }
                self.exact.insert(key, handler);
            }
            Matcher::Prefix(prefix) => {
                if self.prefixes.iter().any(|(existing, _)| *existing == prefix) {
                    bail!("duplicate prefix route `{prefix}`");
                }
                self.prefixes.push((prefix, handler));
                self.prefixes.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
            }
        }
        Ok(())
    }

    /// Exact match wins, then the longest matching prefix.
    fn lookup(&self, id: &str) -> Option<&Arc<dyn InteractionHandler>> {
        self.exact.get(id).or_else(|| {
            self.prefixes
                .iter()
                .find(|(prefix, _)| id.starts_with(prefix.as_str()))
                .map(|(_, handler)| handler)
        })
    }
}

/// Immutable routing table from command names and custom ids to handlers.
pub struct HandlerRegistry {
    commands: HashMap<String, Arc<dyn InteractionHandler>>,
    components: RouteTable,
    modals: RouteTable,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    pub fn command(&self, name: &str) -> Option<&Arc<dyn InteractionHandler>> {
        self.commands.get(name)
    }

    pub fn component(&self, custom_id: &str) -> Option<&Arc<dyn InteractionHandler>> {
        self.components.lookup(custom_id)
    }

    pub fn modal(&self, custom_id: &str) -> Option<&Arc<dyn InteractionHandler>> {
        self.modals.lookup(custom_id)
    }
}

#[derive(Default)]
pub struct HandlerRegistryBuilder {
    commands: Vec<(String, Arc<dyn InteractionHandler>)>,
    components: Vec<(Matcher, Arc<dyn InteractionHandler>)>,
    modals: Vec<(String, Arc<dyn InteractionHandler>)>,
}

impl HandlerRegistryBuilder {
    pub fn command(mut self, name: impl Into<String>, handler: impl InteractionHandler + 'static) -> Self {
        self.commands.push((name.into(), Arc::new(handler)));
        self
    }

    pub fn component(mut self, matcher: Matcher, handler: impl InteractionHandler + 'static) -> Self {
        self.components.push((matcher, Arc::new(handler)));
        self
    }

    /// Modal submissions are always routed by prefix.
    pub fn modal(mut self, prefix: impl Into<String>, handler: impl InteractionHandler + 'static) -> Self {
        self.modals.push((prefix.into(), Arc::new(handler)));
        self
    }

    pub fn build(self) -> Result<HandlerRegistry> {
        let mut commands = HashMap::new();
        for (name, handler) in self.commands {
            if commands.insert(name.clone(), handler).is_some() {
                bail!("duplicate command `{name}`");
            }
        }
        let mut components = RouteTable::default();
        for (matcher, handler) in self.components {
            components.insert(matcher, handler)?;
        }
        let mut modals = RouteTable::default();
        for (prefix, handler) in self.modals {
            modals.insert(Matcher::Prefix(prefix), handler)?;
        }
        Ok(HandlerRegistry {
            commands,
            components,
            modals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    #[async_trait]
    impl InteractionHandler for Named {
        async fn handle(&self, _interaction: &Interaction, _context: &HandlerContext) -> Result<InteractionResponse> {
            Ok(InteractionResponse::message(self.0))
        }
    }

    fn same(a: &Arc<dyn InteractionHandler>, b: &Arc<dyn InteractionHandler>) -> bool {
        Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
    }

    #[test]
    fn exact_beats_prefix_and_longest_prefix_wins() {
        let registry = HandlerRegistry::builder()
            .component(Matcher::prefix("quiz"), Named("short"))
            .component(Matcher::prefix("quizSelect"), Named("long"))
            .component(Matcher::exact("quizSelectMenu"), Named("exact"))
            .build()
            .unwrap();
        let exact = registry.component("quizSelectMenu").unwrap();
        let long = registry.component("quizSelectOther").unwrap();
        let short = registry.component("quizzes").unwrap();
        assert!(!same(exact, long));
        assert!(!same(long, short));
        assert!(!same(exact, short));
        assert!(same(long, registry.component("quizSelectMenu2").unwrap()));
        assert!(registry.component("unknown").is_none());
    }

    #[test]
    fn lookups_are_deterministic_regardless_of_registration_order() {
        let forward = HandlerRegistry::builder()
            .modal("make", Named("a"))
            .modal("makeQuizModal", Named("b"))
            .build()
            .unwrap();
        let backward = HandlerRegistry::builder()
            .modal("makeQuizModal", Named("b"))
            .modal("make", Named("a"))
            .build()
            .unwrap();
        for registry in [&forward, &backward] {
            let quiz = registry.modal("makeQuizModal|1").unwrap();
            let other = registry.modal("makeOther").unwrap();
            assert!(!same(quiz, other));
            assert!(same(quiz, registry.modal("makeQuizModal").unwrap()));
        }
    }

    #[test]
    fn commands_match_exactly() {
        let registry = HandlerRegistry::builder()
            .command("hello", Named("hello"))
            .build()
            .unwrap();
        assert!(registry.command("hello").is_some());
        assert!(registry.command("hell").is_none());
        assert!(registry.command("hello2").is_none());
    }

    #[test]
    fn duplicate_routes_are_rejected() {
        let result = HandlerRegistry::builder()
            .command("hello", Named("a"))
            .command("hello", Named("b"))
            .build();
        assert!(result.is_err());
        let result = HandlerRegistry::builder()
            .component(Matcher::prefix("x"), Named("a"))
            .component(Matcher::prefix("x"), Named("b"))
            .build();
        assert!(result.is_err());
    }
}
