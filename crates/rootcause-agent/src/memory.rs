//! Conversation memory — the append-only turn list the model sees.

use rootcause_core::types::{ConversationTurn, Role};
use tracing::debug;

/// Store for the conversation history.
///
/// The agent only appends and reads; past turns are never rewritten.
pub trait ConversationMemory: Send {
    /// Append a turn.
    fn push(&mut self, role: Role, content: &str);

    /// The full history, oldest first.
    fn get(&self) -> Vec<ConversationTurn>;
}

/// In-process memory, optionally seeded with a system prompt.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    system_prompt: Option<String>,
    turns: Vec<ConversationTurn>,
}

impl Memory {
    pub fn new(system_prompt: Option<String>) -> Self {
        let mut memory = Self {
            system_prompt,
            turns: Vec::new(),
        };
        memory.seed();
        memory
    }

    fn seed(&mut self) {
        if let Some(prompt) = self.system_prompt.as_deref().filter(|p| !p.is_empty()) {
            self.turns.push(ConversationTurn::system(prompt));
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop every turn except the system prompt.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.seed();
    }

    /// Borrow the turns without cloning.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }
}

impl ConversationMemory for Memory {
    fn push(&mut self, role: Role, content: &str) {
        debug!(role = %role, chars = content.len(), "memory push");
        self.turns.push(ConversationTurn::new(role, content));
    }

    fn get(&self) -> Vec<ConversationTurn> {
        self.turns.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_memory() {
        let memory = Memory::new(None);
        assert!(memory.is_empty());
        assert!(memory.get().is_empty());
    }

    #[test]
    fn test_system_prompt_first() {
        let mut memory = Memory::new(Some("You are an RCA agent.".into()));
        memory.push(Role::User, "why is checkout slow?");
        let history = memory.get();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], ConversationTurn::system("You are an RCA agent."));
        assert_eq!(history[1].role, Role::User);
    }

    #[test]
    fn test_blank_system_prompt_skipped() {
        assert!(Memory::new(Some(String::new())).is_empty());
    }

    #[test]
    fn test_append_order_and_clear() {
        let mut memory = Memory::new(Some("sys".into()));
        memory.push(Role::User, "q");
        memory.push(Role::Assistant, "a");
        let roles: Vec<Role> = memory.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);

        memory.clear();
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.get()[0].role, Role::System);
    }
}
