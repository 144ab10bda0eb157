//! Bounded FIFO window of recent exchanges.

use std::collections::VecDeque;
use tether_core::ChatMessage;

/// One user message and, once the completion succeeded, its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user: ChatMessage,
    pub reply: Option<ChatMessage>,
}

impl Exchange {
    /// Messages in conversation order.
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        std::iter::once(&self.user).chain(self.reply.as_ref())
    }
}

/// The uncompressed part of a session's context.
///
/// Holds at most `capacity` exchanges once a push has returned.
#[derive(Debug, Clone)]
pub struct ContextWindow {
    capacity: usize,
    exchanges: VecDeque<Exchange>,
}

impl ContextWindow {
    /// A `capacity` of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            exchanges: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Open a new exchange for `user`, returning the evicted oldest exchange
    /// if the window went over capacity.
    pub fn push_user(&mut self, user: ChatMessage) -> Option<Exchange> {
        self.exchanges.push_back(Exchange { user, reply: None });
        if self.exchanges.len() > self.capacity {
            self.exchanges.pop_front()
        } else {
            None
        }
    }

    /// Attach `reply` to the newest exchange. Returns false if there is no
    /// open exchange to attach to.
    pub fn set_reply(&mut self, reply: ChatMessage) -> bool {
        match self.exchanges.back_mut() {
            Some(exchange) if exchange.reply.is_none() => {
                exchange.reply = Some(reply);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    /// Number of exchanges held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    /// All held messages, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.exchanges.iter().flat_map(|e| e.messages())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(window: &ContextWindow) -> Vec<&str> {
        window.messages().map(|m| m.content.as_str()).collect()
    }

    #[test]
    fn evicts_oldest_exchange_once_over_capacity() {
        let mut window = ContextWindow::new(2);

        assert!(window.push_user(ChatMessage::user("u1")).is_none());
        assert!(window.set_reply(ChatMessage::assistant("r1")));
        assert!(window.push_user(ChatMessage::user("u2")).is_none());
        assert!(window.set_reply(ChatMessage::assistant("r2")));

        let evicted = window.push_user(ChatMessage::user("u3"));
        let evicted = evicted.map(|e| e.messages().map(|m| m.content.clone()).collect::<Vec<_>>());
        assert_eq!(evicted, Some(vec!["u1".to_string(), "r1".to_string()]));
        assert_eq!(window.len(), 2);
        assert_eq!(contents(&window), ["u2", "r2", "u3"]);
    }

    #[test]
    fn reply_only_attaches_to_open_exchange() {
        let mut window = ContextWindow::new(3);
        assert!(!window.set_reply(ChatMessage::assistant("orphan")));

        window.push_user(ChatMessage::user("u1"));
        assert!(window.set_reply(ChatMessage::assistant("r1")));
        assert!(!window.set_reply(ChatMessage::assistant("duplicate")));
        assert_eq!(contents(&window), ["u1", "r1"]);
    }

    #[test]
    fn unanswered_exchange_keeps_only_user_message() {
        let mut window = ContextWindow::new(3);
        window.push_user(ChatMessage::user("u1"));
        window.push_user(ChatMessage::user("u2"));
        window.set_reply(ChatMessage::assistant("r2"));

        assert_eq!(contents(&window), ["u1", "u2", "r2"]);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut window = ContextWindow::new(0);
        assert_eq!(window.capacity(), 1);
        window.push_user(ChatMessage::user("a"));
        let evicted = window.push_user(ChatMessage::user("b"));
        assert_eq!(evicted.map(|e| e.user.content), Some("a".to_string()));
        assert_eq!(window.len(), 1);
    }
}
