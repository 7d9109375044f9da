//! The user's conversation list.

use ai_builder_model::{ChatId, Conversation};

/// Holds the ordered list of known conversations for the current user.
///
/// The list is only ever replaced wholesale by a successful listing; a
/// failed listing keeps whatever was there before.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct ChatDirectory {
    chats: Vec<Conversation>,
}

impl ChatDirectory {
    /// Returns the conversations in server order.
    #[inline]
    pub fn chats(&self) -> &[Conversation] {
        &self.chats
    }

    /// Looks up a conversation by id.
    #[inline]
    pub fn get(&self, id: &ChatId) -> Option<&Conversation> {
        self.chats.iter().find(|c| &c.id == id)
    }

    /// Returns the number of known conversations.
    #[inline]
    pub fn len(&self) -> usize {
        self.chats.len()
    }

    /// Returns `true` if no conversation is known.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    pub(crate) fn replace(&mut self, chats: Vec<Conversation>) {
        self.chats = chats;
    }
}
