//! Conversation-related types.

use ai_builder_model::{ChatId, Message};

/// Holds the transcript of whichever conversation is currently open.
///
/// The transcript is never constructed client-side: every change is a
/// copy of what the backend returned for the active conversation.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct ActiveConversation {
    chat_id: Option<ChatId>,
    messages: Vec<Message>,
}

impl ActiveConversation {
    /// Returns the id of the active conversation, if one is selected.
    #[inline]
    pub fn chat_id(&self) -> Option<&ChatId> {
        self.chat_id.as_ref()
    }

    /// Returns the transcript in chronological order.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Switches to `id` and replaces the whole transcript.
    pub(crate) fn open(&mut self, id: ChatId, messages: Vec<Message>) {
        self.chat_id = Some(id);
        self.messages = messages;
    }

    /// Replaces the transcript of `id`, as long as it is still the active
    /// conversation. Returns whether the transcript was replaced.
    pub(crate) fn refresh(
        &mut self,
        id: &ChatId,
        messages: Vec<Message>,
    ) -> bool {
        if self.chat_id.as_ref() != Some(id) {
            return false;
        }
        self.messages = messages;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_only_applies_to_active_chat() {
        let mut conversation = ActiveConversation::default();
        assert!(!conversation.refresh(&ChatId::new("c1"), vec![]));

        conversation.open(ChatId::new("c1"), vec![Message::user("hi")]);
        assert_eq!(conversation.chat_id(), Some(&ChatId::new("c1")));
        assert!(!conversation.refresh(&ChatId::new("c2"), vec![]));
        assert_eq!(conversation.messages().len(), 1);

        let messages = vec![
            Message::user("hi"),
            Message::assistant().with_text("hello"),
        ];
        assert!(conversation.refresh(&ChatId::new("c1"), messages));
        assert_eq!(conversation.messages().len(), 2);
    }
}
