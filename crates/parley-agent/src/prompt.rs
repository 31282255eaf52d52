//! Prompt template: fixed segments plus a slot for the conversation.

use parley_core::{ConversationState, Message};

/// One part of a prompt template.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptSegment {
    /// A fixed system instruction.
    System(String),
    /// Placeholder replaced by the full running message history.
    History,
}

/// Ordered prompt segments rendered before every model call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptTemplate {
    segments: Vec<PromptSegment>,
}

impl PromptTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard agent prompt: a system instruction, then the history.
    pub fn system_with_history(system_prompt: impl Into<String>) -> Self {
        Self::new().system(system_prompt).history()
    }

    /// Appends a system segment.
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.segments.push(PromptSegment::System(content.into()));
        self
    }

    /// Appends the history placeholder.
    pub fn history(mut self) -> Self {
        self.segments.push(PromptSegment::History);
        self
    }

    pub fn segments(&self) -> &[PromptSegment] {
        &self.segments
    }

    /// Renders the template against the current conversation.
    pub fn render(&self, state: &ConversationState) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.segments.len() + state.len());
        for segment in &self.segments {
            match segment {
                PromptSegment::System(content) => messages.push(Message::system(content.as_str())),
                PromptSegment::History => messages.extend(state.messages.iter().cloned()),
            }
        }
        messages
    }
}
