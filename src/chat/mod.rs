use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnId(pub u64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turn-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Assistant,
}

impl Author {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "AI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub author: Author,
    pub text: String,
    pub is_streaming: bool,
    pub turn: TurnId,
}

/// Append-only chat transcript.
///
/// The one exception to append-only is [`MessageLog::discard_streaming`],
/// which drops the in-flight assistant entry of a turn that failed.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn push_user(&mut self, turn: TurnId, text: impl Into<String>) {
        self.messages.push(Message {
            author: Author::User,
            text: text.into(),
            is_streaming: false,
            turn,
        });
    }

    pub fn begin_assistant(&mut self, turn: TurnId) {
        self.messages.push(Message {
            author: Author::Assistant,
            text: String::new(),
            is_streaming: true,
            turn,
        });
    }

    /// Appends streamed text to the open assistant entry of `turn`.
    /// Returns false when no such entry is open.
    pub fn append_streaming(&mut self, turn: TurnId, delta: &str) -> bool {
        match self.streaming_mut(turn) {
            Some(message) => {
                message.text.push_str(delta);
                true
            }
            None => false,
        }
    }

    /// Closes the open assistant entry of `turn`, optionally replacing its text.
    pub fn finish_streaming(&mut self, turn: TurnId, final_text: Option<String>) -> bool {
        match self.streaming_mut(turn) {
            Some(message) => {
                if let Some(text) = final_text {
                    message.text = text;
                }
                message.is_streaming = false;
                true
            }
            None => false,
        }
    }

    pub fn discard_streaming(&mut self, turn: TurnId) -> Option<Message> {
        let index = self
            .messages
            .iter()
            .rposition(|message| message.turn == turn && message.is_streaming)?;
        Some(self.messages.remove(index))
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn streaming_mut(&mut self, turn: TurnId) -> Option<&mut Message> {
        self.messages
            .iter_mut()
            .rev()
            .find(|message| message.turn == turn && message.is_streaming)
    }
}

#[cfg(test)]
mod tests {
    use super::{Author, MessageLog, TurnId};

    #[test]
    fn streaming_entry_accumulates_and_closes() {
        let mut log = MessageLog::default();
        let turn = TurnId(1);
        log.push_user(turn, "add a header");
        log.begin_assistant(turn);

        assert!(log.append_streaming(turn, "Hel"));
        assert!(log.append_streaming(turn, "lo"));
        assert!(log.finish_streaming(turn, None));

        let last = log.messages().last().expect("assistant entry");
        assert_eq!(last.author, Author::Assistant);
        assert_eq!(last.text, "Hello");
        assert!(!last.is_streaming);
        assert!(!log.append_streaming(turn, "late"));
    }

    #[test]
    fn finish_can_replace_partial_text() {
        let mut log = MessageLog::default();
        let turn = TurnId(3);
        log.begin_assistant(turn);
        log.append_streaming(turn, "par");
        log.finish_streaming(turn, Some("partial no more".to_string()));
        assert_eq!(log.messages()[0].text, "partial no more");
    }

    #[test]
    fn discard_only_removes_open_entry_of_turn() {
        let mut log = MessageLog::default();
        log.push_user(TurnId(1), "first");
        log.begin_assistant(TurnId(1));

        assert!(log.discard_streaming(TurnId(2)).is_none());
        let removed = log.discard_streaming(TurnId(1)).expect("open entry");
        assert_eq!(removed.author, Author::Assistant);
        assert_eq!(log.len(), 1);
        assert!(log.discard_streaming(TurnId(1)).is_none());
    }
}
