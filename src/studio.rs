//! Single owner of the builder's state: files, transcript, selection and the
//! turn currently in flight. The egui app renders from it and forwards every
//! callback and background event to it.

use crate::assistant::Reply;
use crate::chat::{MessageLog, TurnId};
use crate::project::{FileStore, StoreError, INDEX_HTML};
use thiserror::Error;
use tracing::{debug, warn};

pub const GREETING: &str = "Hello! Describe what you'd like me to build or change.";
pub const PROCESSING_FAILED: &str = "There was an error processing your request.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please enter a message before sending.")]
    Empty,
    #[error("Still working on your previous request.")]
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("event for {0} does not match the turn in flight")]
    Stale(TurnId),
    #[error("{0} received streamed text before its reply was ready")]
    Malformed(TurnId),
}

/// File changes are refused while a reply is pending; the reply replaces the
/// whole file set with one derived from the submit-time snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("Files are locked while the AI is working on your request.")]
    Locked,
    #[error("no file is selected")]
    NoSelection,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Awaiting,
    Typing { full_text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingTurn {
    turn: TurnId,
    phase: Phase,
}

/// What the caller needs to schedule the simulated request for a new turn.
#[derive(Debug, Clone)]
pub struct Submission {
    pub turn: TurnId,
    pub message: String,
    pub files: FileStore,
    /// Turn whose typing animation was cut short by this submission.
    pub interrupted: Option<TurnId>,
}

#[derive(Debug)]
pub struct Studio {
    files: FileStore,
    selected: String,
    log: MessageLog,
    pending: Option<PendingTurn>,
    next_turn: u64,
    revision: u64,
    notices: Vec<Notice>,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new(FileStore::starter())
    }
}

impl Studio {
    pub fn new(files: FileStore) -> Self {
        let selected = if files.contains(INDEX_HTML) {
            INDEX_HTML.to_string()
        } else {
            files.list().first().map(|path| path.to_string()).unwrap_or_default()
        };
        Self {
            files,
            selected,
            log: MessageLog::default(),
            pending: None,
            next_turn: 1,
            revision: 1,
            notices: Vec::new(),
        }
    }

    pub fn files(&self) -> &FileStore {
        &self.files
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn selected_path(&self) -> &str {
        &self.selected
    }

    pub fn selected_content(&self) -> &str {
        self.files.get_or_empty(&self.selected)
    }

    /// Bumped on every change to the file store.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True while a request is waiting for its reply.
    pub fn is_processing(&self) -> bool {
        matches!(
            self.pending,
            Some(PendingTurn {
                phase: Phase::Awaiting,
                ..
            })
        )
    }

    pub fn is_typing(&self) -> bool {
        matches!(
            self.pending,
            Some(PendingTurn {
                phase: Phase::Typing { .. },
                ..
            })
        )
    }

    pub fn pending_turn(&self) -> Option<TurnId> {
        self.pending.as_ref().map(|pending| pending.turn)
    }

    pub fn submit(&mut self, input: &str) -> Result<Submission, SubmitError> {
        let message = input.trim();
        if message.is_empty() {
            self.notify(NoticeLevel::Error, "Empty Message", SubmitError::Empty.to_string());
            return Err(SubmitError::Empty);
        }
        if self.is_processing() {
            self.notify(NoticeLevel::Info, "Busy", SubmitError::Busy.to_string());
            return Err(SubmitError::Busy);
        }

        let interrupted = self.flush_typing();

        let turn = TurnId(self.next_turn);
        self.next_turn += 1;
        self.log.push_user(turn, message);
        self.log.begin_assistant(turn);
        self.pending = Some(PendingTurn {
            turn,
            phase: Phase::Awaiting,
        });
        debug!(%turn, "turn submitted");

        Ok(Submission {
            turn,
            message: message.to_string(),
            files: self.files.clone(),
            interrupted,
        })
    }

    /// Applies a reply's files and returns the text to type out.
    pub fn resolve(&mut self, turn: TurnId, reply: Reply) -> Result<String, TurnError> {
        match &mut self.pending {
            Some(pending) if pending.turn == turn && pending.phase == Phase::Awaiting => {
                pending.phase = Phase::Typing {
                    full_text: reply.text.clone(),
                };
            }
            _ => return Err(TurnError::Stale(turn)),
        }

        if reply.files != self.files {
            self.files = reply.files;
            self.bump_revision();
        }
        if !self.files.contains(&self.selected) {
            self.selected = self.files.list().first().map(|p| p.to_string()).unwrap_or_default();
        }
        Ok(reply.text)
    }

    pub fn stream_delta(&mut self, turn: TurnId, text: &str) -> Result<(), TurnError> {
        let typing = match &self.pending {
            Some(pending) if pending.turn == turn => {
                matches!(pending.phase, Phase::Typing { .. })
            }
            _ => return Err(TurnError::Stale(turn)),
        };

        if typing {
            self.log.append_streaming(turn, text);
            Ok(())
        } else {
            Err(self.discard_malformed(turn))
        }
    }

    pub fn stream_end(&mut self, turn: TurnId) -> Result<(), TurnError> {
        match self.pending.take() {
            Some(PendingTurn {
                turn: pending,
                phase: Phase::Typing { full_text },
            }) if pending == turn => {
                self.log.finish_streaming(turn, Some(full_text));
                Ok(())
            }
            Some(PendingTurn {
                turn: pending,
                phase: Phase::Awaiting,
            }) if pending == turn => {
                self.pending = Some(PendingTurn {
                    turn,
                    phase: Phase::Awaiting,
                });
                Err(self.discard_malformed(turn))
            }
            other => {
                self.pending = other;
                Err(TurnError::Stale(turn))
            }
        }
    }

    /// Drops the in-flight reply of `turn` and tells the user it failed.
    pub fn fail(&mut self, turn: TurnId, reason: &str) -> Result<(), TurnError> {
        if self.pending_turn() != Some(turn) {
            return Err(TurnError::Stale(turn));
        }
        self.pending = None;
        self.log.discard_streaming(turn);
        warn!(%turn, reason, "turn failed");
        self.notify(NoticeLevel::Error, "Error", PROCESSING_FAILED);
        Ok(())
    }

    pub fn select_file(&mut self, path: &str) -> Result<(), StoreError> {
        self.files.get(path)?;
        self.selected = path.to_string();
        Ok(())
    }

    /// Replaces the content of the selected file only.
    pub fn edit_selected(&mut self, content: impl Into<String>) -> Result<(), EditError> {
        self.ensure_unlocked()?;
        if self.selected.is_empty() {
            return Err(EditError::NoSelection);
        }
        self.files.set(self.selected.clone(), content);
        self.bump_revision();
        Ok(())
    }

    pub fn create_file(&mut self, raw_path: &str) -> Result<String, EditError> {
        self.ensure_unlocked()?;
        let path = self.files.create(raw_path)?;
        self.selected = path.clone();
        self.bump_revision();
        Ok(path)
    }

    pub fn notify(&mut self, level: NoticeLevel, title: impl Into<String>, body: impl Into<String>) {
        self.notices.push(Notice {
            level,
            title: title.into(),
            body: body.into(),
        });
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn flush_typing(&mut self) -> Option<TurnId> {
        if !self.is_typing() {
            return None;
        }
        match self.pending.take() {
            Some(PendingTurn {
                turn,
                phase: Phase::Typing { full_text },
            }) => {
                self.log.finish_streaming(turn, Some(full_text));
                debug!(%turn, "typing flushed by new message");
                Some(turn)
            }
            other => {
                self.pending = other;
                None
            }
        }
    }

    fn discard_malformed(&mut self, turn: TurnId) -> TurnError {
        warn!(%turn, "discarding malformed in-flight message");
        self.pending = None;
        self.log.discard_streaming(turn);
        self.notify(NoticeLevel::Error, "Error", PROCESSING_FAILED);
        TurnError::Malformed(turn)
    }

    fn ensure_unlocked(&self) -> Result<(), EditError> {
        if self.is_processing() {
            debug!(turn = ?self.pending_turn(), "file change refused while awaiting reply");
            return Err(EditError::Locked);
        }
        Ok(())
    }

    fn bump_revision(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::{KeywordResponder, Responder};
    use crate::chat::Author;
    use crate::project::{SCRIPT_JS, STYLE_CSS};

    fn complete_turn(studio: &mut Studio, message: &str) -> TurnId {
        let submission = studio.submit(message).expect("submit");
        let reply = KeywordResponder
            .respond(&submission.message, &submission.files)
            .expect("reply");
        let text = studio.resolve(submission.turn, reply).expect("resolve");
        for ch in text.chars() {
            studio
                .stream_delta(submission.turn, &ch.to_string())
                .expect("delta");
        }
        studio.stream_end(submission.turn).expect("end");
        submission.turn
    }

    #[test]
    fn log_holds_two_entries_per_send_in_order() {
        let mut studio = Studio::default();
        let prompts = ["add a header", "change the colour", "anything else", "gallery"];
        for prompt in prompts {
            complete_turn(&mut studio, prompt);
        }

        let messages = studio.log().messages();
        assert_eq!(messages.len(), prompts.len() * 2);
        for (index, prompt) in prompts.iter().enumerate() {
            assert_eq!(messages[index * 2].author, Author::User);
            assert_eq!(messages[index * 2].text, *prompt);
            assert_eq!(messages[index * 2 + 1].author, Author::Assistant);
            assert!(!messages[index * 2 + 1].is_streaming);
            assert!(!messages[index * 2 + 1].text.is_empty());
        }
    }

    #[test]
    fn empty_message_is_rejected_with_notice() {
        let mut studio = Studio::default();
        assert_eq!(studio.submit("   \n").unwrap_err(), SubmitError::Empty);
        assert!(studio.log().is_empty());
        let notices = studio.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Empty Message");
        assert!(studio.take_notices().is_empty());
    }

    #[test]
    fn second_submit_while_awaiting_is_busy() {
        let mut studio = Studio::default();
        studio.submit("first").expect("submit");
        assert!(studio.is_processing());
        assert_eq!(studio.submit("second").unwrap_err(), SubmitError::Busy);
        assert_eq!(studio.log().len(), 2);
    }

    #[test]
    fn resolve_applies_files_and_bumps_revision() {
        let mut studio = Studio::default();
        let before = studio.revision();
        complete_turn(&mut studio, "add a gallery");
        assert!(studio.revision() > before);
        assert!(studio
            .files()
            .get(INDEX_HTML)
            .expect("index")
            .contains("id=\"gallery\""));
    }

    #[test]
    fn new_message_while_typing_completes_previous_reply() {
        let mut studio = Studio::default();
        let first = studio.submit("add a header").expect("submit");
        let reply = KeywordResponder
            .respond(&first.message, &first.files)
            .expect("reply");
        let full = studio.resolve(first.turn, reply).expect("resolve");
        studio.stream_delta(first.turn, "I'v").expect("delta");

        let second = studio.submit("now a gallery").expect("typing should not block");
        assert_eq!(second.interrupted, Some(first.turn));
        assert_eq!(studio.log().messages()[1].text, full);
        assert!(!studio.log().messages()[1].is_streaming);
        assert_eq!(studio.stream_end(first.turn), Err(TurnError::Stale(first.turn)));
        assert_eq!(studio.log().len(), 4);
    }

    #[test]
    fn failure_removes_in_flight_entry_and_notifies() {
        let mut studio = Studio::default();
        let submission = studio.submit("make it pop").expect("submit");
        studio.fail(submission.turn, "rejected").expect("fail");

        assert_eq!(studio.log().len(), 1);
        assert!(!studio.is_processing());
        let notices = studio.take_notices();
        assert_eq!(notices[0].body, PROCESSING_FAILED);
        assert_eq!(notices[0].level, NoticeLevel::Error);
    }

    #[test]
    fn delta_before_reply_discards_pending_entry() {
        let mut studio = Studio::default();
        let submission = studio.submit("hello").expect("submit");
        assert_eq!(
            studio.stream_delta(submission.turn, "x"),
            Err(TurnError::Malformed(submission.turn))
        );
        assert_eq!(studio.log().len(), 1);
        assert!(studio.pending_turn().is_none());
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut studio = Studio::default();
        let turn = complete_turn(&mut studio, "header");
        let snapshot = studio.log().messages().to_vec();

        assert_eq!(studio.stream_delta(turn, "late"), Err(TurnError::Stale(turn)));
        assert_eq!(studio.stream_end(turn), Err(TurnError::Stale(turn)));
        assert_eq!(studio.fail(turn, "late"), Err(TurnError::Stale(turn)));
        let reply = Reply {
            text: String::new(),
            files: FileStore::new(),
        };
        assert_eq!(studio.resolve(turn, reply), Err(TurnError::Stale(turn)));
        assert_eq!(studio.log().messages(), snapshot.as_slice());
    }

    #[test]
    fn editing_selected_file_leaves_others_untouched() {
        let mut studio = Studio::default();
        let before = studio.files().clone();
        studio.select_file(STYLE_CSS).expect("select");
        studio.edit_selected("h1 { color: red; }").expect("edit");

        assert_eq!(studio.files().get(STYLE_CSS), Ok("h1 { color: red; }"));
        assert_eq!(studio.files().get(INDEX_HTML), before.get(INDEX_HTML));
        assert_eq!(studio.files().get(SCRIPT_JS), before.get(SCRIPT_JS));
        assert_eq!(studio.files().list(), before.list());
    }

    #[test]
    fn selecting_unknown_file_keeps_selection() {
        let mut studio = Studio::default();
        assert!(studio.select_file("missing.html").is_err());
        assert_eq!(studio.selected_path(), INDEX_HTML);
    }

    #[test]
    fn created_file_becomes_selected() {
        let mut studio = Studio::default();
        let path = studio.create_file("pages/about.html").expect("create");
        assert_eq!(studio.selected_path(), path);
        assert_eq!(studio.selected_content(), "");
        assert_eq!(studio.files().len(), 4);
    }

    #[test]
    fn file_changes_are_refused_while_awaiting_reply() {
        let mut studio = Studio::default();
        let submission = studio.submit("add a gallery").expect("submit");
        let revision = studio.revision();

        assert_eq!(studio.create_file("pages/about.html"), Err(EditError::Locked));
        assert_eq!(studio.edit_selected("<p>mine</p>"), Err(EditError::Locked));
        assert_eq!(studio.revision(), revision);
        assert_eq!(studio.files().list(), vec![INDEX_HTML, STYLE_CSS, SCRIPT_JS]);

        let reply = KeywordResponder
            .respond(&submission.message, &submission.files)
            .expect("reply");
        studio.resolve(submission.turn, reply).expect("resolve");
        assert!(!studio.is_processing());

        let path = studio.create_file("pages/about.html").expect("unlocked while typing");
        studio.edit_selected("<p>about</p>").expect("edit");
        assert_eq!(studio.files().get(&path), Ok("<p>about</p>"));
        assert!(studio
            .files()
            .get(INDEX_HTML)
            .expect("index")
            .contains("id=\"gallery\""));
    }

    #[test]
    fn changes_made_after_a_failed_turn_survive() {
        let mut studio = Studio::default();
        let submission = studio.submit("make it pop").expect("submit");
        studio.fail(submission.turn, "rejected").expect("fail");

        studio.create_file("notes.txt").expect("create");
        studio.edit_selected("keep me").expect("edit");
        assert_eq!(studio.files().get("notes.txt"), Ok("keep me"));
    }
}
