//! Simulated assistant: the response strategy and the tasks that deliver it.

use crate::project::FileStore;
use thiserror::Error;

pub mod keyword;
pub mod runner;
pub mod typing;

pub use keyword::KeywordResponder;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponderError {
    #[error("request rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub files: FileStore,
}

/// Produces a reply and the next file set for a user message.
///
/// Implementations must not mutate anything outside the returned value; the
/// caller decides when the new files replace the current ones.
pub trait Responder: Send + Sync {
    fn name(&self) -> &'static str;

    fn respond(&self, message: &str, files: &FileStore) -> Result<Reply, ResponderError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEdit {
    /// Replace the first occurrence of `find`. Leaves the file alone if absent.
    Replace {
        path: &'static str,
        find: &'static str,
        with: String,
    },
    /// Insert before the first occurrence of `anchor`, or append if absent.
    InsertBefore {
        path: &'static str,
        anchor: &'static str,
        text: String,
    },
    /// Insert after the first occurrence of `anchor`, or append if absent.
    InsertAfter {
        path: &'static str,
        anchor: &'static str,
        text: String,
    },
    Append {
        path: &'static str,
        text: String,
    },
}

impl FileEdit {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Replace { path, .. }
            | Self::InsertBefore { path, .. }
            | Self::InsertAfter { path, .. }
            | Self::Append { path, .. } => path,
        }
    }

    pub fn apply(&self, files: &mut FileStore) {
        let current = files.get_or_empty(self.path());
        let updated = match self {
            Self::Replace { find, with, .. } => current.replacen(find, with, 1),
            Self::InsertBefore { anchor, text, .. } => match current.find(anchor) {
                Some(index) => splice(current, index, text),
                None => append(current, text),
            },
            Self::InsertAfter { anchor, text, .. } => match current.find(anchor) {
                Some(index) => splice(current, index + anchor.len(), text),
                None => append(current, text),
            },
            Self::Append { text, .. } => append(current, text),
        };
        files.set(self.path(), updated);
    }
}

fn splice(current: &str, index: usize, text: &str) -> String {
    let mut out = String::with_capacity(current.len() + text.len());
    out.push_str(&current[..index]);
    out.push_str(text);
    out.push_str(&current[index..]);
    out
}

fn append(current: &str, text: &str) -> String {
    if current.is_empty() || current.ends_with('\n') {
        format!("{current}{text}")
    } else {
        format!("{current}\n{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::FileEdit;
    use crate::project::FileStore;

    #[test]
    fn insert_before_anchor_or_append_when_missing() {
        let mut files = FileStore::new();
        files.set("index.html", "<body></body>");
        FileEdit::InsertBefore {
            path: "index.html",
            anchor: "</body>",
            text: "<p>hi</p>".to_string(),
        }
        .apply(&mut files);
        assert_eq!(files.get("index.html"), Ok("<body><p>hi</p></body>"));

        files.set("index.html", "<p>fragment</p>");
        FileEdit::InsertAfter {
            path: "index.html",
            anchor: "<body>",
            text: "<nav></nav>".to_string(),
        }
        .apply(&mut files);
        assert_eq!(files.get("index.html"), Ok("<p>fragment</p>\n<nav></nav>"));
    }

    #[test]
    fn replace_touches_first_match_only() {
        let mut files = FileStore::new();
        files.set("a.txt", "x x");
        FileEdit::Replace {
            path: "a.txt",
            find: "x",
            with: "y".to_string(),
        }
        .apply(&mut files);
        assert_eq!(files.get("a.txt"), Ok("y x"));
    }

    #[test]
    fn append_creates_missing_file() {
        let mut files = FileStore::new();
        FileEdit::Append {
            path: "style.css",
            text: "a{}".to_string(),
        }
        .apply(&mut files);
        assert_eq!(files.get("style.css"), Ok("a{}"));
    }
}
