use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::task::TaskId;

pub type CommentId = i64;

pub const DEFAULT_AUTHOR: &str = "Utilisateur";
pub const DEFAULT_EMAIL: &str = "user@example.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Input for creating a comment; author and email fall back to
/// [`DEFAULT_AUTHOR`] and [`DEFAULT_EMAIL`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub content: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewComment {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author: None,
            email: None,
        }
    }

    pub fn effective_author(&self) -> &str {
        self.author
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_AUTHOR)
    }

    pub fn effective_email(&self) -> &str {
        self.email
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_EMAIL)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPatch {
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_author_and_email() {
        let comment = NewComment::new("Looks good");
        assert_eq!(comment.effective_author(), "Utilisateur");
        assert_eq!(comment.effective_email(), "user@example.com");

        let named = NewComment {
            author: Some("Ada".to_string()),
            email: Some(String::new()),
            ..NewComment::new("Ship it")
        };
        assert_eq!(named.effective_author(), "Ada");
        assert_eq!(named.effective_email(), "user@example.com");
    }
}
