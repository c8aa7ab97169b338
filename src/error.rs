//! Error type shared by the mentor flow, the settings loader and both front ends.

use thiserror::Error;

use crate::flow::View;
use crate::goal::GoalField;

#[derive(Error, Debug)]
pub enum MentorError {
    /// One or more goal fields were left empty.
    #[error("missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<GoalField>),

    /// Plan or resource building blew up.
    #[error("failed to generate study material: {0}")]
    Generation(String),

    /// The reply task died before producing an answer.
    #[error("chat reply failed: {0}")]
    ChatReply(String),

    /// The delayed group search did not produce a group.
    #[error("group search failed: {0}")]
    GroupSearch(String),

    #[error("no study goal has been submitted yet")]
    NoSession,

    #[error("cannot switch from {from} to {to}")]
    InvalidTransition { from: View, to: View },

    /// Dashboard layout did not pass the start-up binding check.
    #[error("dashboard layout is invalid: {0}")]
    ViewBinding(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MentorError {
    /// Text shown to the student in an alert. Internal detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingFields(_) => "Please fill in every field.".to_string(),
            Self::Generation(_) => "Something went wrong. Please try again.".to_string(),
            Self::ChatReply(_) => {
                "Something went wrong while answering. Please try again.".to_string()
            }
            Self::GroupSearch(_) => "Something went wrong while matching a group.".to_string(),
            Self::NoSession => "Set a study goal first.".to_string(),
            other => other.to_string(),
        }
    }
}

fn join_fields(fields: &[GoalField]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, MentorError>;
