use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MentorError, Result};

pub const LEVEL_OPTIONS: [&str; 3] = ["Beginner", "Intermediate", "Advanced"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalField {
    Subject,
    TargetGrade,
    CurrentLevel,
}

impl fmt::Display for GoalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GoalField::Subject => "subject",
            GoalField::TargetGrade => "target grade",
            GoalField::CurrentLevel => "current level",
        };
        f.write_str(name)
    }
}

/// Matches a typed level against [`LEVEL_OPTIONS`], ignoring case and padding.
pub fn parse_level(input: &str) -> Option<&'static str> {
    let input = input.trim();
    LEVEL_OPTIONS
        .into_iter()
        .find(|level| level.eq_ignore_ascii_case(input))
}

/// Raw onboarding form buffer, edited in place by the front ends.
#[derive(Debug, Clone, Default)]
pub struct GoalForm {
    pub subject: String,
    pub target_grade: String,
    pub current_level: String,
}

impl GoalForm {
    pub fn new(
        subject: impl Into<String>,
        target_grade: impl Into<String>,
        current_level: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            target_grade: target_grade.into(),
            current_level: current_level.into(),
        }
    }

    pub fn missing_fields(&self) -> Vec<GoalField> {
        let mut missing = Vec::new();
        if self.subject.trim().is_empty() {
            missing.push(GoalField::Subject);
        }
        if self.target_grade.trim().is_empty() {
            missing.push(GoalField::TargetGrade);
        }
        if self.current_level.trim().is_empty() {
            missing.push(GoalField::CurrentLevel);
        }
        missing
    }
}

/// A validated study goal. Every field is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGoal {
    subject: String,
    target_grade: String,
    current_level: String,
}

impl UserGoal {
    #[cfg(test)]
    pub fn new(
        subject: impl Into<String>,
        target_grade: impl Into<String>,
        current_level: impl Into<String>,
    ) -> Result<Self> {
        Self::try_from(&GoalForm::new(subject, target_grade, current_level))
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn target_grade(&self) -> &str {
        &self.target_grade
    }

    pub fn current_level(&self) -> &str {
        &self.current_level
    }
}

impl TryFrom<&GoalForm> for UserGoal {
    type Error = MentorError;

    fn try_from(form: &GoalForm) -> Result<Self> {
        let missing = form.missing_fields();
        if !missing.is_empty() {
            return Err(MentorError::MissingFields(missing));
        }
        Ok(Self {
            subject: form.subject.trim().to_string(),
            target_grade: form.target_grade.trim().to_string(),
            current_level: form.current_level.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_keeps_values() {
        let goal = UserGoal::new("  Biology ", "A", "Beginner").unwrap();
        assert_eq!(goal.subject(), "Biology");
        assert_eq!(goal.target_grade(), "A");
        assert_eq!(goal.current_level(), "Beginner");
    }

    #[test]
    fn whitespace_only_counts_as_empty() {
        let err = UserGoal::new("Biology", "   ", "").unwrap_err();
        match err {
            MentorError::MissingFields(fields) => {
                assert_eq!(fields, vec![GoalField::TargetGrade, GoalField::CurrentLevel]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn level_must_be_one_of_the_options() {
        assert_eq!(parse_level(" intermediate "), Some("Intermediate"));
        assert_eq!(parse_level("ADVANCED"), Some("Advanced"));
        assert_eq!(parse_level("expert"), None);
        assert_eq!(parse_level(""), None);
    }

    #[test]
    fn empty_form_reports_all_three() {
        assert_eq!(GoalForm::default().missing_fields().len(), 3);
    }
}
