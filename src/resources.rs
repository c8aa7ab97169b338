use serde::{Deserialize, Serialize};
use std::fmt;

use crate::goal::UserGoal;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n   {}\n   Type: {}",
            self.title, self.description, self.kind
        )
    }
}

pub fn generate_resources(goal: &UserGoal) -> Vec<Resource> {
    vec![
        resource(
            "📖 Textbook summary notes",
            format!("Core concepts of {} summarized", goal.subject()),
            "summary",
        ),
        resource(
            "🎯 Exam prep workbook",
            "Practice problems for reaching your target grade".to_string(),
            "problems",
        ),
        resource(
            "📝 Study checklist",
            "Week-by-week progress checklist".to_string(),
            "checklist",
        ),
        resource(
            "💡 Study strategy guide",
            "Effective study methods and time management tips".to_string(),
            "guide",
        ),
    ]
}

fn resource(title: &str, description: String, kind: &str) -> Resource {
    Resource {
        title: title.to_string(),
        description,
        kind: kind.to_string(),
    }
}
