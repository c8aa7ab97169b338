use serde::{Deserialize, Serialize};
use std::fmt;

use crate::goal::UserGoal;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanWeek {
    pub week: u32,
    pub title: String,
    pub tasks: Vec<String>,
    pub focus: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlan {
    pub weeks: Vec<PlanWeek>,
    pub tips: Vec<String>,
}

impl fmt::Display for PlanWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📅 Week {}: {}", self.week, self.title)?;
        writeln!(f, "   Focus: {}", self.focus)?;
        for task in &self.tasks {
            writeln!(f, "   ✓ {task}")?;
        }
        Ok(())
    }
}

impl fmt::Display for StudyPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📚 Study tips")?;
        for tip in &self.tips {
            writeln!(f, "   • {tip}")?;
        }
        for week in &self.weeks {
            write!(f, "{week}")?;
        }
        Ok(())
    }
}

/// Builds the fallback four-week plan. Only the subject name varies.
pub fn generate_plan(goal: &UserGoal) -> StudyPlan {
    let subject = goal.subject();
    StudyPlan {
        weeks: vec![
            week(
                1,
                "Foundational concepts",
                [
                    format!("Review the key terms of {subject}"),
                    "Read chapters 1-2 of the textbook and summarize them".to_string(),
                    "Write a concept summary note".to_string(),
                ],
                "Get a firm grip on the basic concepts and vocabulary",
            ),
            week(
                2,
                "Core theory",
                [
                    "Study the main theories and principles".to_string(),
                    "Practice the worked examples".to_string(),
                    "Find the links between the theories".to_string(),
                ],
                "Organize and understand the core theory systematically",
            ),
            week(
                3,
                "Exam practice",
                [
                    "Analyze past exam question types".to_string(),
                    "Solve similar problems repeatedly".to_string(),
                    "Keep an error log".to_string(),
                ],
                "Sharpen problem solving and get a feel for the real exam",
            ),
            week(
                4,
                "Advanced study",
                [
                    "Take on high-difficulty problems".to_string(),
                    "Read related papers or extra material".to_string(),
                    "Work on a personal project or assignment".to_string(),
                ],
                "Build deeper knowledge and creative thinking",
            ),
        ],
        tips: vec![
            "Studying steadily for 30 minutes every day works best.".to_string(),
            "Review within 24 hours of learning something new.".to_string(),
            "Studying with a group keeps you motivated.".to_string(),
            "Check your progress regularly and adjust the plan.".to_string(),
        ],
    }
}

fn week(number: u32, title: &str, tasks: [String; 3], focus: &str) -> PlanWeek {
    PlanWeek {
        week: number,
        title: title.to_string(),
        tasks: tasks.into(),
        focus: focus.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(subject: &str) -> UserGoal {
        UserGoal::new(subject, "A", "Beginner").unwrap()
    }

    #[test]
    fn plan_has_four_weeks_of_three_tasks_and_four_tips() {
        for subject in ["Biology", "Calculus", "World History", "화학"] {
            let plan = generate_plan(&goal(subject));
            assert_eq!(plan.weeks.len(), 4);
            assert!(plan.weeks.iter().all(|w| w.tasks.len() == 3));
            assert_eq!(plan.tips.len(), 4);
        }
    }

    #[test]
    fn weeks_are_numbered_from_one() {
        let plan = generate_plan(&goal("Physics"));
        let numbers: Vec<u32> = plan.weeks.iter().map(|w| w.week).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn subject_lands_in_first_task() {
        let plan = generate_plan(&goal("Biology"));
        assert!(plan.weeks[0].tasks[0].contains("Biology"));
        assert_eq!(plan.weeks[0].title, "Foundational concepts");
    }

    #[test]
    fn only_first_task_depends_on_subject() {
        let mut a = generate_plan(&goal("Biology"));
        let mut b = generate_plan(&goal("Chemistry"));
        assert_ne!(a, b);
        a.weeks[0].tasks.remove(0);
        b.weeks[0].tasks.remove(0);
        pretty_assertions::assert_eq!(a, b);
    }

    #[test]
    fn display_lists_tips_then_weeks() {
        let text = generate_plan(&goal("Biology")).to_string();
        let tips_at = text.find("Study tips").unwrap();
        let week_at = text.find("Week 1: Foundational concepts").unwrap();
        assert!(tips_at < week_at);
        assert!(text.contains("✓ Review the key terms of Biology"));
    }
}
