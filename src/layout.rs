use std::fmt;
use tracing::info;

use crate::error::{MentorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Plan,
    Resources,
    Group,
    Chat,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Plan, Panel::Resources, Panel::Group, Panel::Chat];

    pub fn id(self) -> &'static str {
        match self {
            Panel::Plan => "plan",
            Panel::Resources => "resources",
            Panel::Group => "group",
            Panel::Chat => "chat",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Panel::Plan => "Study plan",
            Panel::Resources => "Resources",
            Panel::Group => "Study group",
            Panel::Chat => "Ask your mentor",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(id.trim()))
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Dashboard panels in display order, checked once at start-up so rendering
/// never has to cope with a missing panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardLayout {
    panels: Vec<Panel>,
}

impl DashboardLayout {
    pub fn bind(ids: &[String]) -> Result<Self> {
        let mut panels = Vec::with_capacity(Panel::ALL.len());
        let mut problems = Vec::new();

        for id in ids {
            match Panel::from_id(id) {
                Some(panel) if panels.contains(&panel) => {
                    problems.push(format!("'{id}' is listed twice"));
                }
                Some(panel) => panels.push(panel),
                None => problems.push(format!("unknown panel '{id}'")),
            }
        }
        for panel in Panel::ALL {
            if !panels.contains(&panel) {
                problems.push(format!("panel '{panel}' is missing"));
            }
        }

        if !problems.is_empty() {
            return Err(MentorError::ViewBinding(problems.join("; ")));
        }
        info!(
            order = %panels.iter().map(|p| p.id()).collect::<Vec<_>>().join(","),
            "dashboard layout bound"
        );
        Ok(Self { panels })
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }
}

impl Default for DashboardLayout {
    fn default() -> Self {
        Self {
            panels: Panel::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keeps_configured_order() {
        let layout = DashboardLayout::bind(&ids(&["chat", "Plan", "group", " resources "])).unwrap();
        assert_eq!(
            layout.panels(),
            &[Panel::Chat, Panel::Plan, Panel::Group, Panel::Resources]
        );
    }

    #[test]
    fn reports_every_problem_at_once() {
        let err = DashboardLayout::bind(&ids(&["plan", "plan", "calendar", "chat"])).unwrap_err();
        let MentorError::ViewBinding(detail) = err else {
            panic!("expected a binding error");
        };
        assert!(detail.contains("'plan' is listed twice"));
        assert!(detail.contains("unknown panel 'calendar'"));
        assert!(detail.contains("panel 'resources' is missing"));
        assert!(detail.contains("panel 'group' is missing"));
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(DashboardLayout::bind(&[]).is_err());
    }

    #[test]
    fn default_matches_default_settings() {
        let settings = crate::settings::UiSettings::default();
        assert_eq!(
            DashboardLayout::bind(&settings.dashboard_panels).unwrap(),
            DashboardLayout::default()
        );
    }
}
