//! Onboarding/dashboard state machine and the session it guards.
//!
//! The controller is owned by the front end (egui app or console loop) for the
//! lifetime of the process. Results of delayed work come back as
//! [`MentorEvent`]s and are folded in through [`ViewController::apply`].

use std::any::Any;
use std::fmt;
use std::panic::{self, UnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::chat::{Sender, Transcript};
use crate::error::{MentorError, Result};
use crate::goal::{GoalForm, UserGoal};
use crate::group::GroupRecord;
use crate::plan::{generate_plan, StudyPlan};
use crate::resources::{generate_resources, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Onboarding,
    Dashboard,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Onboarding => f.write_str("onboarding"),
            View::Dashboard => f.write_str("dashboard"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub goal: UserGoal,
    pub plan: StudyPlan,
    pub resources: Vec<Resource>,
    pub group: Option<GroupRecord>,
}

pub fn build_session(goal: &UserGoal) -> SessionState {
    SessionState {
        goal: goal.clone(),
        plan: generate_plan(goal),
        resources: generate_resources(goal),
        group: None,
    }
}

/// Shared in-flight counter behind the loading overlay.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicUsize>);

impl LoadingFlag {
    /// Marks work as started. The indicator stays up until the guard drops.
    pub fn begin(&self) -> LoadingGuard {
        self.0.fetch_add(1, Ordering::SeqCst);
        debug!("loading started");
        LoadingGuard(Arc::clone(&self.0))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst) > 0
    }
}

#[derive(Debug)]
pub struct LoadingGuard(Arc<AtomicUsize>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
        debug!("loading finished");
    }
}

/// Result of delayed work, delivered back to the UI thread.
#[derive(Debug)]
pub enum MentorEvent {
    BotReply(Result<String>),
    GroupMatched(Result<GroupRecord>),
}

/// What applying an event changed, for front ends that print rather than redraw.
#[derive(Debug)]
pub enum Outcome {
    BotReplied(String),
    GroupMatched(GroupRecord),
    Failed(MentorError),
}

#[derive(Debug, Default)]
pub struct ViewController {
    view: View,
    session: Option<SessionState>,
    transcript: Transcript,
    loading: LoadingFlag,
    alert: Option<Alert>,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_active()
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn take_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }

    pub fn raise_alert(&mut self, kind: AlertKind, message: impl Into<String>) {
        let message = message.into();
        debug!(?kind, text = %message, "alert raised");
        self.alert = Some(Alert { kind, message });
    }

    /// Validates the form, builds plan and resources, then moves to the dashboard.
    pub fn submit_goal(&mut self, form: &GoalForm) -> Result<()> {
        self.submit_goal_with(form, build_session)
    }

    pub(crate) fn submit_goal_with<F>(&mut self, form: &GoalForm, build: F) -> Result<()>
    where
        F: FnOnce(&UserGoal) -> SessionState + UnwindSafe,
    {
        info!("goal form submitted");
        let goal = match UserGoal::try_from(form) {
            Ok(goal) => goal,
            Err(err) => {
                warn!(%err, "goal rejected");
                self.raise_alert(AlertKind::Error, err.user_message());
                return Err(err);
            }
        };

        let _loading = self.loading.begin();
        let built = panic::catch_unwind(|| build(&goal));
        let session = match built {
            Ok(session) => session,
            Err(payload) => {
                let err = MentorError::Generation(panic_message(payload.as_ref()));
                error!(%err, "study material generation failed");
                self.raise_alert(AlertKind::Error, err.user_message());
                return Err(err);
            }
        };

        info!(
            subject = goal.subject(),
            target_grade = goal.target_grade(),
            current_level = goal.current_level(),
            weeks = session.plan.weeks.len(),
            resources = session.resources.len(),
            "study plan ready"
        );
        self.session = Some(session);
        self.switch_view(View::Dashboard)
    }

    /// Onboarding -> dashboard is the only transition.
    pub fn switch_view(&mut self, target: View) -> Result<()> {
        match (self.view, target) {
            (current, target) if current == target => Ok(()),
            (View::Onboarding, View::Dashboard) => {
                if self.session.is_none() {
                    return Err(MentorError::NoSession);
                }
                self.view = View::Dashboard;
                info!("switched to dashboard");
                Ok(())
            }
            (from, to) => Err(MentorError::InvalidTransition { from, to }),
        }
    }

    /// Appends a user chat line. Returns the trimmed text, or `None` if it was blank.
    pub fn push_user_message(&mut self, raw: &str) -> Option<String> {
        let message = raw.trim();
        if message.is_empty() {
            return None;
        }
        self.transcript.push(Sender::User, message);
        debug!(chars = message.chars().count(), "user message added");
        Some(message.to_string())
    }

    pub fn set_group(&mut self, group: GroupRecord) -> Result<()> {
        let session = self.session.as_mut().ok_or(MentorError::NoSession)?;
        info!(subject = %group.subject, link = %group.link, "study group set");
        session.group = Some(group);
        Ok(())
    }

    pub fn apply(&mut self, event: MentorEvent) -> Outcome {
        match event {
            MentorEvent::BotReply(Ok(reply)) => {
                self.transcript.push(Sender::Bot, reply.clone());
                debug!("bot reply added");
                Outcome::BotReplied(reply)
            }
            MentorEvent::GroupMatched(Ok(group)) => match self.set_group(group.clone()) {
                Ok(()) => Outcome::GroupMatched(group),
                Err(err) => self.fail(err),
            },
            MentorEvent::BotReply(Err(err)) | MentorEvent::GroupMatched(Err(err)) => {
                self.fail(err)
            }
        }
    }

    fn fail(&mut self, err: MentorError) -> Outcome {
        error!(%err, "delayed task failed");
        self.raise_alert(AlertKind::Error, err.user_message());
        Outcome::Failed(err)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
