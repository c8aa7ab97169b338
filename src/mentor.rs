//! Runs the delayed parts of the flow (bot replies, group search) on a small
//! tokio runtime and hands their results back to the UI thread.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use crate::chat::{strategy_from_config, ResponseStrategy};
use crate::error::{MentorError, Result};
use crate::flow::{AlertKind, MentorEvent, Outcome, ViewController};
use crate::goal::GoalForm;
use crate::group::{GroupDirectory, GroupMatcher, GroupRecord};
use crate::settings::MentorConfig;

type Waker = Arc<dyn Fn() + Send + Sync>;

pub struct Mentor {
    controller: ViewController,
    runtime: Runtime,
    strategy: Arc<dyn ResponseStrategy>,
    groups: Arc<dyn GroupDirectory>,
    events_tx: mpsc::Sender<MentorEvent>,
    events_rx: mpsc::Receiver<MentorEvent>,
    waker: Option<Waker>,
}

impl Mentor {
    pub fn from_config(cfg: &MentorConfig) -> Result<Self> {
        let strategy = strategy_from_config(cfg)?;
        let matcher = GroupMatcher::new(cfg.group_search_delay(), cfg.meeting_link_prefix.clone());
        Self::new(strategy, Arc::new(matcher))
    }

    pub fn new(
        strategy: Arc<dyn ResponseStrategy>,
        groups: Arc<dyn GroupDirectory>,
    ) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("mentor-worker")
            .enable_time()
            .build()?;
        let (events_tx, events_rx) = mpsc::channel();
        info!(strategy = strategy.name(), "mentor ready");
        Ok(Self {
            controller: ViewController::new(),
            runtime,
            strategy,
            groups,
            events_tx,
            events_rx,
            waker: None,
        })
    }

    /// Called from the worker whenever an event is queued, so the GUI can repaint.
    pub fn set_waker(&mut self, waker: impl Fn() + Send + Sync + 'static) {
        self.waker = Some(Arc::new(waker));
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ViewController {
        &mut self.controller
    }

    pub fn submit_goal(&mut self, form: &GoalForm) -> Result<()> {
        self.controller.submit_goal(form)
    }

    /// Queues a bot reply for `input`. Returns false when the line was blank.
    pub fn send_chat(&mut self, input: &str) -> bool {
        let Some(message) = self.controller.push_user_message(input) else {
            return false;
        };
        let history = self.controller.transcript().messages().to_vec();
        let strategy = Arc::clone(&self.strategy);
        let tx = self.events_tx.clone();
        let waker = self.waker.clone();
        debug!(messages = self.controller.transcript().len(), "chat reply requested");

        let answer = self
            .runtime
            .spawn(async move { strategy.reply(&history, &message).await });
        self.runtime.spawn(async move {
            let reply = match answer.await {
                Ok(reply) => reply,
                Err(e) => Err(MentorError::ChatReply(e.to_string())),
            };
            deliver(&tx, waker.as_ref(), MentorEvent::BotReply(reply));
        });
        true
    }

    /// Starts the delayed group search. Loading stays up until it finishes.
    pub fn find_group(&mut self) -> Result<()> {
        let goal = self
            .controller
            .session()
            .map(|s| s.goal.clone())
            .ok_or(MentorError::NoSession)?;
        let loading = self.controller.loading().begin();
        let groups = Arc::clone(&self.groups);
        let tx = self.events_tx.clone();
        let waker = self.waker.clone();
        info!(subject = goal.subject(), "searching for a study group");

        let search = self.runtime.spawn(async move { groups.find(goal).await });
        self.runtime.spawn(async move {
            let result = search
                .await
                .map_err(|e| MentorError::GroupSearch(e.to_string()));
            drop(loading);
            deliver(&tx, waker.as_ref(), MentorEvent::GroupMatched(result));
        });
        Ok(())
    }

    pub fn create_group(&mut self) -> Result<GroupRecord> {
        let goal = self
            .controller
            .session()
            .map(|s| s.goal.clone())
            .ok_or(MentorError::NoSession)?;
        let group = self.groups.create(&goal, &mut rand::thread_rng());
        self.controller.set_group(group.clone())?;
        self.controller.raise_alert(
            AlertKind::Info,
            "New group created! Wait for other students to join.",
        );
        Ok(group)
    }

    /// Applies every event that has arrived so far.
    pub fn pump(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            outcomes.push(self.controller.apply(event));
        }
        outcomes
    }

    /// Blocks until the next event arrives or `timeout` passes.
    pub fn wait_event(&mut self, timeout: Duration) -> Option<Outcome> {
        let event = self.events_rx.recv_timeout(timeout).ok()?;
        Some(self.controller.apply(event))
    }
}

fn deliver(tx: &mpsc::Sender<MentorEvent>, waker: Option<&Waker>, event: MentorEvent) {
    if tx.send(event).is_err() {
        debug!("mentor dropped before event could be delivered");
        return;
    }
    if let Some(wake) = waker {
        wake();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{CannedReplies, ChatMessage, Sender, CANNED_REPLIES};
    use crate::flow::View;
    use crate::goal::UserGoal;
    use crate::group::WAITING_MEMBERS;
    use async_trait::async_trait;
    use rand::RngCore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WAIT: Duration = Duration::from_secs(5);

    struct BrokenStrategy;

    #[async_trait]
    impl ResponseStrategy for BrokenStrategy {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn reply(&self, _history: &[ChatMessage], _message: &str) -> Result<String> {
            panic!("reply backend crashed");
        }
    }

    struct BrokenDirectory;

    #[async_trait]
    impl GroupDirectory for BrokenDirectory {
        async fn find(&self, _goal: UserGoal) -> GroupRecord {
            panic!("directory unreachable");
        }

        fn create(&self, goal: &UserGoal, rng: &mut dyn RngCore) -> GroupRecord {
            crate::group::create_group(goal, "https://meet.google.com/", rng)
        }
    }

    fn mentor(search_delay: Duration) -> Mentor {
        Mentor::new(
            Arc::new(CannedReplies::with_seed(Duration::ZERO, 4)),
            Arc::new(GroupMatcher::new(search_delay, "https://meet.google.com/")),
        )
        .unwrap()
    }

    fn on_dashboard(search_delay: Duration) -> Mentor {
        let mut mentor = mentor(search_delay);
        mentor
            .submit_goal(&GoalForm::new("Calculus", "A", "Beginner"))
            .unwrap();
        mentor
    }

    fn on_dashboard_with(
        strategy: Arc<dyn ResponseStrategy>,
        groups: Arc<dyn GroupDirectory>,
    ) -> Mentor {
        let mut mentor = Mentor::new(strategy, groups).unwrap();
        mentor
            .submit_goal(&GoalForm::new("Calculus", "A", "Beginner"))
            .unwrap();
        mentor
    }

    #[test]
    fn crashed_reply_raises_alert() {
        let mut mentor = on_dashboard_with(
            Arc::new(BrokenStrategy),
            Arc::new(GroupMatcher::new(Duration::ZERO, "https://meet.google.com/")),
        );
        assert!(mentor.send_chat("hi"));

        match mentor.wait_event(WAIT) {
            Some(Outcome::Failed(MentorError::ChatReply(_))) => {}
            other => panic!("unexpected outcome: {other:?}"),
        }
        let messages = mentor.controller().transcript().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, Sender::User);
        let alert = mentor.controller_mut().take_alert().unwrap();
        assert_eq!(alert.kind, AlertKind::Error);
        assert_eq!(
            alert.message,
            "Something went wrong while answering. Please try again."
        );
    }

    #[test]
    fn crashed_search_raises_alert_and_clears_loading() {
        let mut mentor = on_dashboard_with(
            Arc::new(CannedReplies::with_seed(Duration::ZERO, 4)),
            Arc::new(BrokenDirectory),
        );
        mentor.find_group().unwrap();

        match mentor.wait_event(WAIT) {
            Some(Outcome::Failed(MentorError::GroupSearch(_))) => {}
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!mentor.controller().is_loading());
        assert!(mentor.controller().session().unwrap().group.is_none());
        assert_eq!(
            mentor.controller().alert().map(|a| a.message.as_str()),
            Some("Something went wrong while matching a group.")
        );
    }

    #[test]
    fn chat_reply_arrives_after_user_message() {
        let mut mentor = on_dashboard(Duration::ZERO);
        assert!(mentor.send_chat("what is a derivative?"));
        assert_eq!(mentor.controller().transcript().len(), 1);

        match mentor.wait_event(WAIT) {
            Some(Outcome::BotReplied(reply)) => {
                assert!(CANNED_REPLIES.contains(&reply.as_str()));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        let messages = mentor.controller().transcript().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[1].sender, Sender::Bot);
    }

    #[test]
    fn blank_chat_sends_nothing() {
        let mut mentor = on_dashboard(Duration::ZERO);
        assert!(!mentor.send_chat("  "));
        assert!(mentor.wait_event(Duration::from_millis(50)).is_none());
        assert!(mentor.controller().transcript().is_empty());
    }

    #[test]
    fn group_search_holds_loading_until_done() {
        let mut mentor = on_dashboard(Duration::from_millis(200));
        mentor.find_group().unwrap();
        assert!(mentor.controller().is_loading());

        match mentor.wait_event(WAIT) {
            Some(Outcome::GroupMatched(group)) => {
                assert!(group.link.starts_with("https://meet.google.com/"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!mentor.controller().is_loading());
        assert!(mentor.controller().session().unwrap().group.is_some());
    }

    #[test]
    fn late_search_result_is_pumped_before_next_reply() {
        let mut mentor = on_dashboard(Duration::from_millis(200));
        mentor.find_group().unwrap();
        assert!(mentor.wait_event(Duration::from_millis(10)).is_none());

        let deadline = std::time::Instant::now() + WAIT;
        let mut pending = Vec::new();
        while pending.is_empty() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
            pending = mentor.pump();
        }
        assert!(matches!(pending.as_slice(), [Outcome::GroupMatched(_)]));

        assert!(mentor.send_chat("and now?"));
        assert!(matches!(
            mentor.wait_event(WAIT),
            Some(Outcome::BotReplied(_))
        ));
    }

    #[test]
    fn group_actions_need_a_goal() {
        let mut mentor = mentor(Duration::ZERO);
        assert!(matches!(mentor.find_group(), Err(MentorError::NoSession)));
        assert!(matches!(mentor.create_group(), Err(MentorError::NoSession)));
        assert!(!mentor.controller().is_loading());
        assert_eq!(mentor.controller().view(), View::Onboarding);
    }

    #[test]
    fn created_group_is_stored_and_announced() {
        let mut mentor = on_dashboard(Duration::ZERO);
        let group = mentor.create_group().unwrap();
        assert_eq!(group.members, WAITING_MEMBERS);
        assert_eq!(
            mentor.controller().session().unwrap().group.as_ref(),
            Some(&group)
        );
        let alert = mentor.controller_mut().take_alert().unwrap();
        assert_eq!(alert.kind, AlertKind::Info);
    }

    #[test]
    fn waker_fires_per_event() {
        let mut mentor = on_dashboard(Duration::ZERO);
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        mentor.set_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        mentor.send_chat("one");
        mentor.send_chat("two");
        assert!(mentor.wait_event(WAIT).is_some());
        assert!(mentor.wait_event(WAIT).is_some());
        // the wake runs just after the send, so give the worker a moment
        let deadline = std::time::Instant::now() + WAIT;
        while wakes.load(Ordering::SeqCst) < 2 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
        assert!(mentor.pump().is_empty());
    }

    #[test]
    fn unknown_strategy_fails_fast() {
        let cfg = MentorConfig {
            strategy: "oracle".to_string(),
            ..MentorConfig::default()
        };
        assert!(matches!(
            Mentor::from_config(&cfg),
            Err(MentorError::Config(_))
        ));
    }
}
