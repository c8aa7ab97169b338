use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::goal::UserGoal;

/// Member line of a freshly created group that nobody has joined yet.
pub const WAITING_MEMBERS: &str = "me (1) - waiting";

const SLUG_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub subject: String,
    pub goal: String,
    pub members: String,
    pub link: String,
}

impl fmt::Display for GroupRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Subject: {}", self.subject)?;
        writeln!(f, "Goal:    {}", self.goal)?;
        writeln!(f, "Members: {}", self.members)?;
        write!(f, "Join:    {}", self.link)
    }
}

fn goal_label(goal: &UserGoal) -> String {
    format!("{} target", goal.target_grade())
}

/// Random pick between a group matching the user's subject and a fixed
/// "similar subject" group.
pub fn find_group<R: Rng + ?Sized>(goal: &UserGoal, link_prefix: &str, rng: &mut R) -> GroupRecord {
    let candidates = [
        GroupRecord {
            subject: goal.subject().to_string(),
            goal: goal_label(goal),
            members: "Minji Kim, Hyunwoo Park, Jieun Lee (3)".to_string(),
            link: format!("{link_prefix}abc-defg-hij"),
        },
        GroupRecord {
            subject: "Similar subject".to_string(),
            goal: "A+ target".to_string(),
            members: "Junho Choi, Sujin Jung (2)".to_string(),
            link: format!("{link_prefix}xyz-uvw-rst"),
        },
    ];
    let picked = candidates
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| candidates[0].clone());
    debug!(subject = %picked.subject, "picked study group");
    picked
}

pub fn create_group<R: Rng + ?Sized>(
    goal: &UserGoal,
    link_prefix: &str,
    rng: &mut R,
) -> GroupRecord {
    GroupRecord {
        subject: goal.subject().to_string(),
        goal: goal_label(goal),
        members: WAITING_MEMBERS.to_string(),
        link: format!("{link_prefix}{}", meeting_slug(rng)),
    }
}

/// Three 3-letter lowercase segments joined by hyphens, e.g. `qkz-bmo-xya`.
pub fn meeting_slug<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..3)
        .map(|_| random_letters(3, rng))
        .collect::<Vec<_>>()
        .join("-")
}

fn random_letters<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    (0..len)
        .map(|_| SLUG_ALPHABET[rng.gen_range(0..SLUG_ALPHABET.len())] as char)
        .collect()
}

/// Where study groups come from. The mentor runtime drives `find` on a worker
/// task; `create` runs on the UI thread.
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn find(&self, goal: UserGoal) -> GroupRecord;

    fn create(&self, goal: &UserGoal, rng: &mut dyn RngCore) -> GroupRecord;
}

/// Built-in directory: a fixed pair of groups after a search delay.
#[derive(Debug, Clone)]
pub struct GroupMatcher {
    search_delay: Duration,
    link_prefix: String,
}

impl GroupMatcher {
    pub fn new(search_delay: Duration, link_prefix: impl Into<String>) -> Self {
        Self {
            search_delay,
            link_prefix: link_prefix.into(),
        }
    }
}

#[async_trait]
impl GroupDirectory for GroupMatcher {
    async fn find(&self, goal: UserGoal) -> GroupRecord {
        if !self.search_delay.is_zero() {
            tokio::time::sleep(self.search_delay).await;
        }
        find_group(&goal, &self.link_prefix, &mut rand::thread_rng())
    }

    fn create(&self, goal: &UserGoal, rng: &mut dyn RngCore) -> GroupRecord {
        create_group(goal, &self.link_prefix, rng)
    }
}
