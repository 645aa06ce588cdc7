//! Player profile: balance, progression, skills, achievements and tutorial state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tutorial step a new player starts on.
pub const INITIAL_TUTORIAL_STEP: &str = "welcome";

/// The single player of an active game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Display name (non-empty).
    pub name: String,
    /// Cash balance in USD (>= 0).
    pub current_money: Decimal,
    /// Player level, starting at 1.
    pub level: u32,
    /// Experience accumulated towards the next level.
    pub xp: u32,
    /// Skill tree.
    pub skills: PlayerSkills,
    /// Unlocked achievements in unlock order.
    pub achievements: Vec<Achievement>,
    /// Lifetime counters.
    pub stats: PlayerStats,
    /// Tutorial progress.
    pub tutorial: TutorialProgress,
}

impl Player {
    /// Fresh level-1 player with the default skill tree and zeroed stats.
    pub fn new(name: impl Into<String>, initial_money: Decimal) -> Self {
        Self {
            name: name.into(),
            current_money: initial_money,
            level: 1,
            xp: 0,
            skills: PlayerSkills::default(),
            achievements: Vec::new(),
            stats: PlayerStats::default(),
            tutorial: TutorialProgress::default(),
        }
    }

    /// XP needed to leave the current level.
    pub fn xp_threshold(&self) -> u32 {
        self.level.saturating_mul(100)
    }

    /// Whether an achievement with `id` has been unlocked at least once.
    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a.id == id)
    }
}

/// A skill group with its level and per-area counters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGroup<S> {
    pub level: u32,
    pub sub_skills: S,
}

impl<S: Default> Default for SkillGroup<S> {
    fn default() -> Self {
        Self {
            level: 1,
            sub_skills: S::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevelopmentSkills {
    pub frontend: u32,
    pub backend: u32,
    pub mobile: u32,
    pub devops: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingSkills {
    pub seo: u32,
    pub social_media: u32,
    pub content: u32,
    pub analytics: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessSkills {
    pub strategy: u32,
    pub finance: u32,
    pub sales: u32,
    pub legal: u32,
}

/// The three skill groups of a player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSkills {
    pub development: SkillGroup<DevelopmentSkills>,
    pub marketing: SkillGroup<MarketingSkills>,
    pub business: SkillGroup<BusinessSkills>,
}

/// An unlocked achievement record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub unlocked: bool,
    /// Unlock time, set when the achievement is recorded on a player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

/// Lifetime counters; never decrease.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub total_revenue: Decimal,
    pub total_customers: u64,
    pub successful_campaigns: u64,
}

/// Completed tutorial steps (append-only) and the current step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialProgress {
    pub completed: Vec<String>,
    pub current: String,
}

impl Default for TutorialProgress {
    fn default() -> Self {
        Self {
            completed: Vec::new(),
            current: INITIAL_TUTORIAL_STEP.to_string(),
        }
    }
}
