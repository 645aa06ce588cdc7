//! Static reference data: target markets and achievement definitions.

use serde::{Deserialize, Serialize};

use crate::player::Achievement;

/// A target market a project can address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub name: String,
    /// Difficulty on a 1-5 scale.
    pub difficulty: u8,
    /// Size of the addressable user pool.
    pub potential_users: u64,
    /// Competition level on a 1-5 scale.
    pub competition_level: u8,
}

/// Markets available at game start.
pub fn initial_markets() -> Vec<Market> {
    [
        ("SaaS", 3, 1_000_000, 4),
        ("Mobile Apps", 2, 5_000_000, 5),
        ("Developer Tools", 4, 500_000, 3),
        ("E-commerce", 3, 2_000_000, 5),
    ]
    .into_iter()
    .map(|(name, difficulty, potential_users, competition_level)| Market {
        name: name.to_string(),
        difficulty,
        potential_users,
        competition_level,
    })
    .collect()
}

/// Definition of an unlockable achievement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// XP granted by the UI when the achievement is shown as unlocked.
    pub xp_reward: u32,
}

impl AchievementDef {
    /// Record form, not yet unlocked and without a date.
    pub fn to_achievement(&self) -> Achievement {
        Achievement {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            unlocked: false,
            date: None,
        }
    }
}

pub const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: "first_launch",
        name: "First Launch",
        description: "Launch your first project",
        xp_reward: 100,
    },
    AchievementDef {
        id: "revenue_milestone",
        name: "Revenue Milestone",
        description: "Reach $1,000 MRR",
        xp_reward: 500,
    },
    AchievementDef {
        id: "marketing_guru",
        name: "Marketing Guru",
        description: "Get 1,000 users from a single marketing campaign",
        xp_reward: 300,
    },
];

/// Look up an achievement definition by id.
pub fn achievement_def(id: &str) -> Option<&'static AchievementDef> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}
