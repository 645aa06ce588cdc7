#![deny(warnings)]

//! Core domain models and invariants for Indie Hacker Journey.
//!
//! This crate defines the serializable types that make up a saved game
//! (player, projects, campaigns) together with static reference data and
//! validation helpers guarding the basic invariants.

pub mod catalog;
pub mod player;
pub mod project;

pub use catalog::{achievement_def, initial_markets, AchievementDef, Market, ACHIEVEMENTS};
pub use player::{
    Achievement, BusinessSkills, DevelopmentSkills, MarketingSkills, Player, PlayerSkills,
    PlayerStats, SkillGroup, TutorialProgress, INITIAL_TUTORIAL_STEP,
};
pub use project::{
    Advertising, Campaign, CampaignId, CampaignStatus, CostCategory, Marketing, Project,
    ProjectCosts, ProjectId, ProjectStage, Revenue, DEFAULT_PROJECT_QUALITY, MAX_PROJECT_QUALITY,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Everything written to the save slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    /// `None` when no game has been started.
    pub player: Option<Player>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub current_project: Option<ProjectId>,
    #[serde(default)]
    pub loading: bool,
    #[serde(default)]
    pub initialized: bool,
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Names must contain a non-whitespace character.
    #[error("name must not be empty")]
    EmptyName,
    /// Money amounts must be non-negative.
    #[error("negative monetary value is invalid: {0}")]
    NegativeMoney(Decimal),
    /// Quality score above the maximum.
    #[error("quality {0} exceeds 100")]
    QualityOutOfRange(u8),
    /// Levels start at 1.
    #[error("level must be >= 1")]
    ZeroLevel,
    /// Two projects share an id.
    #[error("duplicate project id: {0}")]
    DuplicateProjectId(ProjectId),
    /// Two campaigns of one project share an id.
    #[error("duplicate campaign id {campaign} in project {project}")]
    DuplicateCampaignId {
        project: ProjectId,
        campaign: CampaignId,
    },
    /// The selected project is not in the project list.
    #[error("current project {0} does not exist")]
    UnknownCurrentProject(ProjectId),
    /// Projects exist without a player.
    #[error("projects present without a player")]
    OrphanProjects,
}

/// Reject negative amounts.
pub fn validate_money(amount: Decimal) -> Result<(), ValidationError> {
    if amount < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(amount));
    }
    Ok(())
}

/// Clamp a requested starting balance into `[min, max]`, as the welcome flow does.
pub fn clamp_starting_money(amount: Decimal, min: Decimal, max: Decimal) -> Decimal {
    amount.max(min).min(max)
}

/// Validate a display name.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

/// Validate a quality score.
pub fn validate_quality(quality: u8) -> Result<(), ValidationError> {
    if quality > MAX_PROJECT_QUALITY {
        return Err(ValidationError::QualityOutOfRange(quality));
    }
    Ok(())
}

/// Validate a player.
pub fn validate_player(p: &Player) -> Result<(), ValidationError> {
    validate_name(&p.name)?;
    validate_money(p.current_money)?;
    validate_money(p.stats.total_revenue)?;
    if p.level == 0 {
        return Err(ValidationError::ZeroLevel);
    }
    Ok(())
}

/// Validate a project, including campaign id uniqueness.
pub fn validate_project(p: &Project) -> Result<(), ValidationError> {
    validate_quality(p.quality)?;
    validate_money(p.revenue.mrr)?;
    validate_money(p.marketing.ad_spent)?;
    validate_money(p.costs.total)?;
    let mut seen = BTreeSet::new();
    for c in p.campaigns() {
        validate_money(c.budget)?;
        if !seen.insert(c.id) {
            return Err(ValidationError::DuplicateCampaignId {
                project: p.id,
                campaign: c.id,
            });
        }
    }
    Ok(())
}

/// Validate a whole saved game, including cross-references.
pub fn validate_saved_game(save: &SavedGame) -> Result<(), ValidationError> {
    match &save.player {
        Some(player) => validate_player(player)?,
        None if !save.projects.is_empty() => return Err(ValidationError::OrphanProjects),
        None => {}
    }
    let mut ids = BTreeSet::new();
    for p in &save.projects {
        validate_project(p)?;
        if !ids.insert(p.id) {
            return Err(ValidationError::DuplicateProjectId(p.id));
        }
    }
    if let Some(current) = save.current_project {
        if !ids.contains(&current) {
            return Err(ValidationError::UnknownCurrentProject(current));
        }
    }
    Ok(())
}
