//! Projects, their revenue/marketing/cost ledgers and ad campaigns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Quality assigned to freshly created projects.
pub const DEFAULT_PROJECT_QUALITY: u8 = 50;

/// Upper bound of the quality score.
pub const MAX_PROJECT_QUALITY: u8 = 100;

/// Opaque project identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    /// Random (v4) identifier; collisions are not a practical concern.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Campaign identifier, unique within its project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(pub Uuid);

impl CampaignId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle stage of a project.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStage {
    /// Idea only, nothing built yet.
    #[default]
    Ideation,
    /// Being built.
    Development,
    /// Live with customers.
    Launched,
}

/// A software project owned by the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub stage: ProjectStage,
    /// Quality score in [0, 100]; drives ad effectiveness.
    pub quality: u8,
    pub revenue: Revenue,
    pub marketing: Marketing,
    /// Older saves carry no cost ledger.
    #[serde(default)]
    pub costs: ProjectCosts,
}

impl Project {
    /// New project in the ideation stage with zeroed ledgers.
    pub fn new(id: ProjectId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            stage: ProjectStage::Ideation,
            quality: DEFAULT_PROJECT_QUALITY,
            revenue: Revenue::default(),
            marketing: Marketing::default(),
            costs: ProjectCosts::default(),
        }
    }

    pub fn campaigns(&self) -> &[Campaign] {
        &self.marketing.advertising.campaigns
    }

    pub fn campaign_mut(&mut self, id: CampaignId) -> Option<&mut Campaign> {
        self.marketing
            .advertising
            .campaigns
            .iter_mut()
            .find(|c| c.id == id)
    }
}

/// Recurring revenue figures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revenue {
    /// Monthly recurring revenue in USD (>= 0).
    pub mrr: Decimal,
    pub customers: u64,
}

/// Cumulative marketing totals plus the individual campaign records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marketing {
    pub ad_spent: Decimal,
    pub reach: u64,
    pub conversions: u64,
    pub advertising: Advertising,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advertising {
    pub campaigns: Vec<Campaign>,
}

/// Status of an ad campaign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Active,
    Completed,
    Failed,
}

/// A single advertising campaign.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub budget: Decimal,
    pub reach: u64,
    pub conversions: u64,
    pub status: CampaignStatus,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

/// Cost categories tracked per project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostCategory {
    Development,
    Marketing,
    Infrastructure,
}

/// Accrued costs; `total` is the sum of the three categories.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCosts {
    pub total: Decimal,
    pub development: Decimal,
    pub marketing: Decimal,
    pub infrastructure: Decimal,
}

impl ProjectCosts {
    /// Ledger with `amount` accrued into `category` and the total, or `None`
    /// if either sum leaves the `Decimal` range.
    pub fn checked_accrue(&self, category: CostCategory, amount: Decimal) -> Option<Self> {
        let mut next = self.clone();
        let slot = match category {
            CostCategory::Development => &mut next.development,
            CostCategory::Marketing => &mut next.marketing,
            CostCategory::Infrastructure => &mut next.infrastructure,
        };
        *slot = slot.checked_add(amount)?;
        next.total = next.total.checked_add(amount)?;
        Some(next)
    }
}
