//! Partial updates merged into projects and campaigns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use game_core::{
    Campaign, CampaignStatus, Marketing, Project, ProjectCosts, ProjectStage, Revenue,
};

/// Fields to overwrite on a project; `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stage: Option<ProjectStage>,
    pub quality: Option<u8>,
    pub revenue: Option<Revenue>,
    pub marketing: Option<Marketing>,
    pub costs: Option<ProjectCosts>,
}

impl ProjectUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_stage(mut self, stage: ProjectStage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_revenue(mut self, revenue: Revenue) -> Self {
        self.revenue = Some(revenue);
        self
    }

    pub(crate) fn apply_to(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(stage) = self.stage {
            project.stage = stage;
        }
        if let Some(quality) = self.quality {
            project.quality = quality;
        }
        if let Some(revenue) = self.revenue {
            project.revenue = revenue;
        }
        if let Some(marketing) = self.marketing {
            project.marketing = marketing;
        }
        if let Some(costs) = self.costs {
            project.costs = costs;
        }
    }
}

/// Fields to overwrite on a campaign.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CampaignUpdate {
    pub name: Option<String>,
    pub budget: Option<Decimal>,
    pub reach: Option<u64>,
    pub conversions: Option<u64>,
    pub status: Option<CampaignStatus>,
    pub end_date: Option<DateTime<Utc>>,
}

impl CampaignUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: CampaignStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_end_date(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn apply_to(self, campaign: &mut Campaign) {
        if let Some(name) = self.name {
            campaign.name = name;
        }
        if let Some(budget) = self.budget {
            campaign.budget = budget;
        }
        if let Some(reach) = self.reach {
            campaign.reach = reach;
        }
        if let Some(conversions) = self.conversions {
            campaign.conversions = conversions;
        }
        if let Some(status) = self.status {
            campaign.status = status;
        }
        if let Some(end) = self.end_date {
            campaign.end_date = Some(end);
        }
    }
}
