#![deny(warnings)]

//! Economic models: advertising, progression and finance helpers for Indie Hacker Journey.
//!
//! This module provides validated, pure utilities for:
//! - Ad campaign results, quality-aware (gameplay) and quality-blind (UI preview)
//! - Single-step XP levelling
//! - Burn rate, runway and profit summaries

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

/// Monthly revenue each converted customer brings in, in USD.
pub const REVENUE_PER_CUSTOMER: u32 = 20;

/// XP required per level: leaving level `n` costs `n * XP_PER_LEVEL`.
pub const XP_PER_LEVEL: u32 = 100;

/// Days used to turn total costs into a daily burn rate.
pub const BURN_RATE_DAYS: u32 = 30;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Budgets must be non-negative.
    #[error("invalid budget: {0}")]
    InvalidBudget(Decimal),
    /// Intermediate value does not fit the numeric range.
    #[error("numeric overflow")]
    Overflow,
}

/// Reach and conversions produced by an ad campaign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdResults {
    pub reach: u64,
    pub conversions: u64,
}

/// Preview shown before a campaign is launched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdPreview {
    pub reach: u64,
    pub conversions: u64,
    /// Expected monthly revenue gain, `conversions * REVENUE_PER_CUSTOMER`.
    pub expected_mrr: Decimal,
}

/// Whether `budget` earns the viral reach and conversion bonus (>= 100 USD).
pub fn is_viral(budget: Decimal) -> bool {
    budget >= Decimal::ONE_HUNDRED
}

fn viral_multiplier(budget: Decimal) -> Decimal {
    if is_viral(budget) {
        Decimal::new(25, 1)
    } else {
        Decimal::ONE
    }
}

fn conversion_rate(budget: Decimal) -> Decimal {
    let base = Decimal::new(2, 2);
    if is_viral(budget) {
        base + Decimal::new(3, 2)
    } else {
        base
    }
}

/// Quality factor in [0.5, 2.0]; a quality of 50 is neutral.
pub fn quality_multiplier(quality: u8) -> Decimal {
    (Decimal::from(quality) / Decimal::new(50, 0)).clamp(Decimal::new(5, 1), Decimal::TWO)
}

fn floor_to_u64(value: Decimal) -> Result<u64, EconError> {
    value.floor().to_u64().ok_or(EconError::Overflow)
}

fn reach_for(budget: Decimal, quality_mul: Decimal) -> Result<u64, EconError> {
    if budget < Decimal::ZERO {
        return Err(EconError::InvalidBudget(budget));
    }
    let reach = budget
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|r| r.checked_mul(viral_multiplier(budget)))
        .and_then(|r| r.checked_mul(quality_mul))
        .ok_or(EconError::Overflow)?;
    floor_to_u64(reach)
}

fn conversions_for(budget: Decimal, reach: u64) -> Result<u64, EconError> {
    let conv = Decimal::from(reach)
        .checked_mul(conversion_rate(budget))
        .ok_or(EconError::Overflow)?;
    floor_to_u64(conv)
}

/// Campaign outcome used by gameplay.
///
/// reach = floor(budget * 100 * viral * quality_mul), where viral is 2.5 for
/// budgets of at least 100 and quality_mul = clamp(quality / 50, 0.5, 2.0).
/// conversions = floor(reach * rate) with rate 0.05 for viral budgets, else 0.02.
///
/// Example:
/// let r = ad_results(Decimal::new(100, 0), 50).unwrap();
/// assert_eq!((r.reach, r.conversions), (25_000, 1_250));
pub fn ad_results(budget: Decimal, quality: u8) -> Result<AdResults, EconError> {
    let reach = reach_for(budget, quality_multiplier(quality))?;
    let conversions = conversions_for(budget, reach)?;
    Ok(AdResults { reach, conversions })
}

/// Quality-blind estimate shown on the advertising screen before launch.
///
/// Deliberately ignores project quality, so it differs from [`ad_results`]
/// for any quality other than 50.
pub fn preview_ad_results(budget: Decimal) -> Result<AdPreview, EconError> {
    let reach = reach_for(budget, Decimal::ONE)?;
    let conversions = conversions_for(budget, reach)?;
    Ok(AdPreview {
        reach,
        conversions,
        expected_mrr: mrr_for(conversions, REVENUE_PER_CUSTOMER),
    })
}

/// Monthly revenue brought by `customers` at `revenue_per_customer` each.
pub fn mrr_for(customers: u64, revenue_per_customer: u32) -> Decimal {
    Decimal::from(customers) * Decimal::from(revenue_per_customer)
}

/// XP awarded for an ad spend: floor(budget / divisor), saturating.
pub fn xp_for_budget(budget: Decimal, divisor: u32) -> u32 {
    if budget <= Decimal::ZERO || divisor == 0 {
        return 0;
    }
    (budget / Decimal::from(divisor))
        .floor()
        .to_u32()
        .unwrap_or(u32::MAX)
}

/// Level and XP after a gain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: u32,
    pub xp: u32,
    pub leveled_up: bool,
}

/// Apply an XP gain with single-step levelling.
///
/// The threshold is `level * XP_PER_LEVEL` for the level held before the
/// gain. Crossing it raises the level by exactly one and carries the
/// remainder; a gain spanning several thresholds still levels up only once.
///
/// Example:
/// let p = apply_xp(1, 0, 250);
/// assert_eq!((p.level, p.xp), (2, 150));
pub fn apply_xp(level: u32, xp: u32, amount: u32) -> LevelProgress {
    let total = xp.saturating_add(amount);
    let threshold = level.saturating_mul(XP_PER_LEVEL);
    if total >= threshold {
        LevelProgress {
            level: level.saturating_add(1),
            xp: total - threshold,
            leveled_up: true,
        }
    } else {
        LevelProgress {
            level,
            xp: total,
            leveled_up: false,
        }
    }
}

/// Daily burn rate for a total cost figure.
pub fn burn_rate_per_day(total_costs: Decimal) -> Decimal {
    total_costs / Decimal::from(BURN_RATE_DAYS)
}

/// Days of runway at `burn_rate` per day; `None` when nothing is burned.
pub fn runway_days(money: Decimal, burn_rate: Decimal) -> Option<u64> {
    if burn_rate <= Decimal::ZERO {
        return None;
    }
    if money <= Decimal::ZERO {
        return Some(0);
    }
    (money / burn_rate).floor().to_u64()
}

/// Portfolio-level financial figures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FinanceSummary {
    pub total_mrr: Decimal,
    pub total_costs: Decimal,
    /// total_mrr - total_costs; may be negative.
    pub profit: Decimal,
    pub burn_rate_per_day: Decimal,
    pub runway_days: Option<u64>,
}

/// Summarize a portfolio from the cash balance and `(mrr, total_costs)` per project.
pub fn summarize<I>(money: Decimal, projects: I) -> FinanceSummary
where
    I: IntoIterator<Item = (Decimal, Decimal)>,
{
    let (total_mrr, total_costs) = projects
        .into_iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(m, c), (mrr, cost)| {
            (m + mrr, c + cost)
        });
    let burn = burn_rate_per_day(total_costs);
    FinanceSummary {
        total_mrr,
        total_costs,
        profit: total_mrr - total_costs,
        burn_rate_per_day: burn,
        runway_days: runway_days(money, burn),
    }
}
