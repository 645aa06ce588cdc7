//! The game state store: single owner of the player, projects and campaigns.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use game_core::{
    initial_markets, validate_money, validate_name, validate_project, Achievement, Campaign,
    CampaignId, CampaignStatus, CostCategory, Market, Player, Project, ProjectId, SavedGame,
};
use game_econ::{FinanceSummary, LevelProgress};
use persistence::{decode_snapshot, encode_snapshot, PersistError, SaveHandle};

use crate::config::GameConfig;
use crate::error::{StoreError, StoreResult};
use crate::state::{ActiveGame, GameState};
use crate::update::{CampaignUpdate, ProjectUpdate};

/// What a successful ad campaign produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CampaignOutcome {
    pub campaign_id: CampaignId,
    pub reach: u64,
    pub conversions: u64,
    pub mrr_gained: Decimal,
    pub xp_gained: u32,
    /// Player level after the XP award.
    pub level: u32,
    pub leveled_up: bool,
    /// Balance after the budget was debited.
    pub balance: Decimal,
}

/// Owns the game state and applies every mutation to it.
///
/// Each successful mutation submits a full snapshot to the save writer and
/// returns without waiting for the write. Rejected mutations leave the state
/// untouched and submit nothing.
#[derive(Debug)]
pub struct GameStore {
    state: GameState,
    loading: bool,
    initialized: bool,
    config: GameConfig,
    saves: SaveHandle,
}

impl GameStore {
    /// Empty store; call [`GameStore::initialize_game`] to load a saved game.
    pub fn new(saves: SaveHandle, config: GameConfig) -> Self {
        Self {
            state: GameState::NoGame,
            loading: true,
            initialized: false,
            config,
            saves,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn player(&self) -> Option<&Player> {
        self.state.active().map(|g| &g.player)
    }

    /// Projects in creation order; empty without an active game.
    pub fn projects(&self) -> &[Project] {
        self.state.active().map_or(&[], |g| g.projects.as_slice())
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.state.active().and_then(|g| g.project(id))
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.state.active().and_then(ActiveGame::current_project)
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn initialized(&self) -> bool {
        self.initialized
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Static market catalog.
    pub fn markets(&self) -> Vec<Market> {
        initial_markets()
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.player().is_some_and(|p| p.has_achievement(id))
    }

    /// Portfolio MRR, costs, burn rate and runway.
    pub fn finance_summary(&self) -> Option<FinanceSummary> {
        self.state.active().map(|g| {
            game_econ::summarize(
                g.player.current_money,
                g.projects.iter().map(|p| (p.revenue.mrr, p.costs.total)),
            )
        })
    }

    /// The state exactly as it is persisted.
    pub fn snapshot(&self) -> SavedGame {
        self.state.to_saved(self.loading, self.initialized)
    }

    /// Load the saved game, if any.
    ///
    /// A missing or unreadable save resets to [`GameState::NoGame`]; the
    /// failure is only logged. Always ends with `loading == false` and
    /// `initialized == true`, and may be called again to reload.
    pub async fn initialize_game(&mut self) {
        if let Err(e) = self.saves.flush().await {
            warn!(error = %e, "pending saves not flushed before load");
        }
        self.state = match self.saves.load().await {
            Ok(Some(text)) => match decode_snapshot(&text) {
                Ok(save) => GameState::from_saved(save),
                Err(e) => {
                    warn!(error = %e, "saved game is unreadable; starting empty");
                    GameState::NoGame
                }
            },
            Ok(None) => {
                info!("no saved game");
                GameState::NoGame
            }
            Err(e) => {
                warn!(error = %e, "failed to read saved game; starting empty");
                GameState::NoGame
            }
        };
        info!(
            active = self.state.is_active(),
            projects = self.projects().len(),
            "game initialized"
        );
        self.loading = false;
        self.initialized = true;
    }

    /// Drop the current game and clear the save slot.
    pub async fn delete_save(&mut self) -> Result<(), PersistError> {
        self.state = GameState::NoGame;
        self.saves.clear().await?;
        info!("saved game deleted");
        Ok(())
    }

    /// Wait for outstanding saves and release the store.
    pub async fn close(self) -> Result<(), PersistError> {
        self.saves.flush().await
    }

    /// Install a fresh player, overwriting any prior one.
    ///
    /// Projects and the selection of an active game are kept. The balance is
    /// taken as given; clamping into the configured range is up to the caller.
    pub fn create_player(&mut self, name: &str, initial_money: Decimal) -> StoreResult<()> {
        validate_name(name)?;
        validate_money(initial_money)?;
        let player = Player::new(name, initial_money);
        let (game, replaced) = match std::mem::take(&mut self.state) {
            GameState::Active(game) => (ActiveGame { player, ..game }, true),
            GameState::NoGame => (ActiveGame::new(player), false),
        };
        self.state = GameState::Active(game);
        info!(name, %initial_money, replaced, "player created");
        self.persist();
        Ok(())
    }

    /// Create a project and select it.
    pub fn create_project(&mut self, name: &str, description: &str) -> StoreResult<ProjectId> {
        let quality = self.config.default_quality;
        let game = self.active_mut()?;
        validate_name(name)?;
        let mut id = ProjectId::new_random();
        while game.project(id).is_some() {
            id = ProjectId::new_random();
        }
        let mut project = Project::new(id, name, description);
        project.quality = quality;
        game.projects.push(project);
        game.current_project = Some(id);
        debug!(%id, name, "project created");
        self.persist();
        Ok(id)
    }

    /// Select the project with `id`, or clear the selection if there is none.
    pub fn select_project(&mut self, id: ProjectId) -> Option<&Project> {
        let GameState::Active(game) = &mut self.state else {
            return None;
        };
        game.current_project = game.project(id).map(|p| p.id);
        if game.current_project.is_none() {
            debug!(%id, "selected project not found; selection cleared");
        }
        self.persist();
        self.current_project()
    }

    /// Merge `update` into a project.
    pub fn update_project(&mut self, id: ProjectId, update: ProjectUpdate) -> StoreResult<()> {
        let game = self.active_mut()?;
        let project = game
            .project_mut(id)
            .ok_or(StoreError::ProjectNotFound(id))?;
        let mut merged = project.clone();
        update.apply_to(&mut merged);
        validate_name(&merged.name)?;
        validate_project(&merged)?;
        *project = merged;
        debug!(%id, "project updated");
        self.persist();
        Ok(())
    }

    /// Accrue a cost on a project's ledger. The balance is not touched.
    pub fn record_project_cost(
        &mut self,
        id: ProjectId,
        category: CostCategory,
        amount: Decimal,
    ) -> StoreResult<()> {
        let game = self.active_mut()?;
        if amount < Decimal::ZERO {
            return Err(StoreError::InvalidAmount(amount));
        }
        let project = game
            .project_mut(id)
            .ok_or(StoreError::ProjectNotFound(id))?;
        project.costs = project
            .costs
            .checked_accrue(category, amount)
            .ok_or(StoreError::Overflow)?;
        debug!(%id, ?category, %amount, "cost recorded");
        self.persist();
        Ok(())
    }

    /// Debit `amount`; returns the new balance.
    pub fn spend_money(&mut self, amount: Decimal) -> StoreResult<Decimal> {
        let game = self.active_mut()?;
        let balance = debit(&mut game.player, amount)?;
        debug!(%amount, %balance, "money spent");
        self.persist();
        Ok(balance)
    }

    /// Credit `amount` as revenue; returns the new balance.
    pub fn earn_money(&mut self, amount: Decimal) -> StoreResult<Decimal> {
        let game = self.active_mut()?;
        if amount < Decimal::ZERO {
            return Err(StoreError::InvalidAmount(amount));
        }
        let player = &mut game.player;
        let balance = checked_sum(player.current_money, amount)?;
        let total_revenue = checked_sum(player.stats.total_revenue, amount)?;
        player.current_money = balance;
        player.stats.total_revenue = total_revenue;
        debug!(%amount, %balance, "money earned");
        self.persist();
        Ok(balance)
    }

    /// Add XP with single-step levelling.
    pub fn gain_xp(&mut self, amount: u32) -> StoreResult<LevelProgress> {
        let game = self.active_mut()?;
        let progress = award_xp(&mut game.player, amount);
        self.persist();
        Ok(progress)
    }

    /// Record `achievement` as unlocked now. Repeated unlocks append again.
    pub fn unlock_achievement(&mut self, achievement: Achievement) -> StoreResult<()> {
        let game = self.active_mut()?;
        let record = Achievement {
            unlocked: true,
            date: Some(Utc::now()),
            ..achievement
        };
        info!(id = %record.id, "achievement unlocked");
        game.player.achievements.push(record);
        self.persist();
        Ok(())
    }

    /// Spend `budget` on ads for a project and book the results.
    ///
    /// Fails without side effects when there is no game, the project is
    /// unknown, the budget is negative or the balance does not cover it.
    pub fn run_ad_campaign(
        &mut self,
        project_id: ProjectId,
        budget: Decimal,
    ) -> StoreResult<CampaignOutcome> {
        let revenue_per_customer = self.config.revenue_per_customer;
        let xp_divisor = self.config.xp_budget_divisor;
        let game = self.active_mut()?;
        let idx = game
            .projects
            .iter()
            .position(|p| p.id == project_id)
            .ok_or(StoreError::ProjectNotFound(project_id))?;
        if budget < Decimal::ZERO {
            return Err(StoreError::InvalidAmount(budget));
        }
        let available = game.player.current_money;
        if budget > available {
            return Err(StoreError::InsufficientFunds {
                requested: budget,
                available,
            });
        }
        let current = &game.projects[idx];
        let results = game_econ::ad_results(budget, current.quality)?;
        let mrr_gained = game_econ::mrr_for(results.conversions, revenue_per_customer);
        let ad_spent = checked_sum(current.marketing.ad_spent, budget)?;
        let mrr = checked_sum(current.revenue.mrr, mrr_gained)?;
        let costs = current
            .costs
            .checked_accrue(CostCategory::Marketing, budget)
            .ok_or(StoreError::Overflow)?;
        let balance = debit(&mut game.player, budget)?;

        let now = Utc::now();
        let project = &mut game.projects[idx];
        let mut campaign_id = CampaignId::new_random();
        while project.campaigns().iter().any(|c| c.id == campaign_id) {
            campaign_id = CampaignId::new_random();
        }
        let number = project.campaigns().len() + 1;
        let marketing = &mut project.marketing;
        marketing.ad_spent = ad_spent;
        marketing.reach = marketing.reach.saturating_add(results.reach);
        marketing.conversions = marketing.conversions.saturating_add(results.conversions);
        marketing.advertising.campaigns.push(Campaign {
            id: campaign_id,
            name: format!("Ad campaign #{number}"),
            budget,
            reach: results.reach,
            conversions: results.conversions,
            status: CampaignStatus::Completed,
            start_date: now,
            end_date: Some(now),
        });
        project.revenue.customers = project.revenue.customers.saturating_add(results.conversions);
        project.revenue.mrr = mrr;
        project.costs = costs;

        let stats = &mut game.player.stats;
        stats.total_customers = stats.total_customers.saturating_add(results.conversions);
        stats.successful_campaigns = stats.successful_campaigns.saturating_add(1);

        let xp_gained = game_econ::xp_for_budget(budget, xp_divisor);
        let progress = award_xp(&mut game.player, xp_gained);
        info!(
            project = %project_id,
            %budget,
            reach = results.reach,
            conversions = results.conversions,
            %mrr_gained,
            "ad campaign completed"
        );
        self.persist();
        Ok(CampaignOutcome {
            campaign_id,
            reach: results.reach,
            conversions: results.conversions,
            mrr_gained,
            xp_gained,
            level: progress.level,
            leveled_up: progress.leveled_up,
            balance,
        })
    }

    /// Merge `update` into one campaign of a project.
    pub fn update_campaign(
        &mut self,
        project_id: ProjectId,
        campaign_id: CampaignId,
        update: CampaignUpdate,
    ) -> StoreResult<()> {
        let game = self.active_mut()?;
        let campaign = game
            .project_mut(project_id)
            .ok_or(StoreError::ProjectNotFound(project_id))?
            .campaign_mut(campaign_id)
            .ok_or(StoreError::CampaignNotFound {
                project: project_id,
                campaign: campaign_id,
            })?;
        if let Some(budget) = update.budget {
            validate_money(budget)?;
        }
        update.apply_to(campaign);
        debug!(project = %project_id, campaign = %campaign_id, "campaign updated");
        self.persist();
        Ok(())
    }

    /// Mark a tutorial step as completed and make it the current one.
    pub fn save_tutorial_progress(&mut self, step: &str) -> StoreResult<()> {
        let game = self.active_mut()?;
        let tutorial = &mut game.player.tutorial;
        tutorial.completed.push(step.to_string());
        tutorial.current = step.to_string();
        debug!(step, "tutorial progress saved");
        self.persist();
        Ok(())
    }

    fn active_mut(&mut self) -> StoreResult<&mut ActiveGame> {
        match &mut self.state {
            GameState::Active(game) => Ok(game),
            GameState::NoGame => Err(StoreError::NoActiveGame),
        }
    }

    fn persist(&self) {
        match encode_snapshot(&self.snapshot()) {
            Ok(json) => self.saves.submit(json),
            Err(e) => error!(error = %e, "failed to encode snapshot"),
        }
    }
}

fn debit(player: &mut Player, amount: Decimal) -> StoreResult<Decimal> {
    if amount < Decimal::ZERO {
        return Err(StoreError::InvalidAmount(amount));
    }
    if amount > player.current_money {
        return Err(StoreError::InsufficientFunds {
            requested: amount,
            available: player.current_money,
        });
    }
    player.current_money -= amount;
    Ok(player.current_money)
}

fn checked_sum(total: Decimal, amount: Decimal) -> StoreResult<Decimal> {
    total.checked_add(amount).ok_or(StoreError::Overflow)
}

fn award_xp(player: &mut Player, amount: u32) -> LevelProgress {
    let progress = game_econ::apply_xp(player.level, player.xp, amount);
    player.level = progress.level;
    player.xp = progress.xp;
    if progress.leveled_up {
        info!(level = progress.level, "level up");
    }
    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{ProjectStage, ACHIEVEMENTS};
    use persistence::{KvStore, MemoryStore, SaveWriter, DEFAULT_SAVE_KEY};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn usd(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn store_on(kv: Arc<MemoryStore>) -> GameStore {
        let (saves, _failures) = SaveWriter::spawn(kv, DEFAULT_SAVE_KEY);
        GameStore::new(saves, GameConfig::default())
    }

    async fn started() -> (GameStore, Arc<MemoryStore>) {
        let kv = Arc::new(MemoryStore::new());
        let mut store = store_on(kv.clone());
        store.initialize_game().await;
        store.create_player("Ada", usd(5000)).unwrap();
        (store, kv)
    }

    async fn persisted(store: &GameStore, kv: &MemoryStore) -> SavedGame {
        store.saves.flush().await.unwrap();
        let text = kv.get_item(DEFAULT_SAVE_KEY).await.unwrap().unwrap();
        decode_snapshot(&text).unwrap()
    }

    #[tokio::test]
    async fn create_player_starts_fresh() {
        let (store, _kv) = started().await;
        let player = store.player().unwrap();
        assert_eq!(player.current_money, usd(5000));
        assert_eq!(player.level, 1);
        assert_eq!(player.xp, 0);
        assert!(player.achievements.is_empty());
        assert_eq!(player.tutorial.current, "welcome");
        assert!(store.projects().is_empty());
    }

    #[tokio::test]
    async fn create_player_validates_input() {
        let kv = Arc::new(MemoryStore::new());
        let mut store = store_on(kv);
        assert!(matches!(
            store.create_player("  ", usd(5000)),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            store.create_player("Ada", usd(-1)),
            Err(StoreError::Validation(_))
        ));
        assert!(store.player().is_none());
    }

    #[tokio::test]
    async fn starting_money_is_taken_as_given() {
        let kv = Arc::new(MemoryStore::new());
        let mut store = store_on(kv);
        store.create_player("Ada", usd(500)).unwrap();
        assert_eq!(store.player().unwrap().current_money, usd(500));
        store.create_player("Ada", usd(50_000)).unwrap();
        assert_eq!(store.player().unwrap().current_money, usd(50_000));
    }

    #[tokio::test]
    async fn new_player_keeps_projects() {
        let (mut store, kv) = started().await;
        let id = store.create_project("X", "d").unwrap();
        store.gain_xp(150).unwrap();
        store.create_player("Grace", usd(2000)).unwrap();
        let player = store.player().unwrap();
        assert_eq!(player.name, "Grace");
        assert_eq!(player.current_money, usd(2000));
        assert_eq!((player.level, player.xp), (1, 0));
        assert_eq!(store.projects().len(), 1);
        assert_eq!(store.current_project().unwrap().id, id);
        assert_eq!(persisted(&store, &kv).await, store.snapshot());
    }

    #[tokio::test]
    async fn overspend_is_rejected_without_change() {
        let (mut store, _kv) = started().await;
        assert_eq!(
            store.spend_money(usd(6000)),
            Err(StoreError::InsufficientFunds {
                requested: usd(6000),
                available: usd(5000)
            })
        );
        assert_eq!(store.player().unwrap().current_money, usd(5000));
        assert_eq!(store.spend_money(usd(5000)), Ok(Decimal::ZERO));
        assert_eq!(
            store.spend_money(usd(-1)),
            Err(StoreError::InvalidAmount(usd(-1)))
        );
    }

    #[tokio::test]
    async fn earn_money_tracks_revenue() {
        let (mut store, _kv) = started().await;
        assert_eq!(store.earn_money(usd(250)), Ok(usd(5250)));
        assert_eq!(store.player().unwrap().stats.total_revenue, usd(250));
        assert_eq!(
            store.earn_money(usd(-10)),
            Err(StoreError::InvalidAmount(usd(-10)))
        );
        assert_eq!(store.player().unwrap().current_money, usd(5250));
    }

    #[tokio::test]
    async fn overflowing_amounts_change_nothing() {
        let (mut store, _kv) = started().await;
        let id = store.create_project("X", "d").unwrap();
        let before = store.snapshot();
        assert_eq!(store.earn_money(Decimal::MAX), Err(StoreError::Overflow));
        store
            .record_project_cost(id, CostCategory::Development, Decimal::MAX)
            .unwrap();
        let with_cost = store.snapshot();
        assert_eq!(
            store.record_project_cost(id, CostCategory::Marketing, usd(1)),
            Err(StoreError::Overflow)
        );
        assert_eq!(store.snapshot(), with_cost);
        assert_eq!(
            store.run_ad_campaign(id, usd(100)),
            Err(StoreError::Overflow)
        );
        assert_eq!(store.snapshot(), with_cost);
        assert_eq!(before.player, with_cost.player);
    }

    #[tokio::test]
    async fn viral_campaign_books_results() {
        let (mut store, kv) = started().await;
        let id = store.create_project("X", "d").unwrap();
        let outcome = store.run_ad_campaign(id, usd(100)).unwrap();
        assert_eq!(outcome.reach, 25_000);
        assert_eq!(outcome.conversions, 1_250);
        assert_eq!(outcome.mrr_gained, usd(25_000));
        assert_eq!(outcome.xp_gained, 10);
        assert_eq!(outcome.balance, usd(4900));

        let project = store.project(id).unwrap();
        assert_eq!(project.revenue.mrr, usd(25_000));
        assert_eq!(project.revenue.customers, 1_250);
        assert_eq!(project.marketing.ad_spent, usd(100));
        assert_eq!(project.marketing.reach, 25_000);
        assert_eq!(project.marketing.conversions, 1_250);
        assert_eq!(project.costs.marketing, usd(100));
        assert_eq!(project.campaigns().len(), 1);
        assert_eq!(project.campaigns()[0].id, outcome.campaign_id);
        assert_eq!(project.campaigns()[0].status, CampaignStatus::Completed);

        let player = store.player().unwrap();
        assert_eq!(player.current_money, usd(4900));
        assert_eq!(player.stats.successful_campaigns, 1);
        assert_eq!(player.stats.total_customers, 1_250);
        assert_eq!(player.xp, 10);

        assert_eq!(persisted(&store, &kv).await, store.snapshot());
    }

    #[tokio::test]
    async fn campaign_on_unknown_project_changes_nothing() {
        let (mut store, _kv) = started().await;
        store.create_project("X", "d").unwrap();
        let before = store.snapshot();
        let ghost = ProjectId::new_random();
        assert_eq!(
            store.run_ad_campaign(ghost, usd(100)),
            Err(StoreError::ProjectNotFound(ghost))
        );
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn unaffordable_campaign_changes_nothing() {
        let (mut store, _kv) = started().await;
        let id = store.create_project("X", "d").unwrap();
        let before = store.snapshot();
        assert!(matches!(
            store.run_ad_campaign(id, usd(5001)),
            Err(StoreError::InsufficientFunds { .. })
        ));
        assert_eq!(
            store.run_ad_campaign(id, usd(-1)),
            Err(StoreError::InvalidAmount(usd(-1)))
        );
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn zero_budget_campaign_still_counts() {
        let (mut store, _kv) = started().await;
        let id = store.create_project("X", "d").unwrap();
        let outcome = store.run_ad_campaign(id, Decimal::ZERO).unwrap();
        assert_eq!((outcome.reach, outcome.conversions), (0, 0));
        assert_eq!(outcome.mrr_gained, Decimal::ZERO);
        assert_eq!(outcome.xp_gained, 0);
        assert_eq!(outcome.balance, usd(5000));
        let player = store.player().unwrap();
        assert_eq!(player.stats.successful_campaigns, 1);
        assert_eq!(player.current_money, usd(5000));
        assert_eq!(store.project(id).unwrap().campaigns().len(), 1);
    }

    #[tokio::test]
    async fn campaign_quality_matters() {
        let (mut store, _kv) = started().await;
        let id = store.create_project("X", "d").unwrap();
        store
            .update_project(id, ProjectUpdate::new().with_quality(100))
            .unwrap();
        let outcome = store.run_ad_campaign(id, usd(100)).unwrap();
        assert_eq!(outcome.reach, 50_000);
        assert_eq!(outcome.conversions, 2_500);
    }

    #[tokio::test]
    async fn xp_levels_up_once_per_gain() {
        let (mut store, _kv) = started().await;
        let progress = store.gain_xp(250).unwrap();
        assert_eq!((progress.level, progress.xp), (2, 150));
        let player = store.player().unwrap();
        assert_eq!((player.level, player.xp), (2, 150));
        store.gain_xp(49).unwrap();
        assert_eq!(store.player().unwrap().level, 2);
        store.gain_xp(1).unwrap();
        assert_eq!(store.player().unwrap().level, 3);
        assert_eq!(store.player().unwrap().xp, 0);
    }

    #[tokio::test]
    async fn operations_need_an_active_game() {
        let kv = Arc::new(MemoryStore::new());
        let mut store = store_on(kv.clone());
        store.initialize_game().await;
        let ghost = ProjectId::new_random();
        assert_eq!(store.spend_money(usd(1)), Err(StoreError::NoActiveGame));
        assert_eq!(store.earn_money(usd(1)), Err(StoreError::NoActiveGame));
        assert_eq!(store.gain_xp(10), Err(StoreError::NoActiveGame));
        assert_eq!(store.create_project("X", "d"), Err(StoreError::NoActiveGame));
        assert_eq!(
            store.run_ad_campaign(ghost, usd(100)),
            Err(StoreError::NoActiveGame)
        );
        assert_eq!(
            store.save_tutorial_progress("dashboard"),
            Err(StoreError::NoActiveGame)
        );
        assert_eq!(
            store.unlock_achievement(ACHIEVEMENTS[0].to_achievement()),
            Err(StoreError::NoActiveGame)
        );
        assert!(store.select_project(ghost).is_none());
        assert!(store.finance_summary().is_none());
        store.saves.flush().await.unwrap();
        assert_eq!(kv.get_item(DEFAULT_SAVE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_project_defaults_and_selection() {
        let (mut store, _kv) = started().await;
        let a = store.create_project("A", "first").unwrap();
        let b = store.create_project("B", "second").unwrap();
        assert_ne!(a, b);
        assert_eq!(store.current_project().unwrap().id, b);
        let project = store.project(a).unwrap();
        assert_eq!(project.stage, ProjectStage::Ideation);
        assert_eq!(project.quality, 50);
        assert_eq!(project.revenue.mrr, Decimal::ZERO);
        let names: Vec<_> = store.projects().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[tokio::test]
    async fn selection_is_idempotent() {
        let (mut store, _kv) = started().await;
        let a = store.create_project("A", "").unwrap();
        store.create_project("B", "").unwrap();
        let once = store.select_project(a).map(|p| p.id);
        let twice = store.select_project(a).map(|p| p.id);
        assert_eq!(once, Some(a));
        assert_eq!(once, twice);
        assert!(store.select_project(ProjectId::new_random()).is_none());
        assert!(store.current_project().is_none());
    }

    #[tokio::test]
    async fn update_project_merges_and_validates() {
        let (mut store, _kv) = started().await;
        let id = store.create_project("X", "d").unwrap();
        store
            .update_project(
                id,
                ProjectUpdate::new()
                    .with_stage(ProjectStage::Launched)
                    .with_description("shipped"),
            )
            .unwrap();
        let project = store.project(id).unwrap();
        assert_eq!(project.stage, ProjectStage::Launched);
        assert_eq!(project.description, "shipped");
        assert_eq!(project.name, "X");
        // The selection follows the live project, not a stale copy.
        assert_eq!(store.current_project().unwrap().stage, ProjectStage::Launched);

        assert!(matches!(
            store.update_project(id, ProjectUpdate::new().with_quality(101)),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(store.project(id).unwrap().quality, 50);
        let ghost = ProjectId::new_random();
        assert_eq!(
            store.update_project(ghost, ProjectUpdate::new()),
            Err(StoreError::ProjectNotFound(ghost))
        );
    }

    #[tokio::test]
    async fn costs_feed_finance_summary() {
        let (mut store, _kv) = started().await;
        let id = store.create_project("X", "d").unwrap();
        store.run_ad_campaign(id, usd(100)).unwrap();
        store
            .record_project_cost(id, CostCategory::Infrastructure, usd(50))
            .unwrap();
        assert_eq!(
            store.record_project_cost(id, CostCategory::Development, usd(-5)),
            Err(StoreError::InvalidAmount(usd(-5)))
        );
        let costs = &store.project(id).unwrap().costs;
        assert_eq!(costs.total, usd(150));
        assert_eq!(costs.infrastructure, usd(50));

        let summary = store.finance_summary().unwrap();
        assert_eq!(summary.total_mrr, usd(25_000));
        assert_eq!(summary.total_costs, usd(150));
        assert_eq!(summary.profit, usd(24_850));
        assert_eq!(summary.burn_rate_per_day, usd(5));
        assert_eq!(summary.runway_days, Some(980));
    }

    #[tokio::test]
    async fn achievements_append_with_timestamp() {
        let (mut store, _kv) = started().await;
        let first = ACHIEVEMENTS[0].to_achievement();
        store.unlock_achievement(first.clone()).unwrap();
        store.unlock_achievement(first).unwrap();
        let achievements = &store.player().unwrap().achievements;
        assert_eq!(achievements.len(), 2);
        assert!(achievements.iter().all(|a| a.unlocked && a.date.is_some()));
        assert!(store.has_achievement("first_launch"));
        assert!(!store.has_achievement("marketing_guru"));
    }

    #[tokio::test]
    async fn update_campaign_merges_fields() {
        let (mut store, _kv) = started().await;
        let id = store.create_project("X", "d").unwrap();
        let outcome = store.run_ad_campaign(id, usd(100)).unwrap();
        store
            .update_campaign(
                id,
                outcome.campaign_id,
                CampaignUpdate::new()
                    .with_status(CampaignStatus::Failed)
                    .with_name("Launch blast"),
            )
            .unwrap();
        let campaign = &store.project(id).unwrap().campaigns()[0];
        assert_eq!(campaign.status, CampaignStatus::Failed);
        assert_eq!(campaign.name, "Launch blast");
        assert_eq!(campaign.reach, 25_000);

        let ghost = CampaignId::new_random();
        assert_eq!(
            store.update_campaign(id, ghost, CampaignUpdate::new()),
            Err(StoreError::CampaignNotFound {
                project: id,
                campaign: ghost
            })
        );
    }

    #[tokio::test]
    async fn tutorial_progress_appends() {
        let (mut store, _kv) = started().await;
        store.save_tutorial_progress("dashboard").unwrap();
        store.save_tutorial_progress("advertising").unwrap();
        let tutorial = &store.player().unwrap().tutorial;
        assert_eq!(tutorial.completed, ["dashboard", "advertising"]);
        assert_eq!(tutorial.current, "advertising");
    }

    #[tokio::test]
    async fn initialize_reloads_saved_game() {
        let (mut store, kv) = started().await;
        let id = store.create_project("X", "d").unwrap();
        store.run_ad_campaign(id, usd(100)).unwrap();
        let expected = store.snapshot();
        store.close().await.unwrap();

        let mut reloaded = store_on(kv);
        assert!(reloaded.loading());
        assert!(!reloaded.initialized());
        reloaded.initialize_game().await;
        assert!(!reloaded.loading());
        assert!(reloaded.initialized());
        assert_eq!(reloaded.snapshot(), expected);
        assert_eq!(reloaded.current_project().unwrap().id, id);
    }

    #[tokio::test]
    async fn unreadable_save_is_treated_as_no_game() {
        let kv = Arc::new(MemoryStore::with_item(DEFAULT_SAVE_KEY, "{ definitely not json"));
        let mut store = store_on(kv);
        store.initialize_game().await;
        assert!(store.initialized());
        assert!(!store.loading());
        assert_eq!(store.state(), &GameState::NoGame);
    }

    #[tokio::test]
    async fn initialize_twice_reloads() {
        let (mut store, _kv) = started().await;
        store.spend_money(usd(1000)).unwrap();
        store.initialize_game().await;
        assert_eq!(store.player().unwrap().current_money, usd(4000));
        store.initialize_game().await;
        assert_eq!(store.player().unwrap().current_money, usd(4000));
    }

    #[tokio::test]
    async fn delete_save_clears_slot() {
        let (mut store, kv) = started().await;
        store.delete_save().await.unwrap();
        assert!(store.player().is_none());
        assert_eq!(kv.get_item(DEFAULT_SAVE_KEY).await.unwrap(), None);
    }

    proptest! {
        #[test]
        fn balance_never_negative(amounts in proptest::collection::vec(0i64..3_000, 1..40)) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let _guard = rt.enter();
            let mut store = store_on(Arc::new(MemoryStore::new()));
            store.create_player("Ada", usd(5000)).unwrap();
            for a in amounts {
                let before = store.player().unwrap().current_money;
                match store.spend_money(usd(a)) {
                    Ok(balance) => prop_assert_eq!(balance, before - usd(a)),
                    Err(e) => {
                        prop_assert!(usd(a) > before);
                        prop_assert!(matches!(e, StoreError::InsufficientFunds { .. }), "expected InsufficientFunds, got {:?}", e);
                        prop_assert_eq!(store.player().unwrap().current_money, before);
                    }
                }
                prop_assert!(store.player().unwrap().current_money >= Decimal::ZERO);
            }
        }

        #[test]
        fn level_rises_at_most_once_per_gain(gains in proptest::collection::vec(0u32..2_000, 1..30)) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let _guard = rt.enter();
            let mut store = store_on(Arc::new(MemoryStore::new()));
            store.create_player("Ada", usd(5000)).unwrap();
            for g in gains {
                let before = store.player().unwrap().level;
                let after = store.gain_xp(g).unwrap().level;
                prop_assert!(after == before || after == before + 1);
            }
        }
    }
}
