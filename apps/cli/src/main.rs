#![deny(warnings)]

//! Headless driver: loads or starts a game, runs ad campaigns and prints KPIs.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use game_core::{achievement_def, ProjectId, ProjectStage};
use game_store::{GameConfig, GameStore, ProjectUpdate, StoreError};
use persistence::{FileStore, KvStore, SaveWriter, SqliteStore};
use rust_decimal::Decimal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    save_dir: Option<PathBuf>,
    sqlite: Option<String>,
    name: Option<String>,
    money: Option<Decimal>,
    project: Option<String>,
    budget: Option<Decimal>,
    campaigns: u32,
    preview: Option<Decimal>,
    launch: bool,
    reset: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next().map(PathBuf::from),
            "--save-dir" => args.save_dir = it.next().map(PathBuf::from),
            "--sqlite" => args.sqlite = it.next(),
            "--name" => args.name = it.next(),
            "--money" => args.money = it.next().and_then(|s| s.parse().ok()),
            "--project" => args.project = it.next(),
            "--budget" => args.budget = it.next().and_then(|s| s.parse().ok()),
            "--campaigns" => args.campaigns = it.next().and_then(|s| s.parse().ok()).unwrap_or(0),
            "--preview" => args.preview = it.next().and_then(|s| s.parse().ok()),
            "--launch" => args.launch = true,
            "--reset" => args.reset = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    args
}

async fn open_store(args: &Args) -> Result<Arc<dyn KvStore>> {
    if let Some(url) = &args.sqlite {
        if let Some(path) = url.strip_prefix("sqlite://") {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
            }
        }
        let store = SqliteStore::connect(url)
            .await
            .with_context(|| format!("opening {url}"))?;
        info!(%url, "using sqlite save slots");
        return Ok(Arc::new(store));
    }
    let dir = args
        .save_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("./saves"));
    info!(dir = %dir.display(), "using file save slots");
    Ok(Arc::new(FileStore::new(dir)))
}

/// Project named `name`, or the current one, creating it if needed.
fn pick_project(store: &mut GameStore, name: Option<&str>) -> Result<ProjectId> {
    let existing = match name {
        Some(name) => store.projects().iter().find(|p| p.name == name).map(|p| p.id),
        None => store.current_project().map(|p| p.id),
    };
    let id = match existing {
        Some(id) => id,
        None => store.create_project(name.unwrap_or("First Project"), "")?,
    };
    store.select_project(id);
    Ok(id)
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args();
    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    info!(save_key = %config.save_key, "starting CLI");

    let kv = open_store(&args).await?;
    let (saves, mut failures) = SaveWriter::spawn(kv, config.save_key.clone());
    let mut store = GameStore::new(saves, config);
    store.initialize_game().await;
    if args.reset {
        store.delete_save().await?;
    }

    if store.player().is_none() {
        let name = args.name.as_deref().unwrap_or("Indie Hacker");
        let money = store
            .config()
            .clamp_starting_money(args.money.unwrap_or(Decimal::new(5_000, 0)));
        store.create_player(name, money)?;
    }
    let project_id = pick_project(&mut store, args.project.as_deref())?;

    if let Some(budget) = args.preview {
        let preview = game_econ::preview_ad_results(budget)?;
        println!(
            "Preview | budget: ${} | reach: {} | conversions: {} | expected MRR: ${}",
            budget, preview.reach, preview.conversions, preview.expected_mrr
        );
    }

    let budget = args.budget.unwrap_or(Decimal::new(100, 0));
    for n in 1..=args.campaigns {
        match store.run_ad_campaign(project_id, budget) {
            Ok(outcome) => {
                println!(
                    "Campaign {} | reach: {} | conversions: {} | +MRR: ${} | +XP: {}{} | balance: ${}",
                    n,
                    outcome.reach,
                    outcome.conversions,
                    outcome.mrr_gained,
                    outcome.xp_gained,
                    if outcome.leveled_up { " (level up)" } else { "" },
                    outcome.balance
                );
            }
            Err(e @ StoreError::InsufficientFunds { .. }) => {
                warn!(error = %e, "stopping campaigns");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if args.launch {
        store.update_project(
            project_id,
            ProjectUpdate::new().with_stage(ProjectStage::Launched),
        )?;
        if let Some(def) = achievement_def("first_launch") {
            if !store.has_achievement(def.id) {
                store.unlock_achievement(def.to_achievement())?;
                store.gain_xp(def.xp_reward)?;
            }
        }
    }

    if let Some(player) = store.player() {
        println!(
            "Player | {} | level: {} | xp: {}/{} | money: ${} | achievements: {}",
            player.name,
            player.level,
            player.xp,
            player.xp_threshold(),
            player.current_money,
            player.achievements.len()
        );
    }
    for project in store.projects() {
        println!(
            "Project | {} | stage: {:?} | quality: {} | MRR: ${} | customers: {} | campaigns: {} | costs: ${}",
            project.name,
            project.stage,
            project.quality,
            project.revenue.mrr,
            project.revenue.customers,
            project.campaigns().len(),
            project.costs.total
        );
    }
    if let Some(summary) = store.finance_summary() {
        let runway = summary
            .runway_days
            .map_or_else(|| "unlimited".to_string(), |d| format!("{d} days"));
        println!(
            "KPI | MRR: ${} | costs: ${} | profit: ${} | burn: ${}/day | runway: {}",
            summary.total_mrr,
            summary.total_costs,
            summary.profit,
            summary.burn_rate_per_day.round_dp(2),
            runway
        );
    }

    store.close().await?;
    let mut failed = 0usize;
    while let Ok(failure) = failures.try_recv() {
        warn!(key = %failure.key, message = %failure.message, "save failed");
        failed += 1;
    }
    if failed > 0 {
        anyhow::bail!("{failed} save(s) failed");
    }
    Ok(())
}
