//! PLINKO: biased-walk Plinko outcome engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! restores the wallet from disk (or creates a fresh one), then either
//! runs a paced autoplay session or a Monte Carlo simulation, with
//! graceful shutdown on Ctrl+C.

use anyhow::Result;
use tracing::info;

use plinko::config::{self, AppConfig, RunMode};
use plinko::engine::rng::{from_entropy, seeded};
use plinko::engine::table::MultiplierTable;
use plinko::engine::{build_multiplier_table, OutcomeEngine};
use plinko::ledger::{Ledger, Wallet};
use plinko::session::AutoplaySession;
use plinko::simulation::Simulator;
use plinko::storage;

const BANNER: &str = r#"
 ____  _     ___ _   _ _  _____
|  _ \| |   |_ _| \ | | |/ / _ \
| |_) | |    | ||  \| | ' / | | |
|  __/| |___ | || |\  | . \ |_| |
|_|   |_____|___|_| \_|_|\_\___/

  Biased-walk outcome engine
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let explicit_config = std::env::var("PLINKO_CONFIG").ok();
    let cfg = AppConfig::load_selected(explicit_config.as_deref())?;
    let config_path = explicit_config.unwrap_or_else(|| config::DEFAULT_CONFIG_FILE.to_string());

    init_logging();

    println!("{BANNER}");
    info!(
        config = %config_path,
        mode = ?cfg.mode,
        board = %cfg.game.board(),
        wager = %cfg.game.wager(),
        "PLINKO starting up"
    );

    let table = build_multiplier_table(cfg.game.risk_tier, cfg.game.rows)?;
    let engine = OutcomeEngine::new(cfg.bias);

    match cfg.mode {
        RunMode::Autoplay => run_autoplay(&cfg, engine, table).await,
        RunMode::Simulate => run_simulation(&cfg, engine, table),
    }
}

async fn run_autoplay(
    cfg: &AppConfig,
    engine: OutcomeEngine,
    table: MultiplierTable,
) -> Result<()> {
    let state_file = cfg.wallet.state_file.as_str();

    // -- Restore or create wallet ------------------------------------------

    let mut wallet = match storage::load_wallet(Some(state_file))? {
        Some(state) => {
            info!(balance = %state.balance, games = state.game_count, "Resumed wallet");
            Wallet::from_state(state)
        }
        None => {
            let wallet = Wallet::new(cfg.wallet.initial_balance);
            info!(balance = %wallet.balance(), "Fresh wallet");
            wallet
        }
    };

    let mut rng = match cfg.autoplay.seed {
        Some(seed) => seeded(seed),
        None => from_entropy(),
    };

    let session = AutoplaySession::new(engine, table, cfg.game.wager())
        .with_rounds(cfg.autoplay.rounds)
        .with_ball_delay(cfg.autoplay.ball_delay())
        .with_state_file(state_file);

    info!("Entering autoplay. Press Ctrl+C to stop.");
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let report = session.run(&mut wallet, &mut rng, shutdown).await?;

    // Save final state
    storage::save_wallet(wallet.state(), Some(state_file))?;

    let stats = wallet.stats();
    info!(
        rounds = report.rounds_played,
        session_net = format!("${:.2}", report.net_result()),
        balance = format!("${:.2}", wallet.balance()),
        lifetime_games = wallet.game_count(),
        win_rate = format!("{:.1}%", stats.win_rate()),
        lifetime_net = format!("${:.2}", stats.net_game_result()),
        reason = ?report.stop_reason,
        "PLINKO shut down cleanly."
    );

    Ok(())
}

fn run_simulation(
    cfg: &AppConfig,
    engine: OutcomeEngine,
    table: MultiplierTable,
) -> Result<()> {
    let mut wallet = Wallet::new(cfg.simulation.initial_balance);
    let mut rng = match cfg.simulation.seed {
        Some(seed) => seeded(seed),
        None => from_entropy(),
    };

    let report = Simulator::new(engine).run(
        &table,
        cfg.game.wager(),
        cfg.simulation.rounds,
        &mut rng,
        &mut wallet,
    )?;

    println!("{report}");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("plinko=info"));

    let json_logging = std::env::var("PLINKO_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
