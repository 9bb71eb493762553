//! Cartel CLI
//!
//! Drives a local cartel economy: a deterministic demo scenario, member
//! key generation, and configuration validation.

use anyhow::{bail, Context, Result};
use cartel_core::types::ActionKind;
use cartel_crypto::authorization::sign_action;
use cartel_crypto::keys::KeyPair;
use cartel_engine::{EngineConfig, GameEngine};
use cartel_vault::{ActionRequest, Vault};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "cartel")]
#[command(version = "0.1.0")]
#[command(about = "Cartel economy engine - shares, raids, treasury, delegated execution", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a deterministic local scenario and print the resulting state
    Demo {
        /// TOML file overriding the default economy parameters
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate a member keypair
    Keygen {
        /// Hex-encoded 32-byte seed; random when omitted
        #[arg(long)]
        seed: Option<String>,
    },

    /// Validate an economy configuration file
    ConfigCheck {
        /// Path to the TOML file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Demo { config } => run_demo(config.as_deref()),
        Commands::Keygen { seed } => run_keygen(seed.as_deref()),
        Commands::ConfigCheck { path } => run_config_check(&path),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let config: EngineConfig =
        toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn run_demo(config_path: Option<&Path>) -> Result<()> {
    let config = match config_path {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };

    let operator = KeyPair::from_seed([0u8; 32]).address();
    let alice = KeyPair::from_seed([1u8; 32]);
    let bob = KeyPair::from_seed([2u8; 32]);
    let vault_identity = KeyPair::from_seed([3u8; 32]).address();

    let mut engine = GameEngine::new(operator, config.clone())?;
    let mut vault = Vault::new(vault_identity);
    engine.set_agent(operator, vault_identity, true)?;

    let day = 24 * 3600;
    let t0 = chrono::Utc::now().timestamp();

    for member in [&alice, &bob] {
        engine.fund_settlement(operator, member.address(), 1_000)?;
        engine.join(member.address(), None, t0)?;
    }

    let stolen = engine.raid(alice.address(), bob.address(), t0 + 60)?;
    tracing::info!(stolen, "alice raided bob");
    let outcome = engine.high_stakes_raid(bob.address(), alice.address(), t0 + 120)?;
    tracing::info!(
        stolen = outcome.stolen,
        self_penalty = outcome.self_penalty,
        "bob high-stakes-raided alice"
    );

    engine.sponsor_revenue(operator, 100)?;
    let summary = engine.distribute_daily_profits(t0 + day)?;
    tracing::info!(
        allocated = summary.allocated,
        dust = summary.dust,
        "daily profits distributed"
    );
    engine.claim_profit(alice.address())?;
    engine.claim_profit(bob.address())?;

    // Delegated raid: alice prepays, signs off-line, the relayer submits
    vault.deposit(&mut engine, alice.address(), 50)?;
    let deadline = t0 + day + 600;
    let request = ActionRequest {
        member: alice.address(),
        action: ActionKind::Raid,
        target: Some(bob.address()),
        deadline,
    };
    let signature = sign_action(
        &alice,
        vault.address(),
        ActionKind::Raid,
        Some(&bob.address()),
        vault.nonce_of(&alice.address()),
        deadline,
    );
    let fee = vault.execute_action(&mut engine, &request, &signature, t0 + day + 10)?;
    tracing::info!(fee, "delegated raid executed");

    // The identical signature is dead: the nonce it covered is consumed
    match vault.execute_action(&mut engine, &request, &signature, t0 + day + 20) {
        Err(err) => tracing::info!(%err, "replay correctly rejected"),
        Ok(_) => bail!("replay unexpectedly succeeded"),
    }

    let member_state = |engine: &GameEngine, vault: &Vault, keypair: &KeyPair| {
        let address = keypair.address();
        json!({
            "address": address,
            "shares": engine.balance_of(&address),
            "reputation": engine.reputation_of(&address),
            "settlement": engine.settlement_balance_of(&address),
            "pending_profit": engine.pending_profit(&address),
            "vault_balance": vault.vault_balance_of(&address),
            "nonce": vault.nonce_of(&address),
        })
    };

    let treasury = engine.treasury();
    let report = json!({
        "config": config,
        "alice": member_state(&engine, &vault, &alice),
        "bob": member_state(&engine, &vault, &bob),
        "treasury": {
            "settlement_balance": treasury.settlement_balance(),
            "daily_revenue_pool": treasury.daily_revenue_pool(),
            "total_fees_collected": treasury.total_fees_collected(),
            "total_sponsor_revenue": treasury.total_sponsor_revenue(),
            "total_claims_paid": treasury.total_claims_paid(),
            "total_payouts": treasury.total_payouts(),
        },
        "total_supply": engine.total_supply(),
        "events": engine.events(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_keygen(seed_hex: Option<&str>) -> Result<()> {
    let seed: [u8; 32] = match seed_hex {
        Some(s) => {
            let bytes = hex::decode(s).context("seed must be hex")?;
            match bytes.try_into() {
                Ok(seed) => seed,
                Err(_) => bail!("seed must be exactly 32 bytes"),
            }
        }
        None => rand::random(),
    };

    let keypair = KeyPair::from_seed(seed);
    let output = json!({
        "address": keypair.address(),
        "seed": hex::encode(seed),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_config_check(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    tracing::info!("configuration is valid");
    Ok(())
}
