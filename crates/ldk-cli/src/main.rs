use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::Desk;

#[derive(Parser)]
#[command(name = "ldk")]
#[command(about = "LumberDesk trade reconciliation and landed-cost pricing", long_about = None)]
struct Cli {
    /// Directory holding buys/sells/lanes/quotes as JSON (default: $LDK_STATE_DIR or ./state)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Layered config paths in merge order (base -> desk -> local)
    #[arg(long = "config", global = true)]
    config_paths: Vec<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Merge trades and mill quotes from JSON files into the state directory
    Import {
        #[arg(long)]
        buys: Option<PathBuf>,
        #[arg(long)]
        sells: Option<PathBuf>,
        #[arg(long)]
        quotes: Option<PathBuf>,
    },

    /// Over-sold orders, short sells and duplicate buy keys
    Reconcile {
        /// Exit non-zero unless the book is clean
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// Net position per product and length
    Positions,

    /// P&L breakdown by dimension
    Pnl {
        /// product | trader | region | customer | mill | month
        #[arg(long, default_value = "product")]
        group_by: String,
        /// 7d | 14d | 30d | 90d | mtd | ytd | all
        #[arg(long, default_value = "30d")]
        period: String,
        /// Reporting date (YYYY-MM-DD); defaults to today (UTC)
        #[arg(long)]
        today: Option<String>,
    },

    /// Matched trades with per-trade P&L, newest first
    Trades {
        #[arg(long, default_value = "30d")]
        period: String,
        #[arg(long)]
        today: Option<String>,
    },

    /// Suggest buys for a short sell, or confirm one
    Match {
        #[arg(long)]
        sell: String,
        /// Link the sell to this buy and save
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Cached freight lanes
    Lanes {
        #[command(subcommand)]
        cmd: LanesCmd,
    },

    /// Freight per MBF (and landed cost) for one lane
    Freight {
        #[arg(long)]
        miles: f64,
        #[arg(long)]
        origin: String,
        #[arg(long, default_value_t = false)]
        msr: bool,
        /// FOB mill price to add freight to
        #[arg(long)]
        fob: Option<f64>,
    },

    /// Rank mill quotes for a product delivered to a destination
    Quote {
        /// Free-text product, e.g. "2x4 16' #2"
        #[arg(long)]
        product: String,
        #[arg(long)]
        dest: String,
        /// Overrides the length parsed from the product text
        #[arg(long)]
        length: Option<String>,
        /// Look up missing lane mileage over the network before pricing
        #[arg(long, default_value_t = false)]
        resolve: bool,
    },
}

#[derive(Subcommand)]
enum LanesCmd {
    List,
    /// Record a lane by hand (replaces the miles of an existing lane)
    Add {
        origin: String,
        dest: String,
        miles: f64,
    },
    /// Resolve one lane through the mileage chain and cache it
    Lookup { origin: String, dest: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => commands::config_hash(&paths),
        cmd => {
            let state_dir = cli
                .state_dir
                .or_else(|| std::env::var_os("LDK_STATE_DIR").map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("state"));
            let mut desk = Desk::open(state_dir, &cli.config_paths)?;
            run(cmd, &mut desk).await
        }
    }
}

async fn run(cmd: Commands, desk: &mut Desk) -> Result<()> {
    match cmd {
        Commands::ConfigHash { paths } => commands::config_hash(&paths),
        Commands::Import {
            buys,
            sells,
            quotes,
        } => commands::book::import(desk, buys, sells, quotes),
        Commands::Reconcile { strict } => commands::book::reconcile(desk, strict),
        Commands::Positions => commands::book::positions(desk),
        Commands::Pnl {
            group_by,
            period,
            today,
        } => commands::book::pnl(desk, &group_by, &period, today.as_deref()),
        Commands::Trades { period, today } => commands::book::trades(desk, &period, today.as_deref()),
        Commands::Match { sell, confirm } => {
            commands::book::match_short(desk, &sell, confirm.as_deref())
        }
        Commands::Lanes { cmd } => match cmd {
            LanesCmd::List => commands::pricing::lanes_list(desk),
            LanesCmd::Add {
                origin,
                dest,
                miles,
            } => commands::pricing::lanes_add(desk, &origin, &dest, miles),
            LanesCmd::Lookup { origin, dest } => {
                commands::pricing::lanes_lookup(desk, &origin, &dest).await
            }
        },
        Commands::Freight {
            miles,
            origin,
            msr,
            fob,
        } => commands::pricing::freight(desk, miles, &origin, msr, fob),
        Commands::Quote {
            product,
            dest,
            length,
            resolve,
        } => commands::pricing::quote(desk, &product, &dest, length.as_deref(), resolve).await,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
