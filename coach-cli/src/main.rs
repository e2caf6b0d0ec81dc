use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use coach_core::{GoalStatus, MonthKey};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod state;


use commands::Ctx;

#[derive(Parser, Debug)]
#[command(
    name = "coach",
    version,
    about = "Personal finance coach: budgets, trends, and savings goals"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// State directory (default: $COACH_HOME or ~/.coach)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default config and an empty ledger
    Init,

    /// Import a `date,category,amount` CSV export into the ledger
    Import {
        #[arg(long)]
        csv: PathBuf,
    },

    /// Imported transactions, newest first
    Transactions {
        /// Rows per page
        #[arg(long, default_value_t = 50)]
        limit: usize,

        /// Rows to skip from the newest
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Per-category spend for one month
    Summary {
        /// Month as YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<MonthKey>,
    },

    /// Month-by-month totals and the biggest category jump
    Trajectory {
        /// Number of most recent months to keep; 0 or less keeps all (default from config)
        #[arg(long, allow_negative_numbers = true)]
        months: Option<i32>,
    },

    /// Monthly category budgets
    Budget {
        #[command(subcommand)]
        command: BudgetCommand,
    },

    /// Full coaching report: budgets, recommendations, top goal
    Insights {
        #[arg(long)]
        month: Option<MonthKey>,

        /// Near-limit threshold in (0, 1], overriding config.toml
        #[arg(long)]
        threshold: Option<Decimal>,
    },

    /// Budget reallocation suggestions only
    Recommend {
        #[arg(long)]
        month: Option<MonthKey>,
    },

    /// Savings goals
    Goal {
        #[command(subcommand)]
        command: GoalCommand,
    },
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    /// Create or replace a category's limit for a month
    Set {
        category: String,
        limit: Decimal,

        #[arg(long)]
        month: Option<MonthKey>,
    },

    /// Show budgets and their status for a month
    List {
        #[arg(long)]
        month: Option<MonthKey>,
    },
}

#[derive(Subcommand, Debug)]
enum GoalCommand {
    Add {
        #[arg(long)]
        name: String,

        /// Target amount
        #[arg(long)]
        target: Decimal,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        by: NaiveDate,

        /// Start date (default: today)
        #[arg(long)]
        start: Option<NaiveDate>,
    },

    List {
        /// Only goals with this status (active, completed, paused)
        #[arg(long)]
        status: Option<GoalStatus>,
    },

    /// Add money to a goal
    Contribute {
        id: u64,
        amount: Decimal,
    },

    /// Pacing for every goal
    Progress,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG > --verbose > info
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let ctx = Ctx::open(cli.home.as_deref(), cli.json)?;

    match cli.command {
        Command::Init => commands::cmd_init(&ctx),
        Command::Import { csv } => commands::cmd_import(&ctx, &csv),
        Command::Transactions { limit, offset } => {
            commands::cmd_transactions(&ctx, limit, offset)
        }
        Command::Summary { month } => commands::cmd_summary(&ctx, month),
        Command::Trajectory { months } => commands::cmd_trajectory(&ctx, months),
        Command::Budget { command } => match command {
            BudgetCommand::Set {
                category,
                limit,
                month,
            } => commands::cmd_budget_set(&ctx, &category, month, limit),
            BudgetCommand::List { month } => commands::cmd_budget_list(&ctx, month),
        },
        Command::Insights { month, threshold } => commands::cmd_insights(&ctx, month, threshold),
        Command::Recommend { month } => commands::cmd_recommend(&ctx, month),
        Command::Goal { command } => match command {
            GoalCommand::Add {
                name,
                target,
                by,
                start,
            } => commands::cmd_goal_add(&ctx, &name, target, by, start),
            GoalCommand::List { status } => commands::cmd_goal_list(&ctx, status),
            GoalCommand::Contribute { id, amount } => {
                commands::cmd_goal_contribute(&ctx, id, amount)
            }
            GoalCommand::Progress => commands::cmd_goal_progress(&ctx),
        },
    }
}
