//! Command implementations. Each command loads the ledger, runs one coach
//! operation, saves if it wrote anything, and prints text or JSON.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use coach_core::{
    money, BudgetStatus, Coach, CoachingReport, FinanceStore, GoalProgress, GoalStatus, MonthKey,
    NewGoal, Recommendation,
};
use coach_ingest::{parse_transactions_csv, to_records};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{init_config, load_config, Config};
use crate::state::{ensure_coach_home, ledger_path, load_ledger, save_ledger};

/// Shared per-invocation context
pub struct Ctx {
    pub home: PathBuf,
    pub json: bool,
    pub config: Config,
}

impl Ctx {
    pub fn open(home: Option<&Path>, json: bool) -> Result<Self> {
        let home = ensure_coach_home(home)?;
        let config = load_config(&home)?;
        debug!(home = %home.display(), "using coach home");
        Ok(Self { home, json, config })
    }

    fn coach(&self, threshold: Option<Decimal>) -> Result<Coach<coach_core::MemoryStore>> {
        let settings = self.config.coach.settings(threshold)?;
        Ok(Coach::with_settings(load_ledger(&self.home)?, settings))
    }

    fn month_or_current(&self, month: Option<MonthKey>) -> Result<MonthKey> {
        match month {
            Some(m) => Ok(m),
            None => Ok(MonthKey::from_date(self.config.coach.today()?)),
        }
    }

    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value).context("serialize output")?);
        } else {
            human(value);
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub file: PathBuf,
    pub imported: usize,
    pub skipped: usize,
    pub categories: Vec<String>,
}

pub fn cmd_init(ctx: &Ctx) -> Result<()> {
    let wrote_config = init_config(&ctx.home)?;
    let ledger = ledger_path(&ctx.home);
    if !ledger.exists() {
        save_ledger(&ctx.home, &load_ledger(&ctx.home)?)?;
    }
    if wrote_config {
        println!("Wrote {}", crate::config::config_path(&ctx.home).display());
    } else {
        println!("Config already exists: {}", crate::config::config_path(&ctx.home).display());
    }
    println!("Ledger: {}", ledger.display());
    Ok(())
}

pub fn cmd_import(ctx: &Ctx, csv: &Path) -> Result<()> {
    let parsed = parse_transactions_csv(csv).with_context(|| format!("parsing {}", csv.display()))?;
    let imported = to_records(&parsed.rows);

    let mut ledger = load_ledger(&ctx.home)?;
    let categories: Vec<String> = imported.categories.iter().map(|c| c.key.clone()).collect();
    for category in imported.categories {
        ledger.register_category(category);
    }
    let count = imported.transactions.len();
    ledger.extend_transactions(imported.transactions);
    save_ledger(&ctx.home, &ledger)?;

    info!(
        file = %csv.display(),
        imported = count,
        skipped = parsed.skipped,
        "imported transactions"
    );

    let report = ImportReport {
        file: csv.to_path_buf(),
        imported: count,
        skipped: parsed.skipped,
        categories,
    };
    ctx.emit(&report, |r| {
        println!("Imported {} transactions from {}", r.imported, r.file.display());
        if r.skipped > 0 {
            println!("Skipped {} unreadable row(s)", r.skipped);
        }
        println!("Categories: {}", r.categories.join(", "));
    })
}

pub fn cmd_transactions(ctx: &Ctx, limit: usize, offset: usize) -> Result<()> {
    let txns = ctx.coach(None)?.recent_transactions(limit, offset)?;
    ctx.emit(&txns, |txns| {
        if txns.is_empty() {
            println!("No transactions to show. Run: coach import --csv <file>");
            return;
        }
        for t in txns {
            println!(
                "{}  ${:>10}  {:<20} ({})",
                t.timestamp.format("%Y-%m-%d %H:%M"),
                money(t.amount),
                t.category_key,
                t.raw_category.as_deref().unwrap_or("-")
            );
        }
    })
}

pub fn cmd_summary(ctx: &Ctx, month: Option<MonthKey>) -> Result<()> {
    let month = ctx.month_or_current(month)?;
    let summary = ctx.coach(None)?.monthly_summary(month)?;
    ctx.emit(&summary, |s| {
        println!("# Spending for {}\n", s.month);
        for c in &s.by_category {
            println!("  {:<24} ${:>10}", c.category_key, money(c.total));
        }
        println!("\n  {:<24} ${:>10}", "Total", money(s.total));
    })
}

pub fn cmd_trajectory(ctx: &Ctx, months: Option<i32>) -> Result<()> {
    let window = months.unwrap_or(ctx.config.coach.trajectory_months);
    let trajectory = ctx.coach(None)?.trajectory(window)?;
    ctx.emit(&trajectory, |t| {
        if t.months.is_empty() {
            println!("No transactions yet. Run: coach import --csv <file>");
            return;
        }
        println!("# Spending trajectory\n");
        for m in &t.months {
            println!("  {}  ${:>10}", m.month, money(m.total));
        }
        match &t.biggest_jump {
            Some(j) => {
                let pct = j
                    .pct_change
                    .map(|p| format!(" ({:+.1}%)", p.round_dp(1)))
                    .unwrap_or_default();
                println!(
                    "\nBiggest jump: {} {} -> {}: {}${}{}",
                    j.category_key,
                    j.from_month,
                    j.to_month,
                    if j.change < Decimal::ZERO { "-" } else { "+" },
                    money(j.abs_change),
                    pct
                );
            }
            None => println!("\nNot enough history to compare months."),
        }
    })
}

pub fn cmd_budget_set(
    ctx: &Ctx,
    category: &str,
    month: Option<MonthKey>,
    limit: Decimal,
) -> Result<()> {
    let month = ctx.month_or_current(month)?;
    let mut coach = ctx.coach(None)?;
    let budget = coach.set_budget(category, month, limit)?;
    save_ledger(&ctx.home, coach.store())?;
    ctx.emit(&budget, |b| {
        println!("Set {} budget for {} to ${}", b.category_key, b.month, money(b.limit));
    })
}

pub fn cmd_budget_list(ctx: &Ctx, month: Option<MonthKey>) -> Result<()> {
    let month = ctx.month_or_current(month)?;
    let statuses = ctx.coach(None)?.budget_statuses(month)?;
    ctx.emit(&statuses, |statuses| {
        if statuses.is_empty() {
            println!("No budgets for {month}. Run: coach budget set <category> <limit>");
            return;
        }
        println!("# Budgets for {month}\n");
        print_statuses(statuses);
    })
}

pub fn cmd_insights(ctx: &Ctx, month: Option<MonthKey>, threshold: Option<Decimal>) -> Result<()> {
    let month = ctx.month_or_current(month)?;
    let today = ctx.config.coach.today()?;
    let report = ctx.coach(threshold)?.monthly_report(month, today)?;
    ctx.emit(&report, print_report)
}

pub fn cmd_recommend(ctx: &Ctx, month: Option<MonthKey>) -> Result<()> {
    let month = ctx.month_or_current(month)?;
    let coach = ctx.coach(None)?;
    let statuses = coach.budget_statuses(month)?;
    let recs = coach_core::recommend(&statuses);
    ctx.emit(&recs, |recs| {
        if recs.is_empty() {
            println!("No reallocations needed for {month}.");
            return;
        }
        print_recommendations(recs);
    })
}

pub fn cmd_goal_add(
    ctx: &Ctx,
    name: &str,
    target: Decimal,
    by: NaiveDate,
    start: Option<NaiveDate>,
) -> Result<()> {
    let start_date = match start {
        Some(d) => d,
        None => ctx.config.coach.today()?,
    };
    let mut coach = ctx.coach(None)?;
    let goal = coach.create_goal(NewGoal {
        name: name.to_string(),
        target_amount: target,
        start_date,
        target_date: by,
    })?;
    save_ledger(&ctx.home, coach.store())?;
    ctx.emit(&goal, |g| {
        println!(
            "Created goal #{} '{}': ${} by {}",
            g.id,
            g.name,
            money(g.target_amount),
            g.target_date
        );
    })
}

pub fn cmd_goal_list(ctx: &Ctx, status: Option<GoalStatus>) -> Result<()> {
    let goals: Vec<_> = load_ledger(&ctx.home)?
        .goals()?
        .into_iter()
        .filter(|g| status.is_none_or(|s| g.status == s))
        .collect();
    ctx.emit(&goals, |goals| {
        if goals.is_empty() {
            println!(
                "No goals yet. Run: coach goal add --name <name> --target <amount> --by <date>"
            );
            return;
        }
        for g in goals {
            println!(
                "#{:<3} {:<24} ${:>10} / ${:>10}  by {}  [{}]",
                g.id,
                g.name,
                money(g.current_amount),
                money(g.target_amount),
                g.target_date,
                g.status
            );
        }
    })
}

pub fn cmd_goal_contribute(ctx: &Ctx, id: u64, amount: Decimal) -> Result<()> {
    let mut coach = ctx.coach(None)?;
    let goal = coach.contribute(id, amount)?;
    save_ledger(&ctx.home, coach.store())?;
    ctx.emit(&goal, |g| {
        println!(
            "Added ${} to '{}': ${} of ${} [{}]",
            money(amount),
            g.name,
            money(g.current_amount),
            money(g.target_amount),
            g.status
        );
    })
}

pub fn cmd_goal_progress(ctx: &Ctx) -> Result<()> {
    let today = ctx.config.coach.today()?;
    let progress = ctx.coach(None)?.goal_progress(today)?;
    ctx.emit(&progress, |progress: &Vec<GoalProgress>| {
        if progress.is_empty() {
            println!("No goals yet.");
        }
        for p in progress {
            println!("- {}", p.message);
        }
    })
}

fn print_statuses(statuses: &[BudgetStatus]) {
    for s in statuses {
        println!("  [{:<10}] {}", s.status.as_str(), s.message());
    }
}

fn print_recommendations(recs: &[Recommendation]) {
    for r in recs {
        println!("- {} {}", r.reason, r.action);
    }
}

fn print_report(report: &CoachingReport) {
    println!("# Coaching report for {}\n", report.month);
    println!("Total spent: ${}\n", money(report.total_spent));

    if !report.budget_statuses.is_empty() {
        println!("## Budgets\n");
        print_statuses(&report.budget_statuses);
        println!();
    }

    if !report.recommendations.is_empty() {
        println!("## Recommendations\n");
        print_recommendations(&report.recommendations);
        println!();
    }

    if let Some(highlight) = &report.goal_highlight {
        println!("{highlight}");
    }
}
