//! `carryover` command-line entry point.
//!
//! # Responsibility
//! - Wire database, configuration, logging and notices into `CarryService`.
//! - Offer one-shot runs, a blocking watch loop, and small page utilities.
//!
//! # Invariants
//! - The watch loop never exits on a failed tick.
//! - Logging is only initialized when `--log-dir` is given.

use anyhow::{anyhow, bail, Context, Result};
use carryover_core::db::open_db;
use carryover_core::journal_day::{
    journal_day, parse_iso_date, parse_journal_page_name, today_local,
};
use carryover_core::{
    default_log_level, init_logging, load_config, load_config_or_default, save_config,
    BlockPlacement, CarryConfig, CarryService, JournalRepository, LogNotifier, PageKind,
    RunOutcome, SqliteJournalRepository,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "carryover",
    version,
    about = "Carries open TODO blocks into today's journal page"
)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, default_value = "carryover.db")]
    db: PathBuf,
    /// TOML settings file
    #[arg(long, global = true, default_value = "carryover.toml")]
    config: PathBuf,
    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the carry-over once
    Run {
        /// Treat this YYYY-MM-DD date as today
        #[arg(long)]
        date: Option<String>,
    },
    /// Run the carry-over on every configured interval
    Watch {
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// Print a page as an indented outline
    Show {
        /// Page name, or a YYYY-MM-DD journal date
        page: String,
    },
    /// Append a block to a page, creating the page if needed
    Add {
        page: String,
        content: String,
        /// Append as last child of this block
        #[arg(long)]
        parent: Option<Uuid>,
        /// Create a missing page as a template instead of a journal page
        #[arg(long)]
        template: bool,
    },
    /// Write a settings file with default values
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    start_logging(&cli)?;

    match &cli.command {
        Command::Run { date } => {
            let today = match date {
                Some(value) => parse_iso_date(value)
                    .ok_or_else(|| anyhow!("invalid --date `{value}`, expected YYYY-MM-DD"))?,
                None => today_local(),
            };
            run_once(&cli, today)
        }
        Command::Watch { ticks } => watch(&cli, *ticks),
        Command::Show { page } => show(&cli, page),
        Command::Add {
            page,
            content,
            parent,
            template,
        } => add(&cli, page, content, *parent, *template),
        Command::InitConfig { force } => init_config(&cli.config, *force),
    }
}

fn start_logging(cli: &Cli) -> Result<()> {
    let Some(log_dir) = &cli.log_dir else {
        return Ok(());
    };
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    let log_dir = log_dir
        .to_str()
        .ok_or_else(|| anyhow!("log dir `{}` is not valid UTF-8", log_dir.display()))?;
    init_logging(level, log_dir, true).context("failed to initialize logging")?;
    Ok(())
}

fn run_once(cli: &Cli, today: NaiveDate) -> Result<()> {
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load config `{}`", cli.config.display()))?;
    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let repo = SqliteJournalRepository::try_new(&conn)?;
    let service = CarryService::new(repo, config, LogNotifier);

    let outcome = service.run(today).context("carry-over run failed")?;
    println!("{}", describe_outcome(&outcome));
    Ok(())
}

fn watch(cli: &Cli, ticks: Option<u64>) -> Result<()> {
    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let repo = SqliteJournalRepository::try_new(&conn)?;
    let mut service = CarryService::new(repo, load_config_or_default(&cli.config), LogNotifier);
    info!(
        "event=watch_start module=cli status=ok interval_secs={}",
        service.config().interval().as_secs()
    );

    let mut tick = 0u64;
    loop {
        let today = today_local();
        let next = load_config_or_default(&cli.config);
        if &next != service.config() {
            match service.apply_config_change(next, today) {
                Ok(rewritten) => info!(
                    "event=watch_reload module=cli status=ok rewritten={}",
                    rewritten
                ),
                Err(err) => error!(
                    "event=watch_reload module=cli status=error error={}",
                    err
                ),
            }
        }

        if let Some(outcome) = service.tick(today) {
            println!("{}", describe_outcome(&outcome));
        }

        tick += 1;
        if ticks.is_some_and(|limit| tick >= limit) {
            return Ok(());
        }
        std::thread::sleep(service.config().interval());
    }
}

fn show(cli: &Cli, page: &str) -> Result<()> {
    let config = load_config_or_default(&cli.config);
    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let repo = SqliteJournalRepository::try_new(&conn)?;

    let found = match repo.get_page_by_name(page)? {
        Some(found) => Some(found),
        None => match journal_date_of(page, &config) {
            Some(date) => repo.get_journal_page(journal_day(date))?,
            None => None,
        },
    };
    let Some(found) = found else {
        bail!("page `{page}` not found");
    };

    print!("{}", repo.get_tree(found.page_uuid)?.render());
    Ok(())
}

fn add(
    cli: &Cli,
    page: &str,
    content: &str,
    parent: Option<Uuid>,
    template: bool,
) -> Result<()> {
    let config = load_config_or_default(&cli.config);
    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let repo = SqliteJournalRepository::try_new(&conn)?;

    let target = match repo.get_page_by_name(page)? {
        Some(existing) => existing,
        None if template => repo.create_page(page, PageKind::Template, None, false)?,
        None => {
            let date = journal_date_of(page, &config).ok_or_else(|| {
                anyhow!(
                    "page `{page}` does not exist and is not a journal date under `{}`; pass --template to create a template page",
                    config.page_name_format
                )
            })?;
            let day = journal_day(date);
            match repo.get_journal_page(day)? {
                Some(existing) => existing,
                None => repo.create_page(page, PageKind::Journal, Some(day), false)?,
            }
        }
    };

    let placement = if parent.is_some() {
        BlockPlacement::LastChild
    } else {
        BlockPlacement::PageEnd
    };
    let block = repo.create_block(target.page_uuid, parent, content, placement)?;
    println!("{}", block.block_uuid);
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "config `{}` already exists; pass --force to overwrite",
            path.display()
        );
    }
    save_config(path, &CarryConfig::default())
        .with_context(|| format!("failed to write config `{}`", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

fn journal_date_of(name: &str, config: &CarryConfig) -> Option<NaiveDate> {
    parse_journal_page_name(name, &config.page_name_format).or_else(|| parse_iso_date(name))
}

fn describe_outcome(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::AlreadyDone => "already done for today".to_string(),
        RunOutcome::AlreadyClaimed => "another run already claimed today".to_string(),
        RunOutcome::MarkerOnly => "marked today; no earlier journal page to carry from".to_string(),
        RunOutcome::Transferred {
            source_name,
            groups,
            copied,
            pruned,
            ..
        } => format!(
            "carried {groups} group(s) from {source_name}: created={} updated={} pruned={}",
            copied.created, copied.updated, pruned.deleted
        ),
    }
}
