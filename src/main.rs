use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use crossterm::event::KeyEventKind;
use tracing::info;

use pcdiag::app::{App, record_tick};
use pcdiag::config::{Config, load_config, load_config_from_path};
use pcdiag::event::{Event, EventHandler};
use pcdiag::export::export_to_path;
use pcdiag::logging::{self, LOG_FILE_NAME, LogSink};
use pcdiag::store::{COLUMNS, LogStore};
use pcdiag::system::collector::SysinfoCollector;
use pcdiag::system::sampler::Sampler;
use pcdiag::ui;

#[derive(Parser)]
#[command(
    name = "pcdiag",
    version,
    about = "System diagnostics dashboard with a local SQLite snapshot log"
)]
struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sampling period in milliseconds
    #[arg(long, global = true)]
    refresh_rate: Option<u64>,

    /// Directory holding the snapshot database
    #[arg(long, global = true)]
    db_dir: Option<PathBuf>,

    /// Database file name inside the directory
    #[arg(long, global = true)]
    db_file: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Sample and log without the dashboard until Ctrl-C
    Record {
        /// Stop after this many ticks
        #[arg(long)]
        count: Option<u64>,
    },
    /// Print every stored snapshot, oldest first
    Logs {
        /// Emit a JSON array instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write the stored snapshots as CSV
    Export {
        /// Output file; defaults to `storage.export_path`
        path: Option<PathBuf>,
    },
    /// Delete every stored snapshot
    Clear {
        /// Confirm the deletion
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli)?;

    match cli.command {
        None => run_dashboard(config).await,
        Some(command) => {
            logging::init(&config.logging, LogSink::Stderr)?;
            match command {
                Command::Record { count } => record(&config, count).await,
                Command::Logs { json } => print_logs(&config, json),
                Command::Export { path } => export(&config, path),
                Command::Clear { yes } => clear(&config, yes),
            }
        }
    }
}

fn load_config_for_cli(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_rate_ms = rate;
    }
    if let Some(ref dir) = cli.db_dir {
        config.storage.directory = dir.clone();
    }
    if let Some(ref file) = cli.db_file {
        config.storage.file_name = file.clone();
    }

    if config.general.refresh_rate_ms == 0 {
        return Err(eyre!("refresh rate must be greater than 0 ms"));
    }
    if config.storage.file_name.trim().is_empty() {
        return Err(eyre!("database file name must not be empty"));
    }

    Ok(config)
}

fn open_store(config: &Config) -> Result<LogStore> {
    let store = LogStore::open(
        &config.storage.resolved_directory(),
        &config.storage.file_name,
    )?;
    Ok(store)
}

async fn run_dashboard(config: Config) -> Result<()> {
    let storage_dir = config.storage.resolved_directory();
    logging::init(&config.logging, LogSink::File(storage_dir.join(LOG_FILE_NAME)))?;

    let store = open_store(&config)?;
    let sampler = Sampler::new(SysinfoCollector::new());
    let mut app = App::new(&config, sampler, store);

    // ratatui::init installs a panic hook that restores the terminal first
    let mut terminal = ratatui::init();
    let tick_rate = Duration::from_millis(config.general.refresh_rate_ms);
    let result = run(&mut terminal, &mut app, tick_rate).await;
    ratatui::restore();

    app.shutdown();
    result
}

async fn run(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let mut events = EventHandler::new(tick_rate);

    terminal.draw(|frame| ui::draw(frame, app))?;

    while app.running {
        let Some(event) = events.next().await else {
            break;
        };
        match event {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let action = app.map_key(key);
                app.dispatch(action);
            }
            Event::Tick => app.tick(),
            Event::Resize => {}
        }
        terminal.draw(|frame| ui::draw(frame, app))?;
    }

    Ok(())
}

async fn record(config: &Config, count: Option<u64>) -> Result<()> {
    if count == Some(0) {
        return Err(eyre!("--count must be greater than 0"));
    }

    let store = open_store(config)?;
    let mut sampler = Sampler::new(SysinfoCollector::new());
    let period = Duration::from_millis(config.general.refresh_rate_ms);
    let mut interval = tokio::time::interval(period);

    info!(
        path = %store.path().display(),
        period_ms = config.general.refresh_rate_ms,
        "recording snapshots"
    );

    let mut ticks = 0u64;
    let mut recorded = 0u64;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let tick = record_tick(&mut sampler, &store);
                ticks += 1;
                if tick.write_error.is_none() {
                    recorded += 1;
                }
                if count.is_some_and(|limit| ticks >= limit) {
                    break;
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.wrap_err("failed to listen for Ctrl-C")?;
                info!("interrupted");
                break;
            }
        }
    }

    info!(ticks, recorded, "recording stopped");
    Ok(())
}

fn print_logs(config: &Config, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let rows = store.list_all();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{:<19}  {:>11}  {:>11}  {:>11}  {:>13}  {:>13}",
        COLUMNS[0], COLUMNS[1], COLUMNS[2], COLUMNS[3], COLUMNS[4], COLUMNS[5]
    );
    for s in &rows {
        println!(
            "{:<19}  {:>11.1}  {:>11.1}  {:>11.2}  {:>13.2}  {:>13.2}",
            s.timestamp_text(),
            s.cpu_percent,
            s.ram_percent,
            s.ram_used_gb,
            s.bytes_sent_gb,
            s.bytes_recv_gb
        );
    }
    Ok(())
}

fn export(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let store = open_store(config)?;
    let path = path.unwrap_or_else(|| config.storage.resolved_export_path());
    let rows = export_to_path(&path, &store.list_all())
        .wrap_err_with(|| format!("failed to export to {}", path.display()))?;
    info!(rows, path = %path.display(), "logs exported");
    println!("Exported {rows} rows to {}", path.display());
    Ok(())
}

fn clear(config: &Config, yes: bool) -> Result<()> {
    if !yes {
        return Err(eyre!(
            "refusing to clear {} without --yes",
            config
                .storage
                .resolved_directory()
                .join(&config.storage.file_name)
                .display()
        ));
    }
    let store = open_store(config)?;
    let removed = store.len();
    store.clear_all()?;
    println!("Cleared {removed} rows from {}", store.path().display());
    Ok(())
}
