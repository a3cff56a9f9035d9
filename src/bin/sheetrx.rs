use std::io;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{bail, eyre};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{error, info};

use sheetrx::config::Config;
use sheetrx::core::state::ViewState;
use sheetrx::core::types::{ExecutionResult, Toast};
use sheetrx::logging::LogLevel;
use sheetrx::render::render_report_html;
use sheetrx::services::{ApiClient, Session};
use sheetrx::tui::{App, KeyBindings, Theme};

/// Natural-language find/replace over CSV and Excel files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Path to a config file (overrides ~/.sheetrx-config.json5)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    /// Base URL of the API, e.g. http://localhost:8000/api
    #[arg(long = "api-base", value_name = "URL")]
    api_base: Option<String>,
    /// Upload this file on start
    #[arg(long = "file", value_name = "PATH")]
    file: Option<PathBuf>,
    /// Instruction to run (pre-filled in the terminal UI)
    #[arg(long = "instruction", value_name = "TEXT")]
    instruction: Option<String>,
    /// Run non-interactively: upload, execute, write outputs, exit
    #[arg(long = "batch", requires_all = ["file", "instruction"])]
    batch: bool,
    /// Enable auto-chain; passing the flag counts as confirmation
    #[arg(long = "auto-chain")]
    auto_chain: bool,
    /// Write an HTML report (batch mode)
    #[arg(long = "html", value_name = "PATH", requires = "batch")]
    html: Option<PathBuf>,
    /// Save the server-side CSV of a replace (batch mode)
    #[arg(long = "download", value_name = "PATH", requires = "batch")]
    download: Option<PathBuf>,
    /// Write the preview rows as CSV (batch mode)
    #[arg(long = "export-csv", value_name = "PATH", requires = "batch")]
    export_csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    sheetrx::logging::init_with(None, args.logging.map(Into::into))?;

    let mut config = Config::from_path(args.config.as_ref())?;
    if let Some(base) = &args.api_base {
        config.api_base = base.clone();
    }
    info!("Using API at {}", config.api_base);

    let mut state = ViewState::new(config.page_size, config.page_sizes.clone());
    state.auto_chain = config.auto_chain || args.auto_chain;
    state.show_hits_only = config.show_hits_only;
    if let Some(text) = &args.instruction {
        state.instruction = text.clone();
    }
    let client = ApiClient::new(&config.api())?;
    let mut session = Session::new(client, state);

    if args.batch {
        return run_batch(&mut session, &args).await;
    }

    let keybindings = match &config.keybindings_path {
        Some(path) => KeyBindings::load_from_file(path)?,
        None => KeyBindings::default(),
    };
    for warning in keybindings.validate() {
        tracing::warn!("Keybindings: {}", warning);
    }
    let mut app = App::new(
        session,
        keybindings,
        Theme::from_name(config.theme),
        config.toast_ticks,
    );
    if let Some(file) = args.file.clone() {
        app.start_upload(file);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    if let Err(e) = &res {
        error!("Error: {e:?}");
    }
    res
}

fn print_toasts(toasts: Vec<Toast>) {
    for toast in toasts {
        eprintln!("[{}] {}", toast.level, toast.message);
    }
}

async fn run_batch(session: &mut Session, args: &Args) -> Result<()> {
    let file = args.file.as_ref().ok_or_else(|| eyre!("--batch needs --file"))?;
    let instruction = args
        .instruction
        .as_deref()
        .ok_or_else(|| eyre!("--batch needs --instruction"))?;

    let uploaded = session.upload(file).await;
    print_toasts(session.state.drain_toasts());
    if !uploaded {
        bail!("upload of {} failed", file.display());
    }

    let executed = session.execute(instruction).await;
    print_toasts(session.state.drain_toasts());
    if !executed {
        bail!("instruction failed: {}", instruction);
    }

    if let Some(view) = &session.state.result {
        println!("mode: {}", view.mode());
        if let Some(p) = &view.pattern {
            println!("regex: {}", p);
        }
        if !view.row_filter.is_empty() {
            println!("row filter: {}", view.row_filter);
        }
        match &view.result {
            ExecutionResult::Find(find) => {
                println!("matches: {}", find.stats.total_matches);
                for (col, n) in &find.stats.per_column {
                    println!("  {}: {}", col, n);
                }
            }
            ExecutionResult::Replace(replace) => {
                println!("replacements: {}", replace.replacements_count);
                if let Some(url) = &replace.download_url {
                    println!("download: {}", url);
                }
            }
        }
    }

    if let Some(path) = &args.html {
        std::fs::write(path, render_report_html(&session.state))?;
        println!("report: {}", path.display());
    }
    if let Some(path) = &args.export_csv {
        let rows = session.export_preview_csv(path)?;
        println!("exported {} rows: {}", rows, path.display());
    }
    if let Some(path) = &args.download {
        let bytes = session.download_result(path).await?;
        println!("downloaded {} bytes: {}", bytes, path.display());
    }
    Ok(())
}
