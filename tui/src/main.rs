//! PolicyBot TUI Entry Point
//!
//! Launches the terminal UI for PolicyBot.
//!
//! Usage:
//!   policybot [OPTIONS]
//!
//! Options:
//!   --config <PATH>         Config file (default: ~/.config/policybot/policybot.toml)
//!   --base-url <URL>        Backend origin override
//!   --surface chat|manager  Which surface to run (default: chat)
//!   --dark                  Start in the dark theme
//!   --purge-index           Also remove index entries when deleting documents

use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use policybot_core::{
    load_config_from_path, ConfigOverrides, DeletePolicy, Dispatcher, DocsService, HttpBackend,
    PolicyBotConfig, Theme,
};
use policybot_tui::App;

/// Which surface to run
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum SurfaceArg {
    /// Chat and upload tabs with a document sidebar
    #[default]
    Chat,
    /// Standalone document manager
    Manager,
}

#[derive(Parser, Debug)]
#[command(name = "policybot", version, about = "Chat with your policy documents")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Backend origin, e.g. http://localhost:8080
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Which surface to run
    #[arg(long, value_enum, default_value_t = SurfaceArg::Chat)]
    surface: SurfaceArg,

    /// Start in the dark theme
    #[arg(long)]
    dark: bool,

    /// Also remove a document's index entries when deleting it
    #[arg(long)]
    purge_index: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ref url) = self.base_url {
            overrides = overrides.with_base_url(url.clone());
        }
        if self.dark {
            overrides = overrides.with_theme(Theme::Dark);
        }
        if self.purge_index {
            overrides = overrides.with_delete_policy(DeletePolicy::RecordAndIndex);
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging (stderr, filtered by RUST_LOG)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config = load_config_from_path(cli.config.clone())?;
    cli.overrides().apply(&mut config)?;
    tracing::info!(
        base_url = %config.backend.base_url,
        source = %config.source(),
        delete_policy = ?config.delete_policy,
        "Configuration loaded"
    );

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: policybot requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  - Running in a non-interactive environment (CI, container)");
        eprintln!("  - SSH without -t flag");
        eprintln!("  - Piped stdin/stdout");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &config, cli.surface).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &PolicyBotConfig,
    surface: SurfaceArg,
) -> anyhow::Result<()> {
    let backend = HttpBackend::from_config(&config.backend)?;
    let (dispatcher, mut completions) =
        Dispatcher::new(DocsService::new(backend, config.service()));

    let mut app = match surface {
        SurfaceArg::Chat => App::chat(&config.ui),
        SurfaceArg::Manager => App::manager(&config.ui),
    };
    app.run(terminal, &dispatcher, &mut completions).await
}
