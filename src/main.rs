use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Terminal,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rabbitwatch::app::{App, View};
use rabbitwatch::config::{CliOverrides, Settings};
use rabbitwatch::duration::parse_duration;
use rabbitwatch::health::ClusterHealth;
use rabbitwatch::source::{DataSource, FileSource, ManagementSource};
use rabbitwatch::ui::{self, Theme};
use rabbitwatch::{events, export};

/// How often the UI checks a background source for a new snapshot.
const UI_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeChoice {
    Auto,
    Dark,
    Light,
}

#[derive(Parser, Debug)]
#[command(name = "rabbitwatch")]
#[command(about = "Health classification and triage TUI for RabbitMQ clusters")]
#[command(version)]
struct Args {
    /// TOML config file (management endpoint, thresholds, refresh)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Management API base URL, e.g. http://localhost:15672
    #[arg(long)]
    endpoint: Option<String>,

    /// Management API user
    #[arg(short, long)]
    username: Option<String>,

    /// Management API password
    #[arg(short, long)]
    password: Option<String>,

    /// Read a snapshot JSON file instead of polling the management API
    #[arg(short, long, conflicts_with_all = ["endpoint", "dump"])]
    file: Option<PathBuf>,

    /// Poll interval (e.g., "5s", "500ms")
    #[arg(short, long, value_parser = parse_duration)]
    refresh: Option<Duration>,

    /// Management API request timeout (e.g., "10s")
    #[arg(long, value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Classify once, write the JSON report to this path and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Collect once, write the raw snapshot to this path and exit
    #[arg(long, conflicts_with = "export")]
    dump: Option<PathBuf>,

    /// Write logs to this file while the TUI is running
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Color theme
    #[arg(long, value_enum, default_value_t = ThemeChoice::Auto)]
    theme: ThemeChoice,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            endpoint: self.endpoint.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            timeout: self.timeout,
            refresh: self.refresh,
        }
    }

    fn interactive(&self) -> bool {
        self.export.is_none() && self.dump.is_none()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let mut settings = Settings::load(args.config.as_deref())?;
    args.overrides().apply(&mut settings);
    settings.validate()?;

    if let Some(ref path) = args.dump {
        return dump_to_file(&settings, path);
    }

    if let Some(ref path) = args.export {
        return export_to_file(&settings, args.file.as_deref(), path);
    }

    let theme = match args.theme {
        ThemeChoice::Auto => Theme::auto_detect(),
        ThemeChoice::Dark => Theme::dark(),
        ThemeChoice::Light => Theme::light(),
    };

    match args.file {
        Some(ref path) => {
            info!(path = %path.display(), "watching snapshot file");
            let source = Box::new(FileSource::new(path));
            run_tui(source, &settings, theme, settings.refresh.min(Duration::from_secs(1)))
        }
        None => run_with_management(&settings, theme),
    }
}

/// Logs go to stderr in one-shot modes. The TUI owns the terminal, so it
/// only logs when given a file.
fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if !args.interactive() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else if let Some(ref path) = args.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

/// Poll the management API from a background task while the TUI runs.
fn run_with_management(settings: &Settings, theme: Theme) -> Result<()> {
    let client = settings.management.client()?;
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let source = Box::new(ManagementSource::spawn(client, settings.refresh));
    run_tui(source, settings, theme, UI_POLL_INTERVAL)
}

/// Collect one snapshot from the management API.
fn collect_once(settings: &Settings) -> Result<rabbitwatch::ClusterSnapshot> {
    let client = settings.management.client()?;
    let rt = tokio::runtime::Runtime::new()?;
    info!(endpoint = client.endpoint(), "collecting snapshot");
    rt.block_on(client.collect())
        .with_context(|| format!("failed to collect from {}", client.endpoint()))
}

fn dump_to_file(settings: &Settings, path: &Path) -> Result<()> {
    let snapshot = collect_once(settings)?;
    export::write_snapshot(&snapshot, path)?;
    println!("Wrote snapshot to: {}", path.display());
    Ok(())
}

fn export_to_file(settings: &Settings, file: Option<&Path>, path: &Path) -> Result<()> {
    let health = match file {
        Some(file) => ClusterHealth::load(file, &settings.thresholds)?,
        None => ClusterHealth::from_snapshot(&collect_once(settings)?, &settings.thresholds),
    };
    export::write_report(&health, settings.at_risk_limit, path)?;
    println!("Exported cluster health to: {}", path.display());
    Ok(())
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    settings: &Settings,
    theme: Theme,
    refresh_interval: Duration,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal if anything panics
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::with_theme(source, settings.thresholds.clone(), theme);
    app.at_risk_limit = settings.at_risk_limit;
    let _ = app.reload_data();

    let result = run_app(&mut terminal, &mut app, refresh_interval);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Rows above the content area: header bar and tabs.
const CONTENT_TOP: u16 = 2;
/// Rows below the content area: status bar.
const CONTENT_BOTTOM: u16 = 1;

/// Row of the top border of the selectable table in the current view.
fn table_top(app: &App, terminal_height: u16) -> u16 {
    match (app.current_view, &app.data) {
        (View::Overview, Some(data)) => {
            let content = terminal_height.saturating_sub(CONTENT_TOP + CONTENT_BOTTOM);
            CONTENT_TOP + ui::overview::node_panel_height(data.nodes.len(), content)
        }
        _ => CONTENT_TOP,
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = Paragraph::new(msg)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Yellow));
                let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5)
                    .intersection(area);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Overview => ui::overview::render(frame, app, chunks[2]),
                View::Queues => ui::queues::render(frame, app, chunks[2]),
                View::Vhosts => ui::vhosts::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    let height = terminal.size()?.height;
                    let top = table_top(app, height);
                    events::handle_mouse_event(app, mouse, 1, top);
                }
                // Redrawn on the next iteration
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_refresh.elapsed() >= refresh_interval {
            let _ = app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
