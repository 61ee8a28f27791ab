use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use modconfig::config_io::{self, DirectoryContext};
use modconfig::model::CatalogDiscovery;
use modconfig::services::status_log::StatusLogHandle;
use modconfig::services::tracing_setup;
use modconfig::view::settings::{render_settings, SettingsPanel};
use modconfig::view::theme::Theme;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{DefaultTerminal, Frame};
use std::path::PathBuf;
use std::time::Duration;

/// Searchable settings panel for extension modules
#[derive(Parser, Debug)]
#[command(name = "modconfig")]
#[command(about = "Browse, filter, export and import module settings", long_about = None)]
#[command(version)]
struct Args {
    /// JSON catalog describing the loaded modules and their settings
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Directory holding config.json, theme.json and the export file
    #[arg(long, value_name = "PATH")]
    config_dir: Option<PathBuf>,

    /// Path to log file (default: <data dir>/logs/modconfig.log)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Open the panel right away
    #[arg(long)]
    open: bool,

    /// Print the config, export and log paths and exit
    #[arg(long)]
    show_paths: bool,
}

struct Host {
    panel: SettingsPanel,
    theme: Theme,
    status: Option<StatusLogHandle>,
}

impl Host {
    fn run(&mut self, terminal: &mut DefaultTerminal) -> AnyhowResult<()> {
        loop {
            self.drain_status();
            terminal
                .draw(|frame| self.render(frame))
                .context("Failed to draw frame")?;

            if !event::poll(Duration::from_millis(250)).context("Failed to poll events")? {
                continue;
            }
            if let Event::Key(key) = event::read().context("Failed to read event")? {
                if !self.handle_key(key)? {
                    return Ok(());
                }
            }
        }
    }

    /// Returns false when the host should exit
    fn handle_key(&mut self, key: KeyEvent) -> AnyhowResult<bool> {
        if self
            .panel
            .handle_key(key)
            .context("Settings discovery failed")?
        {
            return Ok(true);
        }
        if key.kind == KeyEventKind::Release {
            return Ok(true);
        }
        let quit = matches!(key.code, KeyCode::Char('q'))
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL));
        Ok(!(quit && !self.panel.is_open()))
    }

    fn drain_status(&mut self) {
        let Some(handle) = &self.status else {
            return;
        };
        if let Some(message) = handle.latest() {
            self.panel.set_status(message.text.clone(), message.is_error());
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let hint = Line::from(vec![
            Span::styled(
                format!("Press {} to open mod settings, q to quit", self.panel.hotkey()),
                Style::default().fg(self.theme.muted),
            ),
        ]);
        frame.render_widget(
            Paragraph::new(hint),
            Rect::new(area.x, area.y, area.width, 1.min(area.height)),
        );

        if self.panel.is_open() {
            render_settings(frame, area, &mut self.panel, &self.theme);
        }
    }
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    let dir_context = match &args.config_dir {
        Some(dir) => DirectoryContext::with_config_dir(dir),
        None => DirectoryContext::from_system().context("Failed to resolve directories")?,
    };

    if args.show_paths {
        println!("config: {}", dir_context.config_path().display());
        println!("export: {}", dir_context.export_path().display());
        println!("theme:  {}", dir_context.theme_path().display());
        println!("log:    {}", dir_context.log_path().display());
        return Ok(());
    }

    let catalog_path = args
        .catalog
        .clone()
        .context("--catalog is required to run the panel")?;

    let log_file = args.log_file.clone().unwrap_or_else(|| dir_context.log_path());
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let status = tracing_setup::init_global(&log_file);
    tracing::info!("modconfig starting");

    let discovery = CatalogDiscovery::load(&catalog_path)
        .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;
    let config = config_io::load_config(&dir_context);
    let theme_path = dir_context.theme_path();
    let theme = if theme_path.exists() {
        Theme::load_or_default(&theme_path)
    } else {
        Theme::default()
    };

    let mut panel = SettingsPanel::new(Box::new(discovery), config, dir_context.export_path())
        .with_config_path(dir_context.config_path());
    if args.open {
        panel.open().context("Settings discovery failed")?;
    }

    let mut host = Host {
        panel,
        theme,
        status,
    };

    let mut terminal = ratatui::init();
    let result = host.run(&mut terminal);
    ratatui::restore();

    tracing::info!("modconfig exiting");
    result.context("Panel loop returned an error")
}
