//! TUI application state and event loop.
//!
//! The app is the presentation context: it owns the [`PanelModel`], ticks the
//! refresh scheduler every loop iteration and drains the job queue before
//! drawing. Trackers are announced from other threads through the model's
//! sender, exactly like the device subsystem would.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use trackview_core::{
    PanelModel, PanelRow, PresentationSender, RefreshScheduler, RenderSurface, TrackerEntry,
    TrackerId,
};

/// Poll timeout for terminal input.
const INPUT_POLL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// View: rendering-surface adapter
// ---------------------------------------------------------------------------

/// What the UI keeps between layout signals.
#[derive(Debug, Default)]
pub struct View {
    /// Tracker rows in display order.
    tracker_ids: Vec<TrackerId>,
    layouts: u64,
    refreshes: u64,
}

impl RenderSurface for View {
    fn layout_changed(&mut self, model: &PanelModel) {
        self.tracker_ids = model
            .registry()
            .rows()
            .into_iter()
            .filter_map(|row| match row {
                PanelRow::Tracker(id) => Some(id),
                PanelRow::Header { .. } => None,
            })
            .collect();
        self.layouts += 1;
    }

    fn text_updated(&mut self, _model: &PanelModel) {
        self.refreshes += 1;
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    model: PanelModel,
    scheduler: RefreshScheduler,
    sender: PresentationSender,
    view: View,
    running: bool,
    cursor: usize,
    last_export: Option<PathBuf>,
    message: Option<String>,
}

impl App {
    pub fn new(model: PanelModel) -> Self {
        let scheduler = model.scheduler();
        let sender = model.sender();
        Self {
            model,
            scheduler,
            sender,
            view: View::default(),
            running: true,
            cursor: 0,
            last_export: None,
            message: None,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Install panic hook that restores terminal before printing the panic.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error.
        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        if let Some(path) = &self.last_export {
            println!("Last snapshot saved to {}", path.display());
        }

        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        while self.running {
            self.scheduler.tick();
            self.pump();

            terminal.draw(|f| super::ui::draw(f, self))?;

            if event::poll(INPUT_POLL)?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key.code);
            }
        }

        Ok(())
    }

    /// Apply queued presentation jobs.
    fn pump(&mut self) {
        let outcome = self.model.process_pending(&mut self.view);
        if outcome.layout_changed {
            self.cursor = self
                .cursor
                .min(self.view.tracker_ids.len().saturating_sub(1));
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.view.tracker_ids.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char('d') => {
                self.sender.set_debug(!self.model.debug());
            }
            KeyCode::Char('p') => self.cycle_designation(),
            KeyCode::Char('m') => self.cycle_mounting(),
            KeyCode::Char('s') => self.export_snapshot(),
            _ => {}
        }
    }

    fn cycle_designation(&mut self) {
        let Some(entry) = self.selected() else {
            return;
        };
        let (id, name) = (entry.id, entry.name().to_string());
        let next = entry.panel.designation().unwrap_or_default().next();
        self.message = Some(if self.model.select_designation(id, next) {
            format!("{name} → {next}")
        } else {
            format!("{name} has no body designation")
        });
    }

    fn cycle_mounting(&mut self) {
        let Some(entry) = self.selected() else {
            return;
        };
        let (id, name) = (entry.id, entry.name().to_string());
        let next = entry.panel.mounting().unwrap_or_default().next();
        self.message = Some(if self.model.select_mounting(id, next) {
            format!("{name} mounted {next}")
        } else {
            format!("{name} has no mounting")
        });
    }

    fn export_snapshot(&mut self) {
        let epoch = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let path = PathBuf::from(format!("trackview-snapshot-{epoch}.json"));

        match serde_json::to_string_pretty(&self.model.snapshot()) {
            Ok(contents) => match std::fs::write(&path, contents) {
                Ok(()) => {
                    self.message = Some(format!("snapshot saved to {}", path.display()));
                    self.last_export = Some(path);
                }
                Err(e) => self.message = Some(format!("snapshot failed: {e}")),
            },
            Err(e) => self.message = Some(format!("snapshot failed: {e}")),
        }
    }

    // --- Accessors for the UI ---

    pub fn model(&self) -> &PanelModel {
        &self.model
    }

    /// Id of the tracker under the cursor.
    pub fn selected_id(&self) -> Option<TrackerId> {
        self.view.tracker_ids.get(self.cursor).copied()
    }

    pub fn selected(&self) -> Option<&TrackerEntry> {
        self.selected_id().and_then(|id| self.model.registry().get(id))
    }

    pub fn refresh_count(&self) -> u64 {
        self.view.refreshes
    }

    pub fn update_delay(&self) -> Duration {
        self.scheduler.delay()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
