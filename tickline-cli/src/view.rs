//! Live terminal timeline.
//!
//! A background task re-reads the bucket file on an interval and hands the
//! decoded data to the draw loop over a channel. The draw loop owns the
//! environment selection and re-merges on every frame.

use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use tickline_core::env_filter::{EnvironmentFilter, environments};
use tickline_core::input::parse_buckets;
use tickline_core::model::{Bucket, EnvironmentName, StatusKind, Tick};
use tickline_core::rollup::{TimeWindow, fit_to_window};
use tickline_core::status::aggregate_status_across;
use tickline_core::ticks::merge_buckets;

use crate::ui::strip::{BucketRange, TimelineStrip};
use crate::ui::styles;

pub struct ViewSettings {
    pub input: PathBuf,
    pub filter: EnvironmentFilter,
    pub window: TimeWindow,
    pub refresh: Duration,
    pub timeline_width: Option<u16>,
}

enum Reload {
    Loaded(Vec<Bucket>),
    Failed(String),
}

struct ViewState {
    buckets: Vec<Bucket>,
    known_envs: BTreeSet<EnvironmentName>,
    filter: EnvironmentFilter,
    loaded_at: Option<SystemTime>,
    last_error: Option<String>,
}

impl ViewState {
    fn apply(&mut self, reload: Reload) {
        match reload {
            Reload::Loaded(buckets) => {
                self.known_envs = environments(&buckets);
                self.buckets = buckets;
                self.loaded_at = Some(SystemTime::now());
                self.last_error = None;
            }
            Reload::Failed(message) => self.last_error = Some(message),
        }
    }
}

pub async fn run(settings: ViewSettings) -> Result<()> {
    let (data_tx, mut data_rx) = mpsc::channel::<Reload>(4);
    let (reload_tx, reload_rx) = mpsc::channel::<()>(1);

    tokio::spawn(reload_loop(
        settings.input.clone(),
        settings.refresh,
        data_tx,
        reload_rx,
    ));

    let mut state = ViewState {
        buckets: Vec::new(),
        known_envs: BTreeSet::new(),
        filter: settings.filter.clone(),
        loaded_at: None,
        last_error: None,
    };

    let mut terminal = setup_terminal()?;
    let result = draw_loop(&mut terminal, &settings, &mut state, &mut data_rx, &reload_tx);
    restore_terminal(terminal)?;
    result
}

async fn reload_loop(
    path: PathBuf,
    refresh: Duration,
    data_tx: mpsc::Sender<Reload>,
    mut reload_rx: mpsc::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(refresh);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            forced = reload_rx.recv() => {
                if forced.is_none() {
                    return;
                }
                ticker.reset();
            }
        }

        let reload = match tokio::fs::read_to_string(&path).await {
            Ok(content) => match parse_buckets(&content) {
                Ok(buckets) => {
                    debug!(count = buckets.len(), "reloaded bucket data");
                    Reload::Loaded(buckets)
                }
                Err(e) => Reload::Failed(e.to_string()),
            },
            Err(e) => Reload::Failed(format!("{}: {}", path.display(), e)),
        };

        if let Reload::Failed(message) = &reload {
            warn!(%message, "reload failed");
        }

        if data_tx.send(reload).await.is_err() {
            return;
        }
    }
}

fn draw_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &ViewSettings,
    state: &mut ViewState,
    data_rx: &mut mpsc::Receiver<Reload>,
    reload_tx: &mpsc::Sender<()>,
) -> Result<()> {
    loop {
        while let Ok(reload) = data_rx.try_recv() {
            state.apply(reload);
        }

        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(1),
                    Constraint::Min(0),
                    Constraint::Length(1),
                ])
                .split(f.area());

            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_subtle())
                .title(Line::from(vec![
                    Span::styled(" Tickline ", styles::accent_bold()),
                    Span::styled(format!("{} ", state.filter.label()), styles::text()),
                    Span::styled(format!("· {} ", settings.window), styles::text_dim()),
                ]));
            let inner = block.inner(chunks[0]);
            f.render_widget(block, chunks[0]);

            let width = settings.timeline_width.unwrap_or(inner.width);
            let visible = fit_to_window(&state.buckets, settings.window, Some(width));
            let ticks = merge_buckets(&visible, &state.filter);
            if let Some(range) = BucketRange::of(&visible) {
                f.render_widget(TimelineStrip::new(&ticks, range), inner);
            }

            f.render_widget(Paragraph::new(summary_line(state, &ticks)), chunks[1]);

            let hints = Line::from(vec![
                Span::styled(" q ", styles::key_hint()),
                Span::styled("quit  ", styles::text_muted()),
                Span::styled("e ", styles::key_hint()),
                Span::styled("environment  ", styles::text_muted()),
                Span::styled("r ", styles::key_hint()),
                Span::styled("reload", styles::text_muted()),
            ]);
            f.render_widget(Paragraph::new(hints), chunks[3]);
        })?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }

        let CEvent::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
            KeyCode::Char('e') => {
                state.filter = state.filter.cycle(&state.known_envs);
                debug!(filter = state.filter.label(), "environment changed");
            }
            KeyCode::Char('r') => {
                let _ = reload_tx.try_send(());
            }
            _ => {}
        }
    }
}

fn summary_line<'a>(state: &ViewState, ticks: &[Tick]) -> Line<'a> {
    if let Some(err) = &state.last_error {
        return Line::from(Span::styled(
            format!(" {}", err),
            styles::status(StatusKind::Error),
        ));
    }
    if state.loaded_at.is_none() {
        return Line::from(Span::styled(" loading…", styles::text_muted()));
    }

    let status = aggregate_status_across(ticks.iter().map(|t| &t.env_mapping));
    Line::from(vec![
        Span::styled(format!(" {} ", styles::status_icon(status)), styles::status(status)),
        Span::styled(status.label(), styles::status(status)),
        Span::styled(
            format!(
                "  {} ticks · {} buckets · {} environments",
                ticks.len(),
                state.buckets.len(),
                state.known_envs.len()
            ),
            styles::text_dim(),
        ),
    ])
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
