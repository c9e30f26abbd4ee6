//! Interactive S-curve chart.
//!
//! This module contains the `ChartApp` struct which plots the baseline,
//! planned and actual curves on a shared date axis, tracks a day cursor whose
//! values are shown in a readout line, and lets the user switch between
//! projects and hide individual curves.

use std::io;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Clear, Dataset, GraphType, LegendPosition, Paragraph, Wrap,
    },
    Frame, Terminal,
};
use tracing::{debug, warn};

use crate::curve::{resolve_weights, CurveSettings, DailyProgressPoint};
use crate::db::Database;
use crate::fields::{format_weighting, Curve};
use crate::memo::CurveMemo;
use crate::report::{format_pct, format_variance};
use crate::task::WeightedTask;
use crate::tui::{
    colors::{curve_color, CURSOR_GRAY},
    enums::{AppState, ProjectScope},
    utils::centered_rect,
};

/// Shown instead of a chart when the selected tasks carry no dates.
pub const NO_DATA_MESSAGE: &str = "No task data available for this project";

const PAGE_DAYS: usize = 7;

/// Main application state for the chart viewer.
pub struct ChartApp {
    state: AppState,
    db: Database,
    scopes: Vec<ProjectScope>,
    scope_idx: usize,
    settings: CurveSettings,
    tasks: Vec<WeightedTask>,
    memo: CurveMemo,
    cursor: usize,
    visible: [bool; 3],
    status_message: String,
}

impl ChartApp {
    /// Create the viewer over `db`, starting on `project` when it is known.
    pub fn new(db: Database, project: Option<String>, settings: CurveSettings) -> Self {
        let mut scopes = vec![ProjectScope::All];
        scopes.extend(
            db.projects()
                .into_keys()
                .filter(|p| p != "-")
                .map(ProjectScope::Project),
        );
        let scope_idx = project
            .as_deref()
            .and_then(|p| scopes.iter().position(|s| s.as_filter() == Some(p)))
            .unwrap_or(0);

        let mut app = ChartApp {
            state: AppState::Chart,
            db,
            scopes,
            scope_idx,
            settings,
            tasks: Vec::new(),
            memo: CurveMemo::new(),
            cursor: 0,
            visible: [true; 3],
            status_message: String::new(),
        };
        app.load_scope();
        app
    }

    /// Reload tasks for the current scope and put the cursor on today.
    fn load_scope(&mut self) {
        let scope = &self.scopes[self.scope_idx];
        self.tasks = match self.db.weighted_tasks(scope.as_filter()) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = %e, "could not load tasks for scope");
                self.status_message = e.to_string();
                Vec::new()
            }
        };
        debug!(scope = %scope.display_name(), tasks = self.tasks.len(), "scope loaded");
        self.refresh();
        self.set_cursor_date(Local::now().date_naive());
    }

    /// Recompute the series if tasks or settings changed and keep the cursor in range.
    fn refresh(&mut self) {
        let len = self.memo.get_or_compute(&self.tasks, &self.settings).len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn series(&self) -> &[DailyProgressPoint] {
        self.memo.current().unwrap_or(&[])
    }

    pub fn scope(&self) -> &ProjectScope {
        &self.scopes[self.scope_idx]
    }

    /// Date under the cursor, if there is a series.
    pub fn cursor_date(&self) -> Option<NaiveDate> {
        self.series().get(self.cursor).map(|p| p.date)
    }

    /// Move the cursor to `date`, clamped to the series.
    pub fn set_cursor_date(&mut self, date: NaiveDate) {
        let series = self.series();
        let idx = match (series.first(), series.last()) {
            (Some(first), Some(_)) if date <= first.date => 0,
            (Some(_), Some(last)) if date >= last.date => series.len() - 1,
            (Some(first), Some(_)) => (date - first.date).num_days() as usize,
            _ => 0,
        };
        self.cursor = idx;
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.series().len();
        if len == 0 {
            return;
        }
        let target = self.cursor as isize + delta;
        self.cursor = target.clamp(0, len as isize - 1) as usize;
    }

    fn switch_scope(&mut self, forward: bool) {
        let n = self.scopes.len();
        self.scope_idx = if forward {
            (self.scope_idx + 1) % n
        } else {
            (self.scope_idx + n - 1) % n
        };
        self.load_scope();
        self.status_message = format!("Showing {}", self.scope().display_name());
    }

    fn toggle_curve(&mut self, curve: Curve) {
        let idx = curve_index(curve);
        self.visible[idx] = !self.visible[idx];
    }

    pub fn is_visible(&self, curve: Curve) -> bool {
        self.visible[curve_index(curve)]
    }

    /// Apply one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        self.status_message.clear();
        match self.state {
            AppState::Help => {
                if matches!(key, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
                    self.state = AppState::Chart;
                }
                false
            }
            AppState::Chart => match key {
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => true,
                KeyCode::Esc | KeyCode::Char('q') => true,
                KeyCode::Left | KeyCode::Char('h') => {
                    self.move_cursor(-1);
                    false
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    self.move_cursor(1);
                    false
                }
                KeyCode::PageUp => {
                    self.move_cursor(-(PAGE_DAYS as isize));
                    false
                }
                KeyCode::PageDown => {
                    self.move_cursor(PAGE_DAYS as isize);
                    false
                }
                KeyCode::Home => {
                    self.cursor = 0;
                    false
                }
                KeyCode::End => {
                    self.cursor = self.series().len().saturating_sub(1);
                    false
                }
                KeyCode::Char('t') => {
                    self.set_cursor_date(Local::now().date_naive());
                    false
                }
                KeyCode::Tab | KeyCode::Char('n') => {
                    self.switch_scope(true);
                    false
                }
                KeyCode::BackTab | KeyCode::Char('p') => {
                    self.switch_scope(false);
                    false
                }
                KeyCode::Char('1') => {
                    self.toggle_curve(Curve::Baseline);
                    false
                }
                KeyCode::Char('2') => {
                    self.toggle_curve(Curve::Planned);
                    false
                }
                KeyCode::Char('3') => {
                    self.toggle_curve(Curve::Actual);
                    false
                }
                KeyCode::Char('s') => {
                    let date = self.cursor_date();
                    self.settings.include_start_dates = !self.settings.include_start_dates;
                    self.refresh();
                    if let Some(d) = date {
                        self.set_cursor_date(d);
                    }
                    self.status_message = if self.settings.include_start_dates {
                        "Start dates widen the timeline".to_string()
                    } else {
                        "Timeline spans end dates only".to_string()
                    };
                    false
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Help;
                    false
                }
                _ => false,
            },
        }
    }

    /// Poll for and handle keyboard events.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code, key.modifiers));
                }
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let (_, total, mode) = resolve_weights(&self.tasks);
        let line = Line::from(vec![
            Span::styled(
                "Project Progress S-Curve",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  |  "),
            Span::styled(self.scope().display_name(), Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                "  |  {} tasks, {} total {}",
                self.tasks.len(),
                format_weighting(mode),
                total
            )),
        ]);
        let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        f.render_widget(header, area);
    }

    fn render_chart(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Cumulative % of task weightage completed ");
        let series = self.series();
        if series.is_empty() {
            let placeholder = Paragraph::new(NO_DATA_MESSAGE)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(placeholder, area);
            return;
        }

        let points: Vec<Vec<(f64, f64)>> = Curve::ALL
            .iter()
            .map(|c| {
                series
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (i as f64, p.value(*c)))
                    .collect()
            })
            .collect();
        let cursor_x = self.cursor as f64;
        let cursor_line = [(cursor_x, 0.0), (cursor_x, 100.0)];

        let mut datasets: Vec<Dataset> = Curve::ALL
            .iter()
            .zip(&points)
            .filter(|(c, _)| self.is_visible(**c))
            .map(|(c, data)| {
                Dataset::default()
                    .name(c.label())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(curve_color(*c)))
                    .data(data)
            })
            .collect();
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(CURSOR_GRAY))
                .data(&cursor_line),
        );

        let last = series.len() - 1;
        let x_labels = vec![
            Span::raw(series[0].date.format("%d %b %Y").to_string()),
            Span::raw(series[last / 2].date.format("%d %b").to_string()),
            Span::raw(series[last].date.format("%d %b %Y").to_string()),
        ];
        let axis_style = Style::default().fg(Color::Gray);

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title("Date")
                    .style(axis_style)
                    .bounds([0.0, last.max(1) as f64])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title("%")
                    .style(axis_style)
                    .bounds([0.0, 100.0])
                    .labels(vec![Span::raw("0%"), Span::raw("50%"), Span::raw("100%")]),
            )
            .legend_position(Some(LegendPosition::TopLeft))
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));
        f.render_widget(chart, area);
    }

    /// Per-day values under the cursor.
    fn render_readout(&self, f: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(" Day ");
        let Some(point) = self.series().get(self.cursor) else {
            f.render_widget(Paragraph::new("-").block(block), area);
            return;
        };

        let mut spans = vec![Span::styled(
            point.date.format("%a %d %b %Y").to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        for curve in Curve::ALL {
            let style = if self.is_visible(curve) {
                Style::default().fg(curve_color(curve))
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::raw("   "));
            spans.push(Span::styled(
                format!("{} {}", curve.label(), format_pct(point.value(curve))),
                style,
            ));
        }
        spans.push(Span::raw(format!(
            "   ({} vs plan)",
            format_variance(point.actual_pct - point.planned_pct)
        )));

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            format!(
                "Days: {} | ←/→ move | Tab project | 1/2/3 curves | \
                 s start dates | ? help | q quit",
                self.series().len()
            )
        };
        let bar = Paragraph::new(text).style(Style::default().fg(Color::Black).bg(Color::Gray));
        f.render_widget(bar, area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(60, 60, area);
        let lines = vec![
            Line::from(Span::styled("Keys", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("←/h  →/l      move one day"),
            Line::from("PgUp PgDn     move one week"),
            Line::from("Home End t    first day, last day, today"),
            Line::from("Tab/n  S-Tab/p  next / previous project"),
            Line::from("1 2 3         toggle baseline / expected / actual"),
            Line::from("s             include task start dates in the timeline"),
            Line::from("?             close this help"),
            Line::from("q  Esc        quit"),
        ];
        let help = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Help "))
            .wrap(Wrap { trim: false });
        f.render_widget(Clear, popup);
        f.render_widget(help, popup);
    }

    /// Draw the whole screen.
    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_chart(f, chunks[1]);
        self.render_readout(f, chunks[2]);
        self.render_status_bar(f, chunks[3]);

        if self.state == AppState::Help {
            self.render_help(f, chunks[1]);
        }
    }

    /// Main event loop for the chart viewer.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

fn curve_index(curve: Curve) -> usize {
    match curve {
        Curve::Baseline => 0,
        Curve::Planned => 1,
        Curve::Actual => 2,
    }
}
