// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::io;
use time::OffsetDateTime;
use waggle_app::{
    AppState, Datapoint, DatapointRequest, DetailField, GoalDetail, GoalSummary, Nav, ViewMode,
    detail_fields, fit_cell, format_time_left, format_timestamp, format_value,
};

const COLUMN_HEADERS: [&str; 8] = [
    "Slug",
    "Description",
    "Current",
    "Goal",
    "Lose Date",
    "Time Left",
    "Last Updated",
    "Status",
];
const COLUMN_WIDTHS: [usize; 8] = [15, 25, 10, 10, 20, 15, 20, 10];

// Rows consumed by chrome around the scrolling region: title, header,
// separator, footer.
const LIST_CHROME_ROWS: u16 = 4;
const DETAIL_LABEL_WIDTH: usize = 20;
const DETAIL_VALUE_COLUMN: usize = 22;

const LIST_TITLE: &str = "Beeminder Goals Status";
const LIST_FOOTER: &str = "↑↓: Navigate | q: Quit | r: Refresh | i: Show Details | c: Create Datapoint | w: Open Beeminder in browser";
const DETAIL_FOOTER: &str = "↑↓: Scroll | b: Back to List | c: Create Datapoint | w: Open in Browser";

const VALUE_PROMPT: &str = "Enter value (number):";
const COMMENT_PROMPT: &str = "Enter comment (optional):";
const PROMPT_HINT: &str = "Enter to submit, Esc to cancel";
const PROMPT_INVALID: &str = "Invalid number! Press any key...";
const NOTICE_HINT: &str = "Press any key to continue...";

/// Remote operations the view controller depends on. Implementations block;
/// the render loop accepts that for simplicity.
pub trait GoalService {
    fn fetch_goals(&mut self) -> Result<Vec<GoalSummary>>;
    fn fetch_goal_detail(&mut self, slug: &str) -> Result<GoalDetail>;
    fn create_datapoint(&mut self, slug: &str, request: &DatapointRequest) -> Result<Datapoint>;
    /// Best effort; failures must not disturb the UI.
    fn open_dashboard(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PromptOutcome {
    Submitted(String),
    Cancelled,
}

/// Single-field modal editor. Fresh state per invocation; while an error is
/// showing, the next keystroke only restores the editable prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PromptState {
    title: &'static str,
    numeric: bool,
    buffer: String,
    error: Option<&'static str>,
}

impl PromptState {
    fn new(title: &'static str, numeric: bool) -> Self {
        Self {
            title,
            numeric,
            buffer: String::new(),
            error: None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<PromptOutcome> {
        if self.error.take().is_some() {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('c') {
                return Some(PromptOutcome::Cancelled);
            }
            return None;
        }

        match key.code {
            KeyCode::Esc => Some(PromptOutcome::Cancelled),
            KeyCode::Enter => {
                if self.numeric && !parses_as_finite(&self.buffer) {
                    self.error = Some(PROMPT_INVALID);
                    None
                } else {
                    Some(PromptOutcome::Submitted(std::mem::take(&mut self.buffer)))
                }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
                None
            }
            KeyCode::Char(c) => {
                if self.numeric && !(c.is_ascii_digit() || c == '.') {
                    return None;
                }
                if c.is_ascii() && !c.is_ascii_control() {
                    self.buffer.push(c);
                }
                None
            }
            _ => None,
        }
    }
}

fn parses_as_finite(text: &str) -> bool {
    text.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq)]
enum EntryStage {
    Value,
    Comment { value: f64 },
}

/// Two-step datapoint entry: numeric value, then optional comment.
#[derive(Debug, Clone, PartialEq)]
struct DatapointEntry {
    slug: String,
    stage: EntryStage,
    prompt: PromptState,
}

impl DatapointEntry {
    fn new(slug: String) -> Self {
        Self {
            slug,
            stage: EntryStage::Value,
            prompt: PromptState::new(VALUE_PROMPT, true),
        }
    }
}

/// An active overlay owns terminal input exclusively until it resolves.
#[derive(Debug, Clone, PartialEq)]
enum Overlay {
    Entry(DatapointEntry),
    Notice(String),
}

#[derive(Debug, Default, PartialEq)]
struct ViewData {
    goals: Vec<GoalSummary>,
    detail: Option<GoalDetail>,
    overlay: Option<Overlay>,
}

pub fn run_app<S: GoalService>(state: &mut AppState, service: &mut S) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let viewport = viewport_for(&terminal);
    refresh_goals(state, service, &mut view_data, viewport);

    let mut result = Ok(());
    loop {
        let now = OffsetDateTime::now_utc();
        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data, now)) {
            result = Err(error).context("draw frame");
            break;
        }

        match event::read().context("read event") {
            Err(error) => {
                result = Err(error);
                break;
            }
            Ok(Event::Key(key)) => {
                let viewport = viewport_for(&terminal);
                if handle_key_event(state, service, &mut view_data, key, viewport, now) {
                    break;
                }
            }
            Ok(_) => {}
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn viewport_for<B: ratatui::backend::Backend>(terminal: &Terminal<B>) -> usize {
    let rows = terminal.size().map(|size| size.height).unwrap_or(0);
    list_viewport_height(rows)
}

fn list_viewport_height(total_rows: u16) -> usize {
    usize::from(total_rows.saturating_sub(LIST_CHROME_ROWS)).max(1)
}

/// Applies one key event; returns true when the program should exit.
fn handle_key_event<S: GoalService>(
    state: &mut AppState,
    service: &mut S,
    view_data: &mut ViewData,
    key: KeyEvent,
    viewport_height: usize,
    now: OffsetDateTime,
) -> bool {
    if view_data.overlay.is_some() {
        handle_overlay_key(state, service, view_data, key, viewport_height);
        return false;
    }

    match state.view {
        ViewMode::List => handle_list_key(state, service, view_data, key, viewport_height),
        ViewMode::Detail => {
            handle_detail_key(state, service, view_data, key, now);
            false
        }
    }
}

fn handle_list_key<S: GoalService>(
    state: &mut AppState,
    service: &mut S,
    view_data: &mut ViewData,
    key: KeyEvent,
    viewport_height: usize,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('w') => service.open_dashboard(),
        KeyCode::Char('r') => refresh_goals(state, service, view_data, viewport_height),
        KeyCode::Char('c') => {
            if let Some(goal) = view_data.goals.get(state.selected_index) {
                view_data.overlay = Some(Overlay::Entry(DatapointEntry::new(goal.slug.clone())));
            }
        }
        KeyCode::Char('i') => {
            let Some(goal) = view_data.goals.get(state.selected_index) else {
                return false;
            };
            match service.fetch_goal_detail(&goal.slug) {
                Ok(detail) => {
                    view_data.detail = Some(detail);
                    state.open_detail();
                }
                Err(error) => {
                    view_data.overlay =
                        Some(Overlay::Notice(format!("Error loading goal detail: {error:#}")));
                }
            }
        }
        KeyCode::Up => state.navigate_list(Nav::Up, view_data.goals.len(), viewport_height),
        KeyCode::Down => state.navigate_list(Nav::Down, view_data.goals.len(), viewport_height),
        _ => {}
    }
    false
}

fn handle_detail_key<S: GoalService>(
    state: &mut AppState,
    service: &mut S,
    view_data: &mut ViewData,
    key: KeyEvent,
    now: OffsetDateTime,
) {
    match key.code {
        KeyCode::Char('b') => {
            state.back_to_list();
            view_data.detail = None;
        }
        KeyCode::Char('w') => service.open_dashboard(),
        KeyCode::Char('c') => {
            if let Some(detail) = &view_data.detail {
                view_data.overlay = Some(Overlay::Entry(DatapointEntry::new(
                    detail.summary.slug.clone(),
                )));
            }
        }
        KeyCode::Up | KeyCode::Down => {
            let count = view_data
                .detail
                .as_ref()
                .map(|detail| detail_fields(detail, now).len())
                .unwrap_or(0);
            let nav = if key.code == KeyCode::Up { Nav::Up } else { Nav::Down };
            state.scroll_detail(nav, count);
        }
        _ => {}
    }
}

fn handle_overlay_key<S: GoalService>(
    state: &mut AppState,
    service: &mut S,
    view_data: &mut ViewData,
    key: KeyEvent,
    viewport_height: usize,
) {
    let Some(overlay) = view_data.overlay.take() else {
        return;
    };
    match overlay {
        // Any key dismisses a notice.
        Overlay::Notice(_) => {}
        Overlay::Entry(mut entry) => match entry.prompt.handle_key(key) {
            None => view_data.overlay = Some(Overlay::Entry(entry)),
            Some(PromptOutcome::Cancelled) => {}
            Some(PromptOutcome::Submitted(text)) => {
                advance_entry(state, service, view_data, entry, text, viewport_height);
            }
        },
    }
}

fn advance_entry<S: GoalService>(
    state: &mut AppState,
    service: &mut S,
    view_data: &mut ViewData,
    mut entry: DatapointEntry,
    text: String,
    viewport_height: usize,
) {
    match entry.stage {
        EntryStage::Value => {
            // The numeric prompt only submits buffers that parse finite.
            let Ok(value) = text.parse::<f64>() else {
                return;
            };
            entry.stage = EntryStage::Comment { value };
            entry.prompt = PromptState::new(COMMENT_PROMPT, false);
            view_data.overlay = Some(Overlay::Entry(entry));
        }
        EntryStage::Comment { value } => {
            submit_datapoint(
                state,
                service,
                view_data,
                &entry.slug,
                value,
                text,
                viewport_height,
            );
        }
    }
}

fn submit_datapoint<S: GoalService>(
    state: &mut AppState,
    service: &mut S,
    view_data: &mut ViewData,
    slug: &str,
    value: f64,
    comment: String,
    viewport_height: usize,
) {
    let comment = (!comment.is_empty()).then_some(comment);
    let request = match DatapointRequest::new(value, comment) {
        Ok(request) => request,
        Err(error) => {
            view_data.overlay = Some(Overlay::Notice(format!("Error creating datapoint: {error:#}")));
            return;
        }
    };

    match service.create_datapoint(slug, &request) {
        Ok(_) => match state.view {
            ViewMode::List => refresh_goals(state, service, view_data, viewport_height),
            ViewMode::Detail => refresh_detail(service, view_data, slug),
        },
        Err(error) => {
            view_data.overlay = Some(Overlay::Notice(format!("Error creating datapoint: {error:#}")));
        }
    }
}

fn refresh_goals<S: GoalService>(
    state: &mut AppState,
    service: &mut S,
    view_data: &mut ViewData,
    viewport_height: usize,
) {
    match service.fetch_goals() {
        Ok(goals) => {
            view_data.goals = goals;
            state.clamp_list(view_data.goals.len(), viewport_height);
        }
        Err(error) => {
            view_data.overlay = Some(Overlay::Notice(format!("Error fetching goals: {error:#}")));
        }
    }
}

fn refresh_detail<S: GoalService>(service: &mut S, view_data: &mut ViewData, slug: &str) {
    match service.fetch_goal_detail(slug) {
        Ok(detail) => view_data.detail = Some(detail),
        Err(error) => {
            view_data.overlay =
                Some(Overlay::Notice(format!("Error loading goal detail: {error:#}")));
        }
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData, now: OffsetDateTime) {
    match state.view {
        ViewMode::List => render_goal_table(frame, state, view_data, now),
        ViewMode::Detail => render_goal_detail(frame, state, view_data, now),
    }

    match &view_data.overlay {
        Some(Overlay::Entry(entry)) => render_prompt(frame, &entry.prompt),
        Some(Overlay::Notice(message)) => render_notice(frame, message),
        None => {}
    }
}

fn render_goal_table(
    frame: &mut ratatui::Frame<'_>,
    state: &AppState,
    view_data: &ViewData,
    now: OffsetDateTime,
) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    frame.render_widget(Paragraph::new(LIST_TITLE).style(bold()).centered(), layout[0]);
    frame.render_widget(Paragraph::new(header_line()).style(bold()), layout[1]);
    frame.render_widget(
        Paragraph::new("─".repeat(usize::from(area.width))),
        layout[2],
    );

    let viewport = usize::from(layout[3].height);
    let lines: Vec<Line<'_>> = view_data
        .goals
        .iter()
        .enumerate()
        .skip(state.offset)
        .take(viewport)
        .map(|(index, goal)| {
            let text = goal_row_text(goal, now);
            if index == state.selected_index {
                Line::from(Span::styled(
                    text,
                    Style::default().add_modifier(Modifier::REVERSED),
                ))
            } else {
                Line::from(text)
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), layout[3]);

    frame.render_widget(Paragraph::new(LIST_FOOTER), layout[4]);
}

fn render_goal_detail(
    frame: &mut ratatui::Frame<'_>,
    state: &AppState,
    view_data: &ViewData,
    now: OffsetDateTime,
) {
    let Some(detail) = &view_data.detail else {
        return;
    };

    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let title = format!("Goal Details: {}", detail.summary.slug);
    frame.render_widget(Paragraph::new(title).style(bold()).centered(), layout[0]);

    let fields = detail_fields(detail, now);
    let body = layout[2];
    let lines = detail_pane_lines(
        &fields,
        state.detail_scroll,
        usize::from(body.width),
        usize::from(body.height),
    );
    frame.render_widget(Paragraph::new(lines), body);

    frame.render_widget(Paragraph::new(DETAIL_FOOTER), layout[4]);
}

/// Builds the visible rows of the detail pane: a bold fixed-width label, then
/// the value wrapped at the column boundary onto indented continuation rows.
/// Stops once the viewport is exhausted, mid-field if necessary.
fn detail_pane_lines(
    fields: &[DetailField],
    scroll: usize,
    width: usize,
    max_rows: usize,
) -> Vec<Line<'static>> {
    let value_width = width.saturating_sub(DETAIL_VALUE_COLUMN + 2).max(1);
    let mut lines = Vec::new();

    for field in fields.iter().skip(scroll) {
        if lines.len() >= max_rows {
            break;
        }
        let label = format!("  {}", fit_cell(&format!("{}:", field.label), DETAIL_LABEL_WIDTH));
        match &field.value {
            None => lines.push(Line::from(vec![
                Span::styled(label, bold()),
                Span::raw("N/A"),
            ])),
            Some(value) => {
                let chunks = wrap_value(value, value_width);
                if chunks.is_empty() {
                    lines.push(Line::from(Span::styled(label, bold())));
                    continue;
                }
                for (index, chunk) in chunks.into_iter().enumerate() {
                    if lines.len() >= max_rows {
                        break;
                    }
                    if index == 0 {
                        lines.push(Line::from(vec![
                            Span::styled(label.clone(), bold()),
                            Span::raw(chunk),
                        ]));
                    } else {
                        lines.push(Line::from(format!(
                            "{}{chunk}",
                            " ".repeat(DETAIL_VALUE_COLUMN)
                        )));
                    }
                }
            }
        }
    }
    lines
}

fn wrap_value(value: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = value.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn header_line() -> String {
    COLUMN_HEADERS
        .iter()
        .zip(COLUMN_WIDTHS)
        .map(|(header, width)| fit_cell(header, width))
        .collect::<Vec<_>>()
        .join("  ")
}

fn goal_row_text(goal: &GoalSummary, now: OffsetDateTime) -> String {
    [
        fit_cell(&goal.slug, COLUMN_WIDTHS[0]),
        fit_cell(&goal.title, COLUMN_WIDTHS[1]),
        fit_cell(&format_value(goal.curval), COLUMN_WIDTHS[2]),
        fit_cell(&format_value(goal.goalval), COLUMN_WIDTHS[3]),
        fit_cell(&format_timestamp(goal.losedate), COLUMN_WIDTHS[4]),
        fit_cell(&format_time_left(goal.losedate, now), COLUMN_WIDTHS[5]),
        fit_cell(&format_timestamp(goal.updated_at), COLUMN_WIDTHS[6]),
        fit_cell(goal.status().as_str(), COLUMN_WIDTHS[7]),
    ]
    .join("  ")
}

fn render_prompt(frame: &mut ratatui::Frame<'_>, prompt: &PromptState) {
    let area = overlay_rect(frame.area(), 60, 6);
    frame.render_widget(Clear, area);

    let hint = prompt.error.unwrap_or(PROMPT_HINT);
    let lines = vec![
        Line::from(prompt.title.to_owned()),
        Line::from(format!("→ {}", prompt.buffer)),
        Line::from(String::new()),
        Line::from(hint.to_owned()),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_notice(frame: &mut ratatui::Frame<'_>, message: &str) {
    let area = overlay_rect(frame.area(), 70, 6);
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(message.to_owned()),
        Line::from(String::new()),
        Line::from(NOTICE_HINT),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn overlay_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}
