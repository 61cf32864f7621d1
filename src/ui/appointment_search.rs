use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use crossterm::event::KeyCode;
use tracing::debug;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::api::ApiError;
use crate::models::{Appointment, Dni, DNI_LENGTH};
use crate::ui::components::nav_bar::{render_nav_bar, NavItem};
use crate::ui::components::toast::{render_toast, Toast, ToastKind, ToastState};
use crate::ui::{nav_shortcut, page_chunks, poll_key, AppointmentPrefill, Route};

const TOAST_DURATION: Duration = Duration::from_secs(5);

pub enum AppointmentSearchAction {
    Navigate(Route),
}

// Represents the state of the appointment lookup screen
pub struct AppointmentSearchState {
    dni_input: String,
    inline_error: Option<String>,
    results: Vec<Appointment>,
    last_dni: Option<Dni>,
    pending: Option<Dni>,
    table_state: TableState,
    toast: ToastState,
}

impl AppointmentSearchState {
    pub fn new(initial_dni: Option<String>) -> Self {
        let mut state = Self {
            dni_input: String::new(),
            inline_error: None,
            results: Vec::new(),
            last_dni: None,
            pending: None,
            table_state: TableState::default(),
            toast: ToastState::default(),
        };

        if let Some(dni) = initial_dni {
            for c in dni.chars() {
                state.push_digit(c);
            }
            state.submit_search();
        }

        state
    }

    /// Keep digits only, up to the DNI length
    pub fn push_digit(&mut self, c: char) {
        if c.is_ascii_digit() && self.dni_input.len() < DNI_LENGTH {
            self.dni_input.push(c);
        }
    }

    pub fn submit_search(&mut self) {
        if self.pending.is_some() {
            return;
        }
        match Dni::parse(&self.dni_input) {
            Ok(dni) => {
                debug!(%dni, "appointment search queued");
                self.inline_error = None;
                self.pending = Some(dni);
            }
            Err(err) => {
                self.inline_error = Some(err.to_string());
            }
        }
    }

    pub fn is_searching(&self) -> bool {
        self.pending.is_some()
    }

    pub fn take_pending(&mut self) -> Option<Dni> {
        self.pending.take()
    }

    pub fn apply_search_result(&mut self, dni: Dni, result: Result<Vec<Appointment>, ApiError>) {
        match result {
            Ok(appointments) => {
                self.inline_error = None;
                self.set_results(appointments);
                self.last_dni = Some(dni);
            }
            Err(err) => {
                self.set_results(Vec::new());
                self.last_dni = None;
                let notice = if err.is_server_error() {
                    self.inline_error = Some(
                        err.server_message()
                            .unwrap_or("Error searching appointments.")
                            .to_string(),
                    );
                    "No appointments found"
                } else {
                    "Error searching appointments"
                };
                self.toast
                    .show(Toast::new(ToastKind::Info, "Notification", notice, TOAST_DURATION));
            }
        }
    }

    fn set_results(&mut self, results: Vec<Appointment>) {
        self.results = results;
        self.table_state
            .select(if self.results.is_empty() { None } else { Some(0) });
    }

    pub fn results(&self) -> &[Appointment] {
        &self.results
    }

    pub fn next(&mut self) {
        if self.results.is_empty() {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) if i + 1 < self.results.len() => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.results.is_empty() {
            return;
        }

        let i = match self.table_state.selected() {
            Some(0) | None => self.results.len() - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_appointment(&self) -> Option<&Appointment> {
        self.table_state.selected().and_then(|i| self.results.get(i))
    }

    fn selected_client_id(&self) -> Option<String> {
        self.selected_appointment()
            .and_then(|a| a.client_id.as_ref())
            .map(|id| id.to_string())
    }

    pub fn tick(&mut self, now: Instant) {
        self.toast.tick(now);
    }
}

pub fn render_appointment_search<B: Backend>(frame: &mut Frame<B>, state: &mut AppointmentSearchState) {
    let (nav, content, help) = page_chunks(frame.size());
    render_nav_bar(frame, nav, Some(NavItem::Appointments));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1), Constraint::Min(3)].as_ref())
        .split(content);

    let input = Paragraph::new(format!("{}|", state.dni_input))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().title("Search Appointments by DNI").borders(Borders::ALL));
    frame.render_widget(input, chunks[0]);

    if let Some(error) = &state.inline_error {
        let error = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
        frame.render_widget(error, chunks[1]);
    }

    let block = Block::default().title("Results").borders(Borders::ALL);
    if state.is_searching() {
        let searching = Paragraph::new("Searching...").block(block);
        frame.render_widget(searching, chunks[2]);
    } else if state.results().is_empty() {
        let empty = Paragraph::new("No appointments found for the given DNI.")
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(empty, chunks[2]);
    } else {
        let header_cells = ["Title", "Type", "Date", "Time", "Description", "Zone"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
        let header = Row::new(header_cells).height(1).bottom_margin(1);

        let rows = state.results.iter().map(|appointment| {
            let date = appointment.date.with_timezone(&Local).format("%d/%m/%Y").to_string();
            Row::new(vec![
                Cell::from(appointment.title.clone()),
                Cell::from(appointment.appointment_type.clone()),
                Cell::from(date),
                Cell::from(appointment.time.clone()),
                Cell::from(appointment.description.clone().unwrap_or_else(|| "N/A".to_string())),
                Cell::from(appointment.zone.clone().unwrap_or_default()),
            ])
        });

        let table = Table::new(rows)
            .header(header)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .widths(&[
                Constraint::Percentage(20),
                Constraint::Percentage(15),
                Constraint::Percentage(12),
                Constraint::Percentage(8),
                Constraint::Percentage(25),
                Constraint::Percentage(20),
            ]);
        frame.render_stateful_widget(table, chunks[2], &mut state.table_state);
    }

    let buttons_text = if state.selected_appointment().is_some() {
        "<0-9> DNI | <Enter> Search | <C> View Client | <N> New Appointment | <Esc> Back"
    } else {
        "<0-9> DNI | <Enter> Search | <N> New Appointment | <Esc> Back"
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, help);

    render_toast(frame, &state.toast);
}

pub fn handle_key(state: &mut AppointmentSearchState, key: KeyCode) -> Option<AppointmentSearchAction> {
    if let Some(route) = nav_shortcut(key) {
        return Some(AppointmentSearchAction::Navigate(route));
    }

    match key {
        KeyCode::Esc => return Some(AppointmentSearchAction::Navigate(Route::Home)),
        KeyCode::Char(c) if c.is_ascii_digit() => state.push_digit(c),
        KeyCode::Backspace => {
            state.dni_input.pop();
        }
        KeyCode::Enter => state.submit_search(),
        KeyCode::Down => state.next(),
        KeyCode::Up => state.previous(),
        KeyCode::Char('c' | 'C') => {
            if let Some(id) = state.selected_client_id() {
                return Some(AppointmentSearchAction::Navigate(Route::ClientDetail(id)));
            }
        }
        KeyCode::Char('n' | 'N') => {
            let prefill = AppointmentPrefill {
                client_id: state.selected_client_id(),
                dni: state.last_dni.as_ref().map(|d| d.to_string()),
            };
            return Some(AppointmentSearchAction::Navigate(Route::CreateAppointment(prefill)));
        }
        KeyCode::Char('x' | 'X') => state.toast.dismiss(),
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut AppointmentSearchState) -> Result<Option<AppointmentSearchAction>> {
    state.tick(Instant::now());
    Ok(poll_key()?.and_then(|key| handle_key(state, key)))
}
