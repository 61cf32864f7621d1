use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Local, TimeZone};
use crossterm::event::KeyCode;
use tracing::{debug, info};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::api::ApiError;
use crate::models::{AppointmentType, Dni, NewAppointment, Zone};
use crate::ui::components::date_input::DateInputState;
use crate::ui::components::nav_bar::{render_nav_bar, NavItem};
use crate::ui::components::toast::{render_toast, Toast, ToastKind, ToastState};
use crate::ui::{nav_shortcut, page_chunks, poll_key, AppointmentPrefill, Route};
use crate::validation::{combine_date_time, parse_time, required, to_iso_timestamp, ValidationError};

const TOAST_DURATION: Duration = Duration::from_millis(1500);
const REDIRECT_DELAY: Duration = Duration::from_secs(3);
const TIME_INPUT_LEN: usize = 5;

pub enum AppointmentFormAction {
    Navigate(Route),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum FormField {
    Title,
    Type,
    Dni,
    Address,
    Zone,
    Description,
    Date,
    Time,
}

impl FormField {
    const ALL: [FormField; 8] = [
        FormField::Title,
        FormField::Type,
        FormField::Dni,
        FormField::Address,
        FormField::Zone,
        FormField::Description,
        FormField::Date,
        FormField::Time,
    ];

    fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title *",
            FormField::Type => "Appointment type *",
            FormField::Dni => "Client DNI *",
            FormField::Address => "Address *",
            FormField::Zone => "Zone *",
            FormField::Description => "Description",
            FormField::Date => "Date *",
            FormField::Time => "Time (HH:MM) *",
        }
    }

    fn is_select(&self) -> bool {
        matches!(self, FormField::Type | FormField::Zone)
    }
}

/// Step through a fixed option list, starting at the first option when unset.
fn cycle<T: Copy + PartialEq>(options: &[T], current: Option<T>, forward: bool) -> Option<T> {
    let len = options.len();
    if len == 0 {
        return None;
    }
    let index = match current.and_then(|c| options.iter().position(|o| *o == c)) {
        None => 0,
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
    };
    Some(options[index])
}

pub struct AppointmentFormState {
    title: String,
    appointment_type: Option<AppointmentType>,
    dni: String,
    dni_locked: bool,
    client_id: Option<String>,
    address: String,
    zone: Option<Zone>,
    description: String,
    date: DateInputState,
    time: String,
    current_field: FormField,
    editing: bool,
    inline_error: Option<String>,
    pending: Option<NewAppointment>,
    redirect_at: Option<Instant>,
    toast: ToastState,
}

impl AppointmentFormState {
    /// A prefilled DNI is read-only only when it is a valid DNI
    pub fn new(prefill: AppointmentPrefill) -> Self {
        let dni = prefill.dni.unwrap_or_default();
        let dni_locked = Dni::parse(&dni).is_ok();
        if !dni.is_empty() && !dni_locked {
            debug!(%dni, "prefilled DNI is invalid, leaving it editable");
        }
        Self {
            title: String::new(),
            appointment_type: None,
            dni_locked,
            dni,
            client_id: prefill.client_id.filter(|id| !id.is_empty()),
            address: String::new(),
            zone: None,
            description: String::new(),
            date: DateInputState::new(),
            time: String::new(),
            current_field: FormField::Title,
            editing: false,
            inline_error: None,
            pending: None,
            redirect_at: None,
            toast: ToastState::default(),
        }
    }

    pub fn toggle_editing(&mut self) {
        if self.current_field.is_select() {
            return;
        }
        if self.current_field == FormField::Dni && self.dni_locked {
            return;
        }
        self.editing = !self.editing;
        if self.current_field == FormField::Date {
            self.date.toggle_editing();
        }
    }

    fn stop_editing(&mut self) {
        if self.editing {
            self.toggle_editing();
        }
    }

    pub fn next_field(&mut self) {
        let i = FormField::ALL.iter().position(|f| *f == self.current_field).unwrap_or(0);
        self.current_field = FormField::ALL[(i + 1) % FormField::ALL.len()];
    }

    pub fn previous_field(&mut self) {
        let len = FormField::ALL.len();
        let i = FormField::ALL.iter().position(|f| *f == self.current_field).unwrap_or(0);
        self.current_field = FormField::ALL[(i + len - 1) % len];
    }

    fn cycle_option(&mut self, forward: bool) {
        match self.current_field {
            FormField::Type => {
                self.appointment_type = cycle(&AppointmentType::ALL, self.appointment_type, forward)
            }
            FormField::Zone => self.zone = cycle(&Zone::ALL, self.zone, forward),
            _ => {}
        }
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let field_value = match self.current_field {
            FormField::Date => {
                self.date.handle_input(key);
                return;
            }
            FormField::Time => {
                match key {
                    KeyCode::Char(c) if (c.is_ascii_digit() || c == ':') && self.time.len() < TIME_INPUT_LEN => {
                        self.time.push(c)
                    }
                    KeyCode::Backspace => {
                        self.time.pop();
                    }
                    _ => {}
                }
                return;
            }
            FormField::Title => &mut self.title,
            FormField::Dni => &mut self.dni,
            FormField::Address => &mut self.address,
            FormField::Description => &mut self.description,
            FormField::Type | FormField::Zone => return,
        };

        match key {
            KeyCode::Char(c) => {
                field_value.push(c);
            }
            KeyCode::Backspace => {
                field_value.pop();
            }
            _ => {}
        }
    }

    /// Validate the fields and build the request body.
    ///
    /// Date and time are read as wall-clock values in `tz`.
    pub fn build_payload<Tz: TimeZone>(&self, tz: &Tz) -> Result<NewAppointment, ValidationError> {
        let title = required("Title", &self.title)?;
        let appointment_type = self
            .appointment_type
            .ok_or(ValidationError::MissingField("Appointment type"))?;
        let dni = required("DNI", &self.dni)?;
        let address = required("Address", &self.address)?;
        let zone = self.zone.ok_or(ValidationError::MissingField("Zone"))?;

        let date = self.date.date.ok_or(ValidationError::InvalidDateTime)?;
        let time = parse_time(&self.time)?;
        let instant = combine_date_time(date, time, tz)?;

        let description = self.description.trim();

        Ok(NewAppointment {
            title: title.to_string(),
            appointment_type: appointment_type.as_str().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            date: to_iso_timestamp(&instant),
            time: time.format("%H:%M").to_string(),
            client_id: self.client_id.clone(),
            dni: dni.to_string(),
            address: address.to_string(),
            zone: zone.as_str().to_string(),
        })
    }

    pub fn submit(&mut self) {
        self.submit_in(&Local);
    }

    /// Queue the payload for sending, or show why it cannot be sent.
    pub fn submit_in<Tz: TimeZone>(&mut self, tz: &Tz) {
        if self.pending.is_some() {
            return;
        }
        match self.build_payload(tz) {
            Ok(payload) => {
                debug!(dni = %payload.dni, "appointment form queued for submission");
                self.inline_error = None;
                self.pending = Some(payload);
            }
            Err(err) => {
                debug!(error = %err, "appointment form rejected locally");
                self.inline_error = Some(err.to_string());
            }
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    /// Hand the queued payload to the caller that performs the request
    pub fn take_pending(&mut self) -> Option<NewAppointment> {
        self.pending.take()
    }

    pub fn apply_submit_result(&mut self, result: Result<(), ApiError>, now: Instant) {
        match result {
            Ok(()) => {
                info!("appointment created, returning home shortly");
                let toast = std::mem::take(&mut self.toast);
                *self = Self::new(AppointmentPrefill::default());
                self.toast = toast;
                self.toast.show(Toast::new(
                    ToastKind::Success,
                    "Success",
                    "Appointment created successfully!",
                    TOAST_DURATION,
                ));
                self.redirect_at = Some(now + REDIRECT_DELAY);
            }
            Err(ApiError::Server { status, message }) => {
                let detail = message.unwrap_or_else(|| format!("request failed with status {}", status));
                self.toast.show(Toast::new(
                    ToastKind::Error,
                    "Error",
                    format!("Error: {}", detail),
                    TOAST_DURATION,
                ));
            }
            Err(_) => {
                self.toast
                    .show(Toast::new(ToastKind::Error, "Error", "Unknown error.", TOAST_DURATION));
            }
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.toast.tick(now);
    }

    pub fn redirect_due(&self, now: Instant) -> bool {
        self.redirect_at.is_some_and(|at| now >= at)
    }

    fn field_value(&self, field: FormField) -> String {
        match field {
            FormField::Title => self.title.clone(),
            FormField::Type => self
                .appointment_type
                .map(|t| format!("< {} >", t.as_str()))
                .unwrap_or_else(|| "Select a type".to_string()),
            FormField::Dni => {
                if self.dni_locked {
                    format!("{} (from client)", self.dni)
                } else {
                    self.dni.clone()
                }
            }
            FormField::Address => self.address.clone(),
            FormField::Zone => self
                .zone
                .map(|z| format!("< {} >", z.as_str()))
                .unwrap_or_else(|| "Select a zone".to_string()),
            FormField::Description => self.description.clone(),
            FormField::Date => self.date.get_display_string(),
            FormField::Time => self.time.clone(),
        }
    }
}

pub fn render_appointment_form<B: Backend>(f: &mut Frame<B>, state: &mut AppointmentFormState) {
    let (nav, content, help_area) = page_chunks(f.size());
    render_nav_bar(f, nav, Some(NavItem::NewAppointment));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(10), Constraint::Length(1)].as_ref())
        .split(content);

    let title_text = match &state.client_id {
        Some(id) => format!("Create New Appointment for client {}", id),
        None => "Create New Appointment".to_string(),
    };
    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let status = if state.is_submitting() {
        Paragraph::new("Saving...").style(Style::default().fg(Color::Yellow))
    } else if let Some(error) = &state.inline_error {
        Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red))
    } else {
        Paragraph::new("")
    };
    f.render_widget(status, chunks[2]);

    let help_text = if state.editing {
        "Enter/Esc - Done editing"
    } else if state.current_field.is_select() {
        "Left/Right - Change option | Up/Down - Navigate fields | S - Create appointment | Esc - Cancel"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Create appointment | Esc - Cancel"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, help_area);

    render_toast(f, &state.toast);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &AppointmentFormState, area: Rect) {
    let items: Vec<ListItem> = FormField::ALL
        .iter()
        .map(|field| {
            let value = state.field_value(*field);
            let selected = *field == state.current_field;

            let content = if selected && state.editing {
                let cursor = if *field == FormField::Date { "" } else { "|" };
                Spans::from(vec![
                    Span::styled(format!("{}: ", field.label()), Style::default().fg(Color::Yellow)),
                    Span::styled(format!("{}{}", value, cursor), Style::default().add_modifier(Modifier::BOLD)),
                ])
            } else {
                let style = if selected {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Spans::from(vec![
                    Span::styled(format!("{}: ", field.label()), style),
                    Span::raw(value),
                ])
            };

            ListItem::new(content)
        })
        .collect();

    let form_list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Appointment Details"),
    );

    f.render_widget(form_list, area);
}

pub fn handle_key(state: &mut AppointmentFormState, key: KeyCode) -> Option<AppointmentFormAction> {
    if let Some(route) = nav_shortcut(key) {
        return Some(AppointmentFormAction::Navigate(route));
    }

    if state.editing {
        match key {
            KeyCode::Esc | KeyCode::Enter => state.stop_editing(),
            _ => state.edit_current_field(key),
        }
        return None;
    }

    match key {
        KeyCode::Esc => return Some(AppointmentFormAction::Navigate(Route::Home)),
        KeyCode::Enter => {
            if state.current_field.is_select() {
                state.cycle_option(true);
            } else {
                state.toggle_editing();
            }
        }
        KeyCode::Up | KeyCode::BackTab => state.previous_field(),
        KeyCode::Down | KeyCode::Tab => state.next_field(),
        KeyCode::Right => state.cycle_option(true),
        KeyCode::Left => state.cycle_option(false),
        KeyCode::Char('s' | 'S') => state.submit(),
        KeyCode::Char('x' | 'X') => state.toast.dismiss(),
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut AppointmentFormState) -> Result<Option<AppointmentFormAction>> {
    let now = Instant::now();
    state.tick(now);
    if state.redirect_due(now) {
        return Ok(Some(AppointmentFormAction::Navigate(Route::Home)));
    }

    Ok(poll_key()?.and_then(|key| handle_key(state, key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use reqwest::StatusCode;

    fn filled_form() -> AppointmentFormState {
        let mut state = AppointmentFormState::new(AppointmentPrefill {
            client_id: Some("12".into()),
            dni: Some("12345678".into()),
        });
        state.title = "Baño y corte".into();
        state.appointment_type = Some(AppointmentType::Spa);
        state.address = "Av. Costanera 120".into();
        state.zone = Some(Zone::Puerto);
        state.date.date = NaiveDate::from_ymd_opt(2025, 3, 4);
        state.time = "14:30".into();
        state
    }

    fn type_text(state: &mut AppointmentFormState, text: &str) {
        for c in text.chars() {
            handle_key(state, KeyCode::Char(c));
        }
    }

    fn decode_error() -> ApiError {
        ApiError::Decode(serde_json::from_str::<serde_json::Value>("{").unwrap_err())
    }

    #[test]
    fn valid_form_queues_iso_payload() {
        let mut state = filled_form();

        state.submit_in(&Utc);

        let payload = state.take_pending().expect("payload queued");
        assert_eq!(payload.date, "2025-03-04T14:30:00.000Z");
        assert_eq!(payload.time, "14:30");
        assert_eq!(payload.appointment_type, "Spa");
        assert_eq!(payload.zone, "Zona Puerto");
        assert_eq!(payload.client_id.as_deref(), Some("12"));
        assert_eq!(payload.description, None);
        assert!(state.inline_error.is_none());
    }

    #[test]
    fn unparsable_time_blocks_submission() {
        let mut state = filled_form();
        state.time = "25:99".into();

        state.submit_in(&Utc);

        assert!(state.take_pending().is_none());
        assert_eq!(
            state.inline_error.as_deref(),
            Some("Please select a valid date and time.")
        );
    }

    #[test]
    fn missing_date_blocks_submission() {
        let mut state = filled_form();
        state.date = DateInputState::new();

        handle_key(&mut state, KeyCode::Char('s'));

        assert!(!state.is_submitting());
        assert_eq!(
            state.inline_error.as_deref(),
            Some("Please select a valid date and time.")
        );
    }

    #[test]
    fn missing_required_field_is_named() {
        let mut state = filled_form();
        state.title = "   ".into();
        state.submit_in(&Utc);
        assert_eq!(state.inline_error.as_deref(), Some("Title is required."));

        let mut state = filled_form();
        state.zone = None;
        state.submit_in(&Utc);
        assert_eq!(state.inline_error.as_deref(), Some("Zone is required."));
        assert!(!state.is_submitting());
    }

    #[test]
    fn typing_into_fields_through_keys() {
        let mut state = AppointmentFormState::new(AppointmentPrefill::default());

        handle_key(&mut state, KeyCode::Enter);
        type_text(&mut state, "Vacuna");
        handle_key(&mut state, KeyCode::Backspace);
        handle_key(&mut state, KeyCode::Enter);
        assert_eq!(state.title, "Vacun");
        assert!(!state.editing);

        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Right);
        handle_key(&mut state, KeyCode::Right);
        assert_eq!(state.appointment_type, Some(AppointmentType::VeterinaryCheckup));
        handle_key(&mut state, KeyCode::Left);
        handle_key(&mut state, KeyCode::Left);
        assert_eq!(state.appointment_type, Some(AppointmentType::Other));
    }

    #[test]
    fn time_field_accepts_digits_and_colon_only() {
        let mut state = AppointmentFormState::new(AppointmentPrefill::default());
        state.current_field = FormField::Time;

        handle_key(&mut state, KeyCode::Enter);
        type_text(&mut state, "0a9:1b5:00");

        assert_eq!(state.time, "09:15");
    }

    #[test]
    fn prefilled_dni_is_read_only() {
        let mut state = filled_form();
        state.current_field = FormField::Dni;

        handle_key(&mut state, KeyCode::Enter);
        type_text(&mut state, "99");

        assert!(!state.editing);
        assert_eq!(state.dni, "12345678");
    }

    #[test]
    fn invalid_prefilled_dni_stays_editable() {
        let mut state = AppointmentFormState::new(AppointmentPrefill {
            client_id: None,
            dni: Some("1234567x".into()),
        });
        state.current_field = FormField::Dni;

        handle_key(&mut state, KeyCode::Enter);
        assert!(state.editing);
        handle_key(&mut state, KeyCode::Backspace);
        type_text(&mut state, "8");

        assert_eq!(state.dni, "12345678");
    }

    #[test]
    fn uppercase_shortcut_submits() {
        let mut state = filled_form();

        handle_key(&mut state, KeyCode::Char('S'));

        assert!(state.is_submitting());
    }

    #[test]
    fn success_resets_form_and_schedules_redirect() {
        let mut state = filled_form();
        state.submit_in(&Utc);
        state.take_pending();
        let now = Instant::now();

        state.apply_submit_result(Ok(()), now);

        assert!(state.title.is_empty());
        assert!(state.dni.is_empty());
        assert!(state.client_id.is_none());
        assert_eq!(state.date.date, None);
        let toast = state.toast.current().unwrap();
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.message, "Appointment created successfully!");

        assert!(!state.redirect_due(now + Duration::from_secs(2)));
        assert!(state.redirect_due(now + REDIRECT_DELAY));
    }

    #[test]
    fn server_rejection_shows_its_message_and_keeps_fields() {
        let mut state = filled_form();
        state.submit_in(&Utc);
        state.take_pending();

        state.apply_submit_result(
            Err(ApiError::from_response_body(
                StatusCode::BAD_REQUEST,
                r#"{"error":"Zona inválida"}"#,
            )),
            Instant::now(),
        );

        let toast = state.toast.current().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Error: Zona inválida");
        assert_eq!(state.title, "Baño y corte");
        assert!(!state.redirect_due(Instant::now() + Duration::from_secs(10)));
    }

    #[test]
    fn server_rejection_without_body_mentions_status() {
        let mut state = filled_form();

        state.apply_submit_result(
            Err(ApiError::from_response_body(StatusCode::INTERNAL_SERVER_ERROR, "")),
            Instant::now(),
        );

        assert_eq!(
            state.toast.current().unwrap().message,
            "Error: request failed with status 500 Internal Server Error"
        );
    }

    #[test]
    fn transport_failure_shows_generic_message() {
        let mut state = filled_form();

        state.apply_submit_result(Err(decode_error()), Instant::now());

        assert_eq!(state.toast.current().unwrap().message, "Unknown error.");
    }

    #[test]
    fn escape_cancels_back_home() {
        let mut state = AppointmentFormState::new(AppointmentPrefill::default());
        assert!(matches!(
            handle_key(&mut state, KeyCode::Esc),
            Some(AppointmentFormAction::Navigate(Route::Home))
        ));
    }
}
