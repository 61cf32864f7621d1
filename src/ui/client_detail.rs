use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::ApiError;
use crate::models::Client;
use crate::ui::components::nav_bar::render_nav_bar;
use crate::ui::components::toast::{render_toast, Toast, ToastKind, ToastState};
use crate::ui::{centered_rect, nav_shortcut, page_chunks, poll_key, AppointmentPrefill, Route};

const TOAST_DURATION: Duration = Duration::from_secs(5);

pub enum ClientDetailAction {
    Navigate(Route),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientStatus {
    Loading,
    Loaded(Client),
    Failed(String),
}

pub struct ClientDetailState {
    client_id: String,
    status: ClientStatus,
    fetch_requested: bool,
    toast: ToastState,
}

impl ClientDetailState {
    /// Opening the screen requests exactly one fetch
    pub fn new(client_id: String) -> Self {
        Self {
            client_id,
            status: ClientStatus::Loading,
            fetch_requested: true,
            toast: ToastState::default(),
        }
    }

    pub fn status(&self) -> &ClientStatus {
        &self.status
    }

    pub fn take_pending(&mut self) -> Option<String> {
        if std::mem::take(&mut self.fetch_requested) {
            Some(self.client_id.clone())
        } else {
            None
        }
    }

    pub fn apply_fetch_result(&mut self, result: Result<Client, ApiError>) {
        let (error, notice) = match result {
            Ok(client) => {
                self.status = ClientStatus::Loaded(client);
                return;
            }
            Err(err) if err.is_server_error() => (
                err.server_message()
                    .unwrap_or("Error fetching the client.")
                    .to_string(),
                "Could not load the client",
            ),
            Err(_) => (
                "An error occurred while fetching the client.".to_string(),
                "Error fetching the client",
            ),
        };

        self.status = ClientStatus::Failed(error);
        self.toast
            .show(Toast::new(ToastKind::Info, "Notification", notice, TOAST_DURATION));
    }

    pub fn tick(&mut self, now: Instant) {
        self.toast.tick(now);
    }
}

fn local_date(instant: &DateTime<Utc>) -> String {
    instant.with_timezone(&Local).format("%d/%m/%Y").to_string()
}

fn field_line<'a>(label: &'a str, value: String) -> Spans<'a> {
    Spans::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::Gray)),
        Span::raw(value),
    ])
}

pub fn render_client_detail<B: Backend>(frame: &mut Frame<B>, state: &mut ClientDetailState) {
    let (nav, content, help) = page_chunks(frame.size());
    render_nav_bar(frame, nav, None);

    match state.status() {
        ClientStatus::Loading => render_message(frame, content, "Loading client...", Color::Gray),
        ClientStatus::Failed(error) => render_message(frame, content, error, Color::Red),
        ClientStatus::Loaded(client) => {
            let lines = vec![
                Spans::from(Span::styled(
                    client.name.as_str(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
                Spans::from(""),
                field_line("DNI", client.dni.clone()),
                field_line("Phone", client.phone.clone().unwrap_or_else(|| "N/A".to_string())),
                field_line("Created on", local_date(&client.created_at)),
                field_line("Last updated", local_date(&client.updated_at)),
            ];

            let details = Paragraph::new(lines)
                .block(Block::default().title("Client Details").borders(Borders::ALL));
            frame.render_widget(details, content);
        }
    }

    let buttons_text = match state.status {
        ClientStatus::Loaded(_) => "<N> New Appointment for this client | <Esc> Back",
        _ => "<Esc> Back",
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, help);

    render_toast(frame, &state.toast);
}

fn render_message<B: Backend>(frame: &mut Frame<B>, area: Rect, message: &str, color: Color) {
    let block = Block::default().title("Client Details").borders(Borders::ALL);
    frame.render_widget(block, area);

    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(color));
    frame.render_widget(text, centered_rect(80, 20, area));
}

pub fn handle_key(state: &mut ClientDetailState, key: KeyCode) -> Option<ClientDetailAction> {
    if let Some(route) = nav_shortcut(key) {
        return Some(ClientDetailAction::Navigate(route));
    }

    match key {
        KeyCode::Esc | KeyCode::Char('b' | 'B') => Some(ClientDetailAction::Navigate(Route::Home)),
        KeyCode::Char('n' | 'N') => match &state.status {
            ClientStatus::Loaded(client) => Some(ClientDetailAction::Navigate(Route::CreateAppointment(
                AppointmentPrefill {
                    client_id: Some(client.id.to_string()),
                    dni: Some(client.dni.clone()),
                },
            ))),
            _ => None,
        },
        KeyCode::Char('x' | 'X') => {
            state.toast.dismiss();
            None
        }
        _ => None,
    }
}

pub fn handle_input(state: &mut ClientDetailState) -> Result<Option<ClientDetailAction>> {
    state.tick(Instant::now());
    Ok(poll_key()?.and_then(|key| handle_key(state, key)))
}
