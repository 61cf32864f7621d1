pub mod appointment_form;
pub mod appointment_search;
pub mod client_detail;
pub mod components;
pub mod home;

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::layout::{Constraint, Direction, Layout, Rect};

/// How long the event loop waits for a key before redrawing
const TICK_RATE: Duration = Duration::from_millis(200);

/// Values handed to the create form when it is opened from elsewhere
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppointmentPrefill {
    pub client_id: Option<String>,
    pub dni: Option<String>,
}

/// A screen the application can navigate to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    SearchAppointments { dni: Option<String> },
    CreateAppointment(AppointmentPrefill),
    ClientDetail(String),
}

/// Global shortcuts shared by every screen
pub fn nav_shortcut(key: KeyCode) -> Option<Route> {
    match key {
        KeyCode::F(1) => Some(Route::Home),
        KeyCode::F(2) => Some(Route::SearchAppointments { dni: None }),
        KeyCode::F(3) => Some(Route::CreateAppointment(AppointmentPrefill::default())),
        _ => None,
    }
}

/// Wait up to one tick for a key press.
///
/// Returns `None` on timeout so callers can expire toasts and timers.
pub fn poll_key() -> Result<Option<KeyCode>> {
    if event::poll(TICK_RATE)? {
        if let Event::Key(key) = event::read()? {
            return Ok(Some(key.code));
        }
    }
    Ok(None)
}

/// Split a screen into nav bar, content and help line
pub fn page_chunks(size: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(size);

    (chunks[0], chunks[1], chunks[2])
}

// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
