use anyhow::Result;
use chrono::{Datelike, Local};
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::ui::components::nav_bar::{render_nav_bar, NavItem};
use crate::ui::{nav_shortcut, page_chunks, poll_key, AppointmentPrefill, Route};

#[derive(Clone, Copy)]
enum MenuTarget {
    Search,
    Create,
}

struct MenuEntry {
    title: &'static str,
    description: &'static str,
    target: MenuTarget,
}

impl MenuEntry {
    fn route(&self) -> Route {
        match self.target {
            MenuTarget::Search => Route::SearchAppointments { dni: None },
            MenuTarget::Create => Route::CreateAppointment(AppointmentPrefill::default()),
        }
    }
}

static MENU: [MenuEntry; 2] = [
    MenuEntry {
        title: "Manage Appointments",
        description: "Look up a client's appointments by DNI",
        target: MenuTarget::Search,
    },
    MenuEntry {
        title: "New Appointment",
        description: "Schedule a new appointment quickly",
        target: MenuTarget::Create,
    },
];

pub enum HomeAction {
    Exit,
    Navigate(Route),
}

// Represents the state of the landing screen
pub struct HomeState {
    list_state: ListState,
}

impl HomeState {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self { list_state }
    }

    pub fn next(&mut self) {
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < MENU.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let i = match self.list_state.selected() {
            Some(0) | None => MENU.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected_route(&self) -> Option<Route> {
        self.list_state
            .selected()
            .and_then(|i| MENU.get(i))
            .map(MenuEntry::route)
    }
}

impl Default for HomeState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_home<B: Backend>(frame: &mut Frame<B>, state: &mut HomeState) {
    let (nav, content, help) = page_chunks(frame.size());
    render_nav_bar(frame, nav, Some(NavItem::Home));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(4), Constraint::Length(1)].as_ref())
        .split(content);

    let heading = Paragraph::new(vec![
        Spans::from(Span::styled(
            "Appointment Manager",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Spans::from("Advanced appointment scheduling"),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(heading, chunks[0]);

    let items: Vec<ListItem> = MENU
        .iter()
        .map(|entry| {
            ListItem::new(vec![
                Spans::from(Span::styled(entry.title, Style::default().add_modifier(Modifier::BOLD))),
                Spans::from(Span::styled(entry.description, Style::default().fg(Color::Gray))),
            ])
        })
        .collect();

    let menu = List::new(items)
        .block(Block::default().title("Menu").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(menu, chunks[1], &mut state.list_state);

    let footer = Paragraph::new(format!("{} Appointment Manager", Local::now().year()))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);

    let buttons = Paragraph::new("<Up/Down> Select | <Enter> Open | <Q> Quit")
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, help);
}

pub fn handle_key(state: &mut HomeState, key: KeyCode) -> Option<HomeAction> {
    if let Some(route) = nav_shortcut(key) {
        return Some(HomeAction::Navigate(route));
    }

    match key {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => return Some(HomeAction::Exit),
        KeyCode::Down => state.next(),
        KeyCode::Up => state.previous(),
        KeyCode::Enter => return state.selected_route().map(HomeAction::Navigate),
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut HomeState) -> Result<Option<HomeAction>> {
    Ok(poll_key()?.and_then(|key| handle_key(state, key)))
}
