use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavItem {
    Home,
    Appointments,
    NewAppointment,
}

impl NavItem {
    const ALL: [NavItem; 3] = [NavItem::Home, NavItem::Appointments, NavItem::NewAppointment];

    fn label(&self) -> &'static str {
        match self {
            NavItem::Home => "F1 Home",
            NavItem::Appointments => "F2 Appointments",
            NavItem::NewAppointment => "F3 New Appointment",
        }
    }
}

pub fn render_nav_bar<B: Backend>(frame: &mut Frame<B>, area: Rect, active: Option<NavItem>) {
    let mut spans = vec![
        Span::styled(
            " Appointment Manager ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ];

    for item in NavItem::ALL {
        let style = if Some(item) == active {
            Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", item.label()), style));
        spans.push(Span::raw(" "));
    }

    let bar = Paragraph::new(Spans::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{nav_shortcut, AppointmentPrefill, Route};
    use crossterm::event::KeyCode;

    #[test]
    fn labels_match_global_shortcuts() {
        let labels: Vec<&str> = NavItem::ALL.iter().map(|item| item.label()).collect();
        assert_eq!(labels, vec!["F1 Home", "F2 Appointments", "F3 New Appointment"]);

        assert_eq!(nav_shortcut(KeyCode::F(1)), Some(Route::Home));
        assert_eq!(
            nav_shortcut(KeyCode::F(2)),
            Some(Route::SearchAppointments { dni: None })
        );
        assert_eq!(
            nav_shortcut(KeyCode::F(3)),
            Some(Route::CreateAppointment(AppointmentPrefill::default()))
        );
    }
}
