use std::time::{Duration, Instant};

use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    fn color(&self) -> Color {
        match self {
            ToastKind::Success => Color::Green,
            ToastKind::Error => Color::Red,
            ToastKind::Info => Color::Cyan,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
    expires_at: Instant,
}

impl Toast {
    pub fn new(kind: ToastKind, title: &str, message: impl Into<String>, duration: Duration) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message: message.into(),
            expires_at: Instant::now() + duration,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Holds at most one toast; a new one replaces the current one.
#[derive(Default)]
pub struct ToastState {
    current: Option<Toast>,
}

impl ToastState {
    pub fn show(&mut self, toast: Toast) {
        self.current = Some(toast);
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Drop the toast once its time is up
    pub fn tick(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }
}

/// Bottom-right corner of `area`, clamped to its size
fn toast_area(area: Rect) -> Rect {
    let width = TOAST_WIDTH.min(area.width);
    let height = TOAST_HEIGHT.min(area.height);
    Rect::new(
        area.x + area.width - width,
        area.y + area.height - height,
        width,
        height,
    )
}

pub fn render_toast<B: Backend>(frame: &mut Frame<B>, state: &ToastState) {
    let Some(toast) = state.current() else {
        return;
    };

    let area = toast_area(frame.size());
    let color = toast.kind.color();

    let popup = Paragraph::new(vec![
        Spans::from(Span::raw(toast.message.as_str())),
        Spans::from(Span::styled("<x> dismiss", Style::default().fg(Color::DarkGray))),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(
                toast.title.as_str(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    )
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_duration() {
        let mut state = ToastState::default();
        state.show(Toast::new(ToastKind::Info, "Notification", "hola", Duration::from_millis(1500)));

        state.tick(Instant::now());
        assert!(state.current().is_some());

        state.tick(Instant::now() + Duration::from_millis(1600));
        assert!(state.current().is_none());
    }

    #[test]
    fn new_toast_replaces_previous() {
        let mut state = ToastState::default();
        state.show(Toast::new(ToastKind::Error, "Error", "first", Duration::from_secs(5)));
        state.show(Toast::new(ToastKind::Success, "Success", "second", Duration::from_secs(5)));

        let toast = state.current().unwrap();
        assert_eq!(toast.message, "second");
        assert_eq!(toast.kind, ToastKind::Success);

        state.dismiss();
        assert!(state.current().is_none());
    }

    #[test]
    fn area_hugs_bottom_right_corner() {
        let area = toast_area(Rect::new(0, 0, 100, 30));
        assert_eq!(area, Rect::new(56, 25, 44, 5));

        let small = toast_area(Rect::new(0, 0, 20, 3));
        assert_eq!(small, Rect::new(0, 0, 20, 3));
    }
}
