use chrono::{Datelike, Local, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// Segmented year/month/day picker.
///
/// Starts without a date; the first edit opens on today's date.
pub struct DateInputState {
    pub date: Option<NaiveDate>,
    pub editing: bool,
    pub date_part: DatePart,
    pub current_input: String,
}

impl DateInputState {
    pub fn new() -> Self {
        Self {
            date: None,
            editing: false,
            date_part: DatePart::Year,
            current_input: String::new(),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.toggle_editing_from(Local::now().date_naive());
    }

    /// Same as `toggle_editing`, with the date used when none is set yet
    pub fn toggle_editing_from(&mut self, today: NaiveDate) {
        self.editing = !self.editing;
        if self.editing {
            self.date.get_or_insert(today);
            self.date_part = DatePart::Year;
        }
        self.current_input.clear();
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.current_input.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.current_input.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }
        let Some(date) = self.date else {
            return;
        };

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.current_input.push(c);
                let width = match self.date_part {
                    DatePart::Year => 4,
                    DatePart::Month | DatePart::Day => 2,
                };
                if self.current_input.len() < width {
                    return;
                }

                let candidate = self.current_input.parse::<u32>().ok().and_then(|value| match self.date_part {
                    DatePart::Year if (1900..=2100).contains(&value) => date.with_year(value as i32),
                    DatePart::Month => date.with_month(value),
                    DatePart::Day => date.with_day(value),
                    _ => None,
                });
                // Out-of-range entries leave the date untouched
                if let Some(new_date) = candidate {
                    self.date = Some(new_date);
                }
                self.current_input.clear();
            }
            KeyCode::Backspace => {
                self.current_input.pop();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            KeyCode::Up => self.step(1),
            KeyCode::Down => self.step(-1),
            _ => {}
        }
    }

    /// Move the selected part one unit, like scrolling a calendar
    fn step(&mut self, delta: i32) {
        let Some(date) = self.date else {
            return;
        };
        let stepped = match self.date_part {
            DatePart::Year => date.with_year(date.year() + delta),
            DatePart::Month => {
                let months = chrono::Months::new(1);
                if delta > 0 {
                    date.checked_add_months(months)
                } else {
                    date.checked_sub_months(months)
                }
            }
            DatePart::Day => date.checked_add_signed(chrono::Duration::days(delta as i64)),
        };
        if let Some(new_date) = stepped {
            self.date = Some(new_date);
        }
        self.current_input.clear();
    }

    pub fn get_display_string(&self) -> String {
        let Some(date) = self.date else {
            return "Select a date".to_string();
        };

        let (year, month, day) = (
            format!("{:04}", date.year()),
            format!("{:02}", date.month()),
            format!("{:02}", date.day()),
        );
        if !self.editing {
            return format!("{}-{}-{}", year, month, day);
        }

        let current = if self.current_input.is_empty() {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        } else {
            format!("[{}]", self.current_input)
        };

        match self.date_part {
            DatePart::Year => format!("{}{}-{}-{}", year, current, month, day),
            DatePart::Month => format!("{}-{}{}-{}", year, month, current, day),
            DatePart::Day => format!("{}-{}-{}{}", year, month, day, current),
        }
    }
}

impl Default for DateInputState {
    fn default() -> Self {
        Self::new()
    }
}
