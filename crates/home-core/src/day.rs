use chrono::{Local, NaiveDate};
use tracing::warn;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Parent,
    Kid,
}

/// A selected day seen from `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayView {
    pub date: NaiveDate,
    pub today: NaiveDate,
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl DayView {
    pub fn new(date: NaiveDate, today: NaiveDate) -> Self {
        Self { date, today }
    }

    /// Unparsable input falls back to today.
    pub fn parse_or_today(raw: Option<&str>, today: NaiveDate) -> Self {
        let date = match raw.map(str::trim) {
            Some(text) => NaiveDate::parse_from_str(text, DATE_FORMAT).unwrap_or_else(|err| {
                warn!(date = %text, error = %err, "invalid date; using today");
                today
            }),
            None => today,
        };
        Self::new(date, today)
    }

    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn prev(&self) -> NaiveDate {
        self.date.pred_opt().unwrap_or(self.date)
    }

    pub fn next(&self) -> NaiveDate {
        self.date.succ_opt().unwrap_or(self.date)
    }

    fn yesterday(&self) -> Option<NaiveDate> {
        self.today.pred_opt()
    }

    fn tomorrow(&self) -> Option<NaiveDate> {
        self.today.succ_opt()
    }

    pub fn current_label(&self) -> String {
        if self.date == self.today {
            format!("{} (Today)", self.date_string())
        } else {
            self.date_string()
        }
    }

    pub fn prev_label(&self) -> String {
        let prev = self.prev();
        if Some(prev) == self.yesterday() {
            "< Yesterday".to_string()
        } else {
            format!("< {}", prev.format(DATE_FORMAT))
        }
    }

    pub fn next_label(&self) -> String {
        let next = self.next();
        if Some(next) == self.tomorrow() {
            "Tomorrow >".to_string()
        } else {
            format!("{} >", next.format(DATE_FORMAT))
        }
    }

    /// Kids may only change today and yesterday.
    pub fn is_editable(&self, role: Role) -> bool {
        match role {
            Role::Parent => true,
            Role::Kid => self.date == self.today || Some(self.date) == self.yesterday(),
        }
    }

    pub fn header(&self) -> String {
        format!(
            "{}  {}  {}",
            self.prev_label(),
            self.current_label(),
            self.next_label()
        )
    }
}
