use chrono::{DateTime, Utc};

/// Session-only display state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    pub last_price: Option<f64>,
    pub last_update: Option<DateTime<Utc>>,
}

impl DisplayState {
    pub fn record(&mut self, price: f64, at: DateTime<Utc>) {
        self.last_price = Some(price);
        self.last_update = Some(at);
    }
}
