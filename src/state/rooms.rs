#[cfg(test)]
#[path = "rooms_test.rs"]
mod rooms_test;

use crate::net::types::Room;

/// Room list shown on the dashboard.
///
/// Failures are kept inline in `error`; the last good `items` stay in place
/// so a failed refresh never blanks the list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoomsState {
    pub items: Vec<Room>,
    pub loading: bool,
    pub error: Option<String>,
}

impl RoomsState {
    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    pub fn finish_load(&mut self, items: Vec<Room>) {
        self.items = items;
        self.loading = false;
        self.error = None;
    }

    pub fn fail_load(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }
}
