//! Navigation side effects.

use std::sync::Mutex;

/// Where the flow sends the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    EmailConfirmed,
    Login,
}

/// Moves the user between screens. Both calls are terminal for the flow.
pub trait Navigator: Send + Sync {
    fn email_confirmed(&self);

    fn back_to_login(&self);
}

/// Keeps every navigation, for inspection.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<Destination>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<Destination> {
        self.visits.lock().expect("navigator mutex poisoned").clone()
    }

    fn push(&self, destination: Destination) {
        self.visits
            .lock()
            .expect("navigator mutex poisoned")
            .push(destination);
    }
}

impl Navigator for RecordingNavigator {
    fn email_confirmed(&self) {
        self.push(Destination::EmailConfirmed);
    }

    fn back_to_login(&self) {
        self.push(Destination::Login);
    }
}
