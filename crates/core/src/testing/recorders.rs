use std::sync::Arc;

use parking_lot::Mutex;

use crate::session::ports::{Navigation, Navigator, NotifyLevel, Notifier};

/// Keeps every notification for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    entries: Arc<Mutex<Vec<(NotifyLevel, String)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(NotifyLevel, String)> {
        self.entries.lock().clone()
    }

    pub fn messages(&self, level: NotifyLevel) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn count(&self, level: NotifyLevel, message: &str) -> usize {
        self.entries.lock().iter().filter(|(l, m)| *l == level && m == message).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        self.entries.lock().push((level, message.to_string()));
    }
}

/// Keeps every navigation request.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    history: Arc<Mutex<Vec<Navigation>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Navigation> {
        self.history.lock().clone()
    }

    pub fn last(&self) -> Option<Navigation> {
        self.history.lock().last().cloned()
    }

    pub fn logins(&self) -> usize {
        self.history.lock().iter().filter(|n| matches!(n, Navigation::Login { .. })).count()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, to: Navigation) {
        self.history.lock().push(to);
    }
}
