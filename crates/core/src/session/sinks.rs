//! Default notification and navigation sinks

use tracing::{error, info, warn};

use super::ports::{Navigation, Navigator, NotifyLevel, Notifier};

/// Writes notifications as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        match level {
            NotifyLevel::Success | NotifyLevel::Info => info!(?level, %message, "notification"),
            NotifyLevel::Warning => warn!(%message, "notification"),
            NotifyLevel::Error => error!(%message, "notification"),
        }
    }
}

/// Ignores navigation; for headless clients with no router.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNavigator;

impl Navigator for NullNavigator {
    fn navigate(&self, _to: Navigation) {}
}
