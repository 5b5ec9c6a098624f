// navigation.rs
use std::sync::Mutex;

/// Views the sync engine can send the user to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    MyRequests,
    RequestDetail { id: i64 },
    Messages,
    Conversation { work_request_id: i64, other_user_id: i64 },
    Notifications,
}

/// Implemented by the UI shell.
pub trait Navigator: Send + Sync {
    fn current(&self) -> Option<Route>;
    fn navigate(&self, route: Route);
}

/// Navigates only when the target differs from the current view.
/// Returns whether a navigation happened.
pub fn navigate_once(navigator: &dyn Navigator, route: Route) -> bool {
    if navigator.current().as_ref() == Some(&route) {
        tracing::debug!("Already on {:?}, skipping navigation", route);
        return false;
    }
    navigator.navigate(route);
    true
}

/// Records every navigation; used by the headless binary and in tests.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Route>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Route> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

impl Navigator for HistoryNavigator {
    fn current(&self) -> Option<Route> {
        self.history.lock().ok().and_then(|h| h.last().cloned())
    }

    fn navigate(&self, route: Route) {
        tracing::info!("Navigating to {:?}", route);
        if let Ok(mut history) = self.history.lock() {
            history.push(route);
        }
    }
}
