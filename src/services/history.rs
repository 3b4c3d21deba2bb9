use gloo::events::EventListener;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{History, PopStateEvent, Window};

use super::analytics::Analytics;
use crate::error::PortfolioError;
use crate::model::HistoryEntry;

/// Destination for new history entries.
pub trait HistoryBackend {
    fn push(&self, entry: &HistoryEntry) -> Result<(), PortfolioError>;
}

/// `window.history` as a [`HistoryBackend`], plus the popstate feed going the
/// other way. State objects cross the boundary as JSON values; reading them is
/// left to the popup state.
pub struct BrowserHistory {
    history: History,
}

impl BrowserHistory {
    pub fn new(window: &Window) -> Result<Self, PortfolioError> {
        Ok(Self {
            history: window.history()?,
        })
    }

    /// State of the entry the page was loaded (or reloaded) on.
    pub fn current_state(&self) -> Value {
        self.history
            .state()
            .map(|state| js_to_value(&state))
            .unwrap_or(Value::Null)
    }

    /// Forwards every back/forward navigation's state unchanged.
    pub fn on_restore(window: &Window, deliver: impl Fn(Value) + 'static) -> EventListener {
        EventListener::new(window, "popstate", move |event| {
            let state = event
                .dyn_ref::<PopStateEvent>()
                .map(PopStateEvent::state)
                .unwrap_or(JsValue::NULL);
            deliver(js_to_value(&state));
        })
    }
}

impl HistoryBackend for BrowserHistory {
    fn push(&self, entry: &HistoryEntry) -> Result<(), PortfolioError> {
        let data = value_to_js(&entry.state.to_value())?;
        self.history
            .push_state_with_url(&data, &entry.title, Some(&entry.path))?;
        Ok(())
    }
}

/// Copies a structured-clone state object into a JSON value. Anything that
/// does not survive `JSON.stringify` becomes `null`.
pub fn js_to_value(state: &JsValue) -> Value {
    if state.is_undefined() || state.is_null() {
        return Value::Null;
    }
    js_sys::JSON::stringify(state)
        .ok()
        .and_then(|s| s.as_string())
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or(Value::Null)
}

pub fn value_to_js(value: &Value) -> Result<JsValue, PortfolioError> {
    let raw = serde_json::to_string(value).map_err(|e| PortfolioError::Js(e.to_string()))?;
    Ok(js_sys::JSON::parse(&raw)?)
}

/// Pushes `entry` and, for open entries, reports the page view. A failed push
/// is logged; the popup stays as it is.
pub fn record(history: &dyn HistoryBackend, analytics: &dyn Analytics, entry: &HistoryEntry) {
    if let Err(err) = history.push(entry) {
        log::warn!("history: push of {} failed: {}", entry.path, err);
        return;
    }
    log::debug!("history: pushed {} ({})", entry.path, entry.title);
    if entry.state.is_open() {
        analytics.page_view(&entry.title, &entry.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Anchor, NavigationState, WorkId};
    use std::cell::RefCell;

    #[derive(Default)]
    pub struct RecordingHistory {
        pub entries: RefCell<Vec<HistoryEntry>>,
        pub reject: bool,
    }

    impl HistoryBackend for RecordingHistory {
        fn push(&self, entry: &HistoryEntry) -> Result<(), PortfolioError> {
            if self.reject {
                return Err(PortfolioError::Js("SecurityError".into()));
            }
            self.entries.borrow_mut().push(entry.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct RecordingAnalytics {
        pub views: RefCell<Vec<(String, String)>>,
    }

    impl Analytics for RecordingAnalytics {
        fn page_view(&self, title: &str, path: &str) {
            self.views.borrow_mut().push((title.into(), path.into()));
        }
    }

    fn open_entry() -> HistoryEntry {
        let id = WorkId::new("acme", "logo");
        HistoryEntry {
            path: id.path(),
            state: NavigationState::open(id, Anchor::new(120.0, 80.0), Some("#ff0000".into())),
            title: "Acme Logo".into(),
        }
    }

    #[test]
    fn open_entries_are_pushed_and_reported() {
        let history = RecordingHistory::default();
        let analytics = RecordingAnalytics::default();
        record(&history, &analytics, &open_entry());
        assert_eq!(history.entries.borrow().len(), 1);
        assert_eq!(
            *analytics.views.borrow(),
            vec![("Acme Logo".to_string(), "./acme-logo.html".to_string())]
        );
    }

    #[test]
    fn closed_entries_are_not_reported() {
        let history = RecordingHistory::default();
        let analytics = RecordingAnalytics::default();
        let entry = HistoryEntry {
            state: NavigationState::closed(Anchor::default()),
            title: "Portfolio".into(),
            path: "/".into(),
        };
        record(&history, &analytics, &entry);
        assert_eq!(history.entries.borrow().len(), 1);
        assert!(analytics.views.borrow().is_empty());
    }

    #[test]
    fn rejected_push_skips_reporting() {
        let history = RecordingHistory {
            reject: true,
            ..Default::default()
        };
        let analytics = RecordingAnalytics::default();
        record(&history, &analytics, &open_entry());
        assert!(history.entries.borrow().is_empty());
        assert!(analytics.views.borrow().is_empty());
    }
}
