//! Core data models for the popup layer.
//! Navigation payloads are what lands in browser history; fragments are what the
//! content resolver hands back for a work item.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifies one work item inside one project.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkId {
    pub project: String,
    pub work: String,
}

impl WorkId {
    pub fn new(project: impl Into<String>, work: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            work: work.into(),
        }
    }

    /// Cache key and page stem: `{project}-{work}`.
    pub fn ident(&self) -> String {
        format!("{}-{}", self.project, self.work)
    }

    /// Canonical URL path recorded in history while this work is open.
    pub fn path(&self) -> String {
        format!("./{}.html", self.ident())
    }

    pub fn stylesheet_href(&self) -> String {
        format!("./{}/{}/styles.css", self.project, self.work)
    }
}

/// Viewport coordinates the open/close animation starts from.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Wire shape of a history entry's state object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

/// The unit persisted to and restored from history.
///
/// `work` is `Some` exactly when the state describes an open popup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavigationState {
    pub work: Option<WorkId>,
    pub anchor: Anchor,
    pub fill: Option<String>,
}

impl NavigationState {
    pub fn open(work: WorkId, anchor: Anchor, fill: Option<String>) -> Self {
        Self {
            work: Some(work),
            anchor,
            fill,
        }
    }

    pub fn closed(anchor: Anchor) -> Self {
        Self {
            work: None,
            anchor,
            fill: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.work.is_some()
    }

    /// Interprets whatever the browser stored for a history entry.
    ///
    /// Non-objects, objects that fail to decode and partial identities all
    /// collapse to the closed state; missing coordinates default to (0, 0).
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        match serde_json::from_value::<HistoryPayload>(value.clone()) {
            Ok(payload) => Self::from_payload(payload),
            Err(err) => {
                log::debug!("unrecognised history state {}: {}", value, err);
                Self::default()
            }
        }
    }

    pub fn from_payload(payload: HistoryPayload) -> Self {
        let anchor = Anchor::new(
            payload.x.filter(|v| v.is_finite()).unwrap_or(0.0),
            payload.y.filter(|v| v.is_finite()).unwrap_or(0.0),
        );
        let work = match (payload.project, payload.work) {
            (Some(project), Some(work)) if !project.is_empty() && !work.is_empty() => {
                Some(WorkId { project, work })
            }
            _ => None,
        };
        let fill = if work.is_some() {
            payload.fill.filter(|f| !f.is_empty())
        } else {
            None
        };
        Self { work, anchor, fill }
    }

    pub fn to_payload(&self) -> HistoryPayload {
        match &self.work {
            Some(id) => HistoryPayload {
                project: Some(id.project.clone()),
                work: Some(id.work.clone()),
                x: Some(self.anchor.x),
                y: Some(self.anchor.y),
                fill: self.fill.clone(),
            },
            None => HistoryPayload::default(),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self.to_payload()).unwrap_or(Value::Null)
    }
}

/// One entry to be pushed onto browser history.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub state: NavigationState,
    pub title: String,
    pub path: String,
}

/// Content extracted from a work page. Both fields are `None` when the page
/// had no element carrying the work's id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    pub title: Option<String>,
    pub html: Option<String>,
}

impl Fragment {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.html.is_none()
    }
}
