//! Popup navigation state.
//!
//! Every click and every back/forward navigation becomes a [`PopupAction`];
//! the reducer decides what the popup, the document title and the history
//! stack should look like next. Work that happens outside the reducer
//! (fetching, animation frames, pushing history) reports back through actions
//! stamped with the `ticket` they were started for, and anything carrying an
//! old ticket is dropped.

use std::rc::Rc;

use serde_json::Value;
use yew::Reducible;

use crate::error::PortfolioError;
use crate::model::{Anchor, Fragment, HistoryEntry, NavigationState, WorkId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopupPhase {
    Closed,
    /// Content pending or transition still running.
    Opening,
    Open,
}

/// Where the popup sits in its open/close choreography.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStep {
    /// Never shown since load.
    Idle,
    /// Placed at the anchor with transitions off; held for two frames.
    Snap,
    /// Transitions on, heading to its resting place (centre when opening,
    /// the anchor when closing).
    Animate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Click,
    /// Replaying a history entry; never pushes a new one.
    Restore,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OpenRequest {
    pub work: WorkId,
    pub anchor: Anchor,
    pub fill: Option<String>,
}

#[derive(Clone, Debug)]
pub enum PopupAction {
    Open(OpenRequest),
    Close(Anchor),
    /// Raw state of the history entry navigated to.
    Restore(Value),
    FramesElapsed { ticket: u64 },
    AnimationSettled { ticket: u64 },
    ContentResolved { ticket: u64, fragment: Rc<Fragment> },
    ContentFailed { ticket: u64, error: PortfolioError },
}

#[derive(Clone, Debug, PartialEq)]
pub struct PopupState {
    default_title: String,
    default_path: String,
    pub phase: PopupPhase,
    /// Bumped by every accepted open/close/restore.
    pub ticket: u64,
    pub origin: Origin,
    /// Identity and anchor of the current target (closed when not open).
    pub nav: NavigationState,
    /// Last tint applied; kept through the close animation.
    pub tint: Option<String>,
    pub frame: FrameStep,
    pub content_ready: bool,
    pub settled: bool,
    pub title: String,
    pub content: Option<Rc<Fragment>>,
    pub locked: bool,
    /// Bumped whenever `pending_push` holds a new entry to record.
    pub push_seq: u64,
    pub pending_push: Option<HistoryEntry>,
    /// Whether the history entry the browser is on describes an open popup.
    pub entry_open: bool,
    pub failure: Option<PortfolioError>,
}

impl PopupState {
    pub fn new(default_title: impl Into<String>, default_path: impl Into<String>) -> Self {
        let default_title = default_title.into();
        Self {
            title: default_title.clone(),
            default_title,
            default_path: default_path.into(),
            phase: PopupPhase::Closed,
            ticket: 0,
            origin: Origin::Click,
            nav: NavigationState::default(),
            tint: None,
            frame: FrameStep::Idle,
            content_ready: false,
            settled: false,
            content: None,
            locked: false,
            push_seq: 0,
            pending_push: None,
            entry_open: false,
            failure: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.phase == PopupPhase::Closed
    }

    fn is_current(&self, ticket: u64) -> bool {
        ticket == self.ticket && self.phase == PopupPhase::Opening
    }

    fn begin_open(&mut self, nav: NavigationState, origin: Origin) {
        self.ticket += 1;
        self.phase = PopupPhase::Opening;
        self.origin = origin;
        self.tint = nav.fill.clone();
        self.nav = nav;
        self.frame = FrameStep::Snap;
        self.content_ready = false;
        self.settled = false;
        self.content = None;
        self.title = self.default_title.clone();
        self.locked = true;
        self.failure = None;
    }

    /// Returns false when there was nothing to close.
    ///
    /// A click close only pushes when the entry being left shows a popup; an
    /// open that never got its entry leaves nothing to close in history.
    fn begin_close(&mut self, anchor: Anchor, origin: Origin) -> bool {
        if self.is_closed() {
            return false;
        }
        self.ticket += 1;
        self.reset_closed(anchor, origin);
        if origin == Origin::Click && self.entry_open {
            self.push(HistoryEntry {
                state: self.nav.clone(),
                title: self.default_title.clone(),
                path: self.default_path.clone(),
            });
        }
        true
    }

    fn reset_closed(&mut self, anchor: Anchor, origin: Origin) {
        self.phase = PopupPhase::Closed;
        self.origin = origin;
        self.nav = NavigationState::closed(anchor);
        self.frame = FrameStep::Animate;
        self.content_ready = false;
        self.settled = false;
        self.content = None;
        self.title = self.default_title.clone();
        self.locked = false;
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.entry_open = entry.state.is_open();
        self.push_seq += 1;
        self.pending_push = Some(entry);
    }

    fn complete_if_ready(&mut self) {
        if self.content_ready && self.settled {
            self.phase = PopupPhase::Open;
        }
    }
}

impl Reducible for PopupState {
    type Action = PopupAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use PopupAction::*;
        let mut new = (*self).clone();
        match action {
            Open(req) => {
                log::debug!("popup: open {} from click", req.work.ident());
                new.begin_open(NavigationState::open(req.work, req.anchor, req.fill), Origin::Click);
            }
            Close(anchor) => {
                if !new.begin_close(anchor, Origin::Click) {
                    return self;
                }
                log::debug!("popup: close from click");
            }
            Restore(raw) => {
                let nav = NavigationState::from_value(&raw);
                if nav.is_open() {
                    log::debug!("popup: restore open {:?}", nav.work);
                    new.begin_open(nav, Origin::Restore);
                    new.entry_open = true;
                } else {
                    let closed = new.begin_close(nav.anchor, Origin::Restore);
                    new.entry_open = false;
                    if !closed && !self.entry_open {
                        return self;
                    }
                }
            }
            FramesElapsed { ticket } => {
                if !new.is_current(ticket) || new.frame != FrameStep::Snap {
                    return self;
                }
                new.frame = FrameStep::Animate;
            }
            AnimationSettled { ticket } => {
                if !new.is_current(ticket) || new.frame != FrameStep::Animate || new.settled {
                    return self;
                }
                new.settled = true;
                new.complete_if_ready();
            }
            ContentResolved { ticket, fragment } => {
                if !new.is_current(ticket) || new.content_ready {
                    log::debug!("popup: dropping stale content for ticket {}", ticket);
                    return self;
                }
                new.content_ready = true;
                new.title = fragment
                    .title
                    .clone()
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| new.default_title.clone());
                new.content = Some(fragment);
                if new.origin == Origin::Click {
                    if let Some(work) = new.nav.work.clone() {
                        let entry = HistoryEntry {
                            state: new.nav.clone(),
                            title: new.title.clone(),
                            path: work.path(),
                        };
                        new.push(entry);
                    }
                }
                new.complete_if_ready();
            }
            ContentFailed { ticket, error } => {
                if !new.is_current(ticket) || new.content_ready {
                    return self;
                }
                let anchor = new.nav.anchor;
                let origin = new.origin;
                new.ticket += 1;
                new.reset_closed(anchor, origin);
                new.failure = Some(error);
            }
        }
        Rc::new(new)
    }
}
