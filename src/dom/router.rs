use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget, Node};

use super::matcher::{match_ancestor, AncestorNode};

type Handler<E, N> = Rc<dyn Fn(&E, &N)>;

struct Entry<E, N> {
    id: u64,
    event_type: String,
    selector: String,
    handler: Handler<E, N>,
}

/// Selector subscriptions grouped by event type, independent of how events
/// reach it.
pub struct Registry<E, N> {
    next_id: u64,
    entries: Vec<Entry<E, N>>,
}

impl<E, N> Default for Registry<E, N> {
    fn default() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }
}

impl<E, N: AncestorNode> Registry<E, N> {
    pub fn add(&mut self, event_type: &str, selector: &str, handler: Handler<E, N>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            event_type: event_type.to_string(),
            selector: selector.to_string(),
            handler,
        });
        id
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Handlers whose selector matches `target` or one of its ancestors,
    /// paired with the matched node, in subscription order.
    fn matching(&self, event_type: &str, target: &N) -> Vec<(Handler<E, N>, N)> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .filter_map(|e| match_ancestor(target, &e.selector).map(|m| (e.handler.clone(), m)))
            .collect()
    }
}

/// Routes one observed event. The registry borrow is released before any
/// handler runs, so handlers may subscribe or unsubscribe freely.
pub fn dispatch<E, N: AncestorNode>(
    registry: &RefCell<Registry<E, N>>,
    event_type: &str,
    event: &E,
    target: &N,
) -> usize {
    let matched = registry.borrow().matching(event_type, target);
    let count = matched.len();
    for (handler, node) in matched {
        handler(event, &node);
    }
    count
}

struct RouterInner {
    root: EventTarget,
    registry: RefCell<Registry<Event, Node>>,
    // One listener per event type, created on first subscription and kept
    // until the router goes away.
    listeners: RefCell<HashMap<String, EventListener>>,
}

/// Delegated event subscription rooted at one target (normally the document).
#[derive(Clone)]
pub struct EventRouter {
    inner: Rc<RouterInner>,
}

impl EventRouter {
    pub fn new(root: impl Into<EventTarget>) -> Self {
        Self {
            inner: Rc::new(RouterInner {
                root: root.into(),
                registry: RefCell::new(Registry::default()),
                listeners: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Calls `handler(event, matched)` for every `event_type` event whose
    /// target sits at or below an element matching `selector`.
    pub fn subscribe<F>(&self, event_type: &str, selector: &str, handler: F) -> Subscription
    where
        F: Fn(&Event, &Element) + 'static,
    {
        let handler: Handler<Event, Node> = Rc::new(move |event: &Event, node: &Node| {
            if let Some(el) = node.dyn_ref::<Element>() {
                handler(event, el);
            }
        });
        let id = self
            .inner
            .registry
            .borrow_mut()
            .add(event_type, selector, handler);
        self.ensure_listener(event_type);
        log::debug!("router: subscribed #{} {} {}", id, event_type, selector);
        Subscription {
            router: Rc::downgrade(&self.inner),
            id,
            active: Cell::new(true),
        }
    }

    fn ensure_listener(&self, event_type: &str) {
        let mut listeners = self.inner.listeners.borrow_mut();
        if listeners.contains_key(event_type) {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        let kind = event_type.to_string();
        let listener = EventListener::new(&self.inner.root, kind.clone(), move |event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Node>().ok()) else {
                return;
            };
            dispatch(&inner.registry, &kind, event, &target);
        });
        listeners.insert(event_type.to_string(), listener);
    }
}

/// Handle returned by [`EventRouter::subscribe`]. Dropping it unsubscribes.
pub struct Subscription {
    router: Weak<RouterInner>,
    id: u64,
    active: Cell<bool>,
}

impl Subscription {
    /// Stops future deliveries. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(inner) = self.router.upgrade() {
            inner.registry.borrow_mut().remove(self.id);
            log::debug!("router: unsubscribed #{}", self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;
    use web_sys::HtmlElement;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn unsubscribe_is_idempotent_and_isolated() {
        let document = web_sys::window().unwrap().document().unwrap();
        let root = document.create_element("div").unwrap();
        root.set_inner_html(r#"<p data-work="w"><a id="router-link">x</a></p>"#);
        document.body().unwrap().append_child(&root).unwrap();

        let router = EventRouter::new(document.clone());
        let hits = Rc::new(Cell::new(0));
        let other = Rc::new(Cell::new(0));
        let sub = {
            let hits = hits.clone();
            router.subscribe("click", "[data-work] > a", move |_, _| hits.set(hits.get() + 1))
        };
        let _keep = {
            let other = other.clone();
            router.subscribe("click", "[data-work]", move |_, _| other.set(other.get() + 1))
        };

        let link: HtmlElement = document
            .get_element_by_id("router-link")
            .unwrap()
            .dyn_into()
            .unwrap();
        link.click();
        sub.unsubscribe();
        sub.unsubscribe();
        link.click();

        assert_eq!(hits.get(), 1);
        assert_eq!(other.get(), 2);
        root.remove();
    }
}
