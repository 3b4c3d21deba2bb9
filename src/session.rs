use std::rc::Rc;

use serde_json::Value;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Window};

use crate::config::PortfolioConfig;
use crate::dom::{EventRouter, ScrollBlink};
use crate::error::PortfolioError;
use crate::model::NavigationState;
use crate::services::analytics::{self, Analytics};
use crate::services::{
    BrowserHistory, ContentResolver, DocumentStylesheets, HttpFragmentSource, StylesheetLoader,
};

/// Title and path of the closed popup, captured from the page at load.
#[derive(Clone, Debug, PartialEq)]
pub struct Defaults {
    pub title: String,
    pub path: String,
}

/// Everything the popup needs from the page, owned in one place and handed to
/// the app shell.
pub struct Session {
    pub config: PortfolioConfig,
    pub window: Window,
    pub document: Document,
    pub popup: HtmlElement,
    pub body: HtmlElement,
    pub router: EventRouter,
    pub resolver: ContentResolver<HttpFragmentSource>,
    pub stylesheets: StylesheetLoader<DocumentStylesheets>,
    pub analytics: Box<dyn Analytics>,
    pub history: BrowserHistory,
    pub defaults: Defaults,
    /// History state of the entry the page loaded on.
    pub initial_state: Value,
}

impl Session {
    pub fn from_document(
        window: Window,
        document: Document,
        config: PortfolioConfig,
    ) -> Result<Rc<Self>, PortfolioError> {
        let popup_selector = format!("#{}", config.popup_id);
        let popup = document
            .get_element_by_id(&config.popup_id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or(PortfolioError::MissingElement(popup_selector))?;
        let body = document
            .body()
            .ok_or_else(|| PortfolioError::MissingElement("body".into()))?;
        let history = BrowserHistory::new(&window)?;
        let initial_state = history.current_state();

        let pathname = window.location().pathname()?;
        let defaults = Defaults {
            title: document.title(),
            path: home_path(
                &pathname,
                NavigationState::from_value(&initial_state).is_open(),
                config.home_path.as_deref(),
            ),
        };
        log::debug!("session: defaults {:?}", defaults);

        Ok(Rc::new(Self {
            router: EventRouter::new(document.clone()),
            resolver: ContentResolver::new(HttpFragmentSource::default()),
            stylesheets: StylesheetLoader::new(DocumentStylesheets::new(document.clone())),
            analytics: analytics::detect(&window, config.analytics),
            config,
            window,
            document,
            popup,
            body,
            history,
            defaults,
            initial_state,
        }))
    }

    pub fn scroll_blink(&self) -> Option<ScrollBlink> {
        let id = self.config.blink_id.as_deref()?;
        let Some(target) = self.document.get_element_by_id(id) else {
            log::warn!("scroll: #{} not found, blink disabled", id);
            return None;
        };
        Some(ScrollBlink::attach(
            &self.window,
            target,
            self.config.blink_class.clone(),
            self.config.blink_step_px,
        ))
    }
}

/// Path recorded for the closed popup.
///
/// A page reloaded while a popup was open sits on the work's own path, so the
/// home path is then the directory holding it.
pub fn home_path(pathname: &str, loaded_open: bool, configured: Option<&str>) -> String {
    if let Some(path) = configured.filter(|p| !p.is_empty()) {
        return path.to_string();
    }
    if !loaded_open {
        return pathname.to_string();
    }
    match pathname.rfind('/') {
        Some(i) => pathname[..=i].to_string(),
        None => "./".to_string(),
    }
}
