use web_sys::{Document, HtmlElement};

use super::popup::{FrameStep, PopupState};
use crate::config::PortfolioConfig;

/// Everything about the page that follows from the popup state, apart from the
/// popup's inner markup.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    pub opened: bool,
    pub animated: bool,
    pub top: f64,
    pub left: f64,
    pub background: String,
    pub locked: bool,
    pub title: String,
    pub failed: bool,
}

impl Surface {
    pub fn project(state: &PopupState) -> Self {
        let at_anchor = !(state.frame == FrameStep::Animate && !state.is_closed());
        let (top, left) = if at_anchor {
            (state.nav.anchor.y, state.nav.anchor.x)
        } else {
            (0.0, 0.0)
        };
        Self {
            opened: !state.is_closed() && state.frame == FrameStep::Animate,
            animated: state.frame == FrameStep::Animate,
            top,
            left,
            background: state
                .tint
                .clone()
                .unwrap_or_else(|| "transparent".to_string()),
            locked: state.locked,
            title: state.title.clone(),
            failed: state.failure.is_some(),
        }
    }

    pub fn apply(
        &self,
        config: &PortfolioConfig,
        document: &Document,
        popup: &HtmlElement,
        body: &HtmlElement,
    ) {
        let classes = popup.class_list();
        let _ = classes.toggle_with_force(&config.animated_class, self.animated);
        let _ = classes.toggle_with_force(&config.opened_class, self.opened);
        let style = popup.style();
        let _ = style.set_property("top", &format!("{}px", self.top));
        let _ = style.set_property("left", &format!("{}px", self.left));
        let _ = style.set_property("background-color", &self.background);
        if self.failed {
            let _ = popup.set_attribute("data-error", "");
        } else {
            let _ = popup.remove_attribute("data-error");
        }
        let _ = body
            .class_list()
            .toggle_with_force(&config.lock_class, self.locked);
        if document.title() != self.title {
            document.set_title(&self.title);
        }
    }
}
