use js_sys::{Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Window;

/// Fire-and-forget page view reporting.
pub trait Analytics {
    fn page_view(&self, title: &str, path: &str);
}

pub struct NoopAnalytics;

impl Analytics for NoopAnalytics {
    fn page_view(&self, _title: &str, _path: &str) {}
}

/// Reports through the page's global `gtag` function.
pub struct GtagAnalytics {
    gtag: Function,
}

impl GtagAnalytics {
    /// `None` when the page did not load gtag.
    pub fn detect(window: &Window) -> Option<Self> {
        let value = Reflect::get(window, &JsValue::from_str("gtag")).ok()?;
        let gtag = value.dyn_into::<Function>().ok()?;
        Some(Self { gtag })
    }
}

impl Analytics for GtagAnalytics {
    fn page_view(&self, title: &str, path: &str) {
        let params = Object::new();
        let _ = Reflect::set(&params, &"page_title".into(), &title.into());
        let _ = Reflect::set(&params, &"page_path".into(), &path.into());
        if let Err(err) = self
            .gtag
            .call3(&JsValue::NULL, &"event".into(), &"page_view".into(), &params)
        {
            log::warn!("analytics: gtag call failed: {:?}", err);
        }
    }
}

/// Picks the reporter for this page.
pub fn detect(window: &Window, enabled: bool) -> Box<dyn Analytics> {
    match GtagAnalytics::detect(window).filter(|_| enabled) {
        Some(gtag) => {
            log::debug!("analytics: reporting through gtag");
            Box::new(gtag)
        }
        None => Box::new(NoopAnalytics),
    }
}
