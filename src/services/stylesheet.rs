use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlLinkElement};

use crate::error::PortfolioError;

pub type LoadResult = Result<(), PortfolioError>;

/// Something that can attach a stylesheet and report when it has loaded.
pub trait StylesheetHost {
    fn attach(&self, href: &str) -> LocalBoxFuture<'static, LoadResult>;
}

/// Attaches each href at most once; later callers wait on the first load.
///
/// A failed load is remembered too: the `<link>` is already in the document
/// and attaching a second one would not help.
pub struct StylesheetLoader<H> {
    host: H,
    loads: RefCell<HashMap<String, Shared<LocalBoxFuture<'static, LoadResult>>>>,
}

impl<H: StylesheetHost> StylesheetLoader<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            loads: RefCell::new(HashMap::new()),
        }
    }

    pub fn ensure(&self, href: &str) -> LocalBoxFuture<'static, LoadResult> {
        let mut loads = self.loads.borrow_mut();
        let load = loads
            .entry(href.to_string())
            .or_insert_with(|| {
                log::debug!("stylesheet: attaching {}", href);
                self.host.attach(href).shared()
            })
            .clone();
        load.boxed_local()
    }

    #[cfg(test)]
    pub fn requested(&self) -> usize {
        self.loads.borrow().len()
    }
}

/// Appends `<link rel="stylesheet">` elements to the document head.
pub struct DocumentStylesheets {
    document: Document,
}

impl DocumentStylesheets {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl StylesheetHost for DocumentStylesheets {
    fn attach(&self, href: &str) -> LocalBoxFuture<'static, LoadResult> {
        attach_link(self.document.clone(), href.to_string()).boxed_local()
    }
}

async fn attach_link(document: Document, href: String) -> LoadResult {
    let link: HtmlLinkElement = document
        .create_element("link")?
        .dyn_into()
        .map_err(|_| PortfolioError::Js("created element is not a <link>".into()))?;
    link.set_rel("stylesheet");
    link.set_href(&href);

    let (tx, rx) = oneshot::channel::<Result<(), String>>();
    let tx = Rc::new(RefCell::new(Some(tx)));
    let settle = move |outcome: Result<(), String>| {
        if let Some(tx) = tx.borrow_mut().take() {
            let _ = tx.send(outcome);
        }
    };
    let on_load = {
        let settle = settle.clone();
        EventListener::once(&link, "load", move |_| settle(Ok(())))
    };
    let on_error = EventListener::once(&link, "error", move |_| {
        settle(Err("the browser reported a load error".into()))
    });

    let head = document
        .head()
        .ok_or_else(|| PortfolioError::MissingElement("head".into()))?;
    head.append_child(&link)?;

    let outcome = rx.await;
    drop((on_load, on_error));
    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(message)) => Err(PortfolioError::Stylesheet { href, message }),
        Err(_) => Err(PortfolioError::Stylesheet {
            href,
            message: "load listener dropped".into(),
        }),
    }
}
