use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture, Shared};
use gloo::net::http::Request;
use web_sys::{DomParser, SupportedType};

use crate::error::PortfolioError;
use crate::model::{Fragment, WorkId};

/// Where work fragments come from. `Ok(None)` means the page exists but holds
/// no element for the identifier.
pub trait FragmentSource {
    fn fetch(&self, ident: &str) -> LocalBoxFuture<'static, Result<Option<Fragment>, PortfolioError>>;
}

pub type Resolution = Result<Rc<Fragment>, PortfolioError>;

type SharedFetch = Shared<LocalBoxFuture<'static, Resolution>>;

enum Slot {
    Ready(Rc<Fragment>),
    Pending(SharedFetch),
}

/// Memoizing front for a [`FragmentSource`].
///
/// Entries are keyed by `{project}-{work}` and never evicted. Callers asking
/// for a key that is still being fetched share the in-flight request. Failed
/// fetches are forgotten so the next request retries.
pub struct ContentResolver<S> {
    source: Rc<S>,
    cache: Rc<RefCell<HashMap<String, Slot>>>,
}

impl<S: FragmentSource + 'static> ContentResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Rc::new(source),
            cache: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn resolve(&self, id: &WorkId) -> LocalBoxFuture<'static, Resolution> {
        let key = id.ident();
        let shared = {
            let mut cache = self.cache.borrow_mut();
            match cache.get(&key) {
                Some(Slot::Ready(fragment)) => {
                    log::debug!("content: cache hit {}", key);
                    return future::ready(Ok(fragment.clone())).boxed_local();
                }
                Some(Slot::Pending(shared)) => {
                    log::debug!("content: joining in-flight fetch {}", key);
                    shared.clone()
                }
                None => {
                    log::debug!("content: fetching {}", key);
                    let shared = self
                        .source
                        .fetch(&key)
                        .map(|result| result.map(|found| Rc::new(found.unwrap_or_default())))
                        .boxed_local()
                        .shared();
                    cache.insert(key.clone(), Slot::Pending(shared.clone()));
                    shared
                }
            }
        };

        let cache = self.cache.clone();
        async move {
            let result = shared.clone().await;
            let mut cache = cache.borrow_mut();
            let still_ours = matches!(cache.get(&key), Some(Slot::Pending(p)) if p.ptr_eq(&shared));
            if still_ours {
                match &result {
                    Ok(fragment) => {
                        cache.insert(key, Slot::Ready(fragment.clone()));
                    }
                    Err(_) => {
                        cache.remove(&key);
                    }
                }
            }
            result
        }
        .boxed_local()
    }

    #[cfg(test)]
    pub fn cached(&self, id: &WorkId) -> Option<Rc<Fragment>> {
        match self.cache.borrow().get(&id.ident()) {
            Some(Slot::Ready(fragment)) => Some(fragment.clone()),
            _ => None,
        }
    }
}

/// Fetches `{base}{ident}.html` and lifts out the element whose id is `ident`.
pub struct HttpFragmentSource {
    base: String,
}

impl HttpFragmentSource {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl Default for HttpFragmentSource {
    fn default() -> Self {
        Self::new("./")
    }
}

impl FragmentSource for HttpFragmentSource {
    fn fetch(&self, ident: &str) -> LocalBoxFuture<'static, Result<Option<Fragment>, PortfolioError>> {
        let url = format!("{}{}.html", self.base, ident);
        fetch_page(url, ident.to_string()).boxed_local()
    }
}

async fn fetch_page(url: String, ident: String) -> Result<Option<Fragment>, PortfolioError> {
    let fetch_err = |message: String| PortfolioError::Fetch {
        ident: ident.clone(),
        message,
    };
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| fetch_err(e.to_string()))?;
    let markup = response.text().await.map_err(|e| fetch_err(e.to_string()))?;
    extract_fragment(&markup, &ident)
}

/// Parses a work page and returns its `#ident` element with the page title.
pub fn extract_fragment(markup: &str, ident: &str) -> Result<Option<Fragment>, PortfolioError> {
    let parser = DomParser::new()?;
    let doc = parser.parse_from_string(markup, SupportedType::TextHtml)?;
    let Some(el) = doc.get_element_by_id(ident) else {
        log::debug!("content: page for {} has no matching element", ident);
        return Ok(None);
    };
    let title = doc.title();
    Ok(Some(Fragment {
        title: (!title.trim().is_empty()).then_some(title),
        html: Some(el.outer_html()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    #[derive(Default)]
    struct FakeSource {
        calls: Rc<Cell<usize>>,
        failing: Rc<Cell<bool>>,
    }

    impl FragmentSource for FakeSource {
        fn fetch(&self, ident: &str) -> LocalBoxFuture<'static, Result<Option<Fragment>, PortfolioError>> {
            self.calls.set(self.calls.get() + 1);
            let result = if self.failing.get() {
                Err(PortfolioError::Fetch {
                    ident: ident.to_string(),
                    message: "offline".into(),
                })
            } else if ident == "acme-missing" {
                Ok(None)
            } else {
                Ok(Some(Fragment {
                    title: Some(format!("{ident} title")),
                    html: Some(format!("<article id=\"{ident}\"></article>")),
                }))
            };
            future::ready(result).boxed_local()
        }
    }

    fn resolver() -> (ContentResolver<FakeSource>, Rc<Cell<usize>>, Rc<Cell<bool>>) {
        let source = FakeSource::default();
        let calls = source.calls.clone();
        let failing = source.failing.clone();
        (ContentResolver::new(source), calls, failing)
    }

    #[test]
    fn repeated_resolution_returns_same_fragment() {
        let (resolver, calls, _) = resolver();
        let id = WorkId::new("acme", "logo");
        let first = block_on(resolver.resolve(&id)).unwrap();
        let second = block_on(resolver.resolve(&id)).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
        assert_eq!(first.title.as_deref(), Some("acme-logo title"));
    }

    #[test]
    fn concurrent_requests_share_one_fetch() {
        let (resolver, calls, _) = resolver();
        let id = WorkId::new("acme", "logo");
        let a = resolver.resolve(&id);
        let b = resolver.resolve(&id);
        let (a, b) = block_on(future::join(a, b));
        assert!(Rc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(calls.get(), 1);
        assert!(resolver.cached(&id).is_some());
    }

    #[test]
    fn missing_fragment_is_cached_as_empty() {
        let (resolver, calls, _) = resolver();
        let id = WorkId::new("acme", "missing");
        let fragment = block_on(resolver.resolve(&id)).unwrap();
        assert!(fragment.is_empty());
        assert_eq!(fragment.title, None);
        block_on(resolver.resolve(&id)).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let (resolver, calls, failing) = resolver();
        let id = WorkId::new("acme", "logo");
        failing.set(true);
        let err = block_on(resolver.resolve(&id)).unwrap_err();
        assert!(matches!(err, PortfolioError::Fetch { ref ident, .. } if ident == "acme-logo"));
        assert!(resolver.cached(&id).is_none());

        failing.set(false);
        assert!(block_on(resolver.resolve(&id)).is_ok());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn distinct_works_are_fetched_separately() {
        let (resolver, calls, _) = resolver();
        block_on(resolver.resolve(&WorkId::new("acme", "logo"))).unwrap();
        block_on(resolver.resolve(&WorkId::new("acme", "site"))).unwrap();
        assert_eq!(calls.get(), 2);
    }
}
