use futures::future::{FutureExt, LocalBoxFuture};

use super::content::{ContentResolver, FragmentSource, Resolution};
use super::stylesheet::{StylesheetHost, StylesheetLoader};
use crate::model::WorkId;

/// Resolves a work's fragment and, when `stylesheets` is given, its
/// stylesheet. Completes once both have finished; a stylesheet failure is
/// logged and never turns into a content failure.
pub fn load_work<S, H>(
    resolver: &ContentResolver<S>,
    stylesheets: Option<&StylesheetLoader<H>>,
    work: &WorkId,
) -> LocalBoxFuture<'static, Resolution>
where
    S: FragmentSource + 'static,
    H: StylesheetHost,
{
    let content = resolver.resolve(work);
    let styles = stylesheets.map(|loader| loader.ensure(&work.stylesheet_href()));
    async move {
        let styles = async {
            if let Some(load) = styles {
                if let Err(err) = load.await {
                    log::warn!("{}", err);
                }
            }
        };
        let (content, ()) = futures::join!(content, styles);
        content
    }
    .boxed_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PortfolioError;
    use crate::model::Fragment;
    use crate::services::stylesheet::LoadResult;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use futures::future;
    use std::cell::RefCell;

    struct StaticSource;

    impl FragmentSource for StaticSource {
        fn fetch(&self, ident: &str) -> LocalBoxFuture<'static, Result<Option<Fragment>, PortfolioError>> {
            future::ready(Ok(Some(Fragment {
                title: Some(format!("{ident} title")),
                html: Some(format!("<main id=\"{ident}\"></main>")),
            })))
            .boxed_local()
        }
    }

    /// Loads stay pending until the test settles them.
    #[derive(Default)]
    struct GatedHost {
        gates: RefCell<Vec<(String, oneshot::Sender<LoadResult>)>>,
    }

    impl GatedHost {
        fn settle(&self, outcome: LoadResult) {
            for (_, tx) in self.gates.borrow_mut().drain(..) {
                let _ = tx.send(outcome.clone());
            }
        }
    }

    impl StylesheetHost for &GatedHost {
        fn attach(&self, href: &str) -> LocalBoxFuture<'static, LoadResult> {
            let (tx, rx) = oneshot::channel();
            self.gates.borrow_mut().push((href.to_string(), tx));
            rx.map(|r| r.unwrap_or_else(|_| Err(PortfolioError::Js("gate dropped".into()))))
                .boxed_local()
        }
    }

    #[test]
    fn content_waits_for_stylesheet() {
        let host = GatedHost::default();
        let loader = StylesheetLoader::new(&host);
        let resolver = ContentResolver::new(StaticSource);
        let work = WorkId::new("acme", "logo");

        let mut pending = load_work(&resolver, Some(&loader), &work);
        assert!((&mut pending).now_or_never().is_none());
        assert_eq!(host.gates.borrow()[0].0, "./acme/logo/styles.css");

        host.settle(Ok(()));
        let fragment = block_on(pending).unwrap();
        assert_eq!(fragment.title.as_deref(), Some("acme-logo title"));
    }

    #[test]
    fn failed_stylesheet_still_yields_content() {
        let host = GatedHost::default();
        let loader = StylesheetLoader::new(&host);
        let resolver = ContentResolver::new(StaticSource);
        let pending = load_work(&resolver, Some(&loader), &WorkId::new("acme", "logo"));

        host.settle(Err(PortfolioError::Stylesheet {
            href: "./acme/logo/styles.css".into(),
            message: "404".into(),
        }));
        let fragment = block_on(pending).unwrap();
        assert!(fragment.html.is_some());
    }

    #[test]
    fn no_stylesheet_when_disabled() {
        let host = GatedHost::default();
        let resolver = ContentResolver::new(StaticSource);
        let fragment = block_on(load_work::<_, &GatedHost>(
            &resolver,
            None,
            &WorkId::new("acme", "logo"),
        ))
        .unwrap();
        assert!(host.gates.borrow().is_empty());
        assert_eq!(fragment.title.as_deref(), Some("acme-logo title"));
    }
}
