use wasm_bindgen::JsCast;
use web_sys::{Element, Node};

/// A node that can be tested against a CSS selector and walked upwards.
pub trait AncestorNode: Clone {
    /// `None` when the node cannot be matched at all (text, comments).
    fn matches_selector(&self, selector: &str) -> Option<bool>;
    /// Parent element, `None` once the document root is reached.
    fn parent(&self) -> Option<Self>;
}

/// Nearest node at or above `node` satisfying `selector`.
///
/// Non-element nodes are skipped, never returned.
pub fn match_ancestor<N: AncestorNode>(node: &N, selector: &str) -> Option<N> {
    let mut current = node.clone();
    loop {
        if current.matches_selector(selector) == Some(true) {
            return Some(current);
        }
        current = current.parent()?;
    }
}

impl AncestorNode for Node {
    fn matches_selector(&self, selector: &str) -> Option<bool> {
        // an invalid selector throws; treat it as a miss
        self.dyn_ref::<Element>()
            .map(|el| el.matches(selector).unwrap_or(false))
    }

    fn parent(&self) -> Option<Self> {
        self.parent_element().map(Node::from)
    }
}

pub fn match_element(node: &Node, selector: &str) -> Option<Element> {
    match_ancestor(node, selector).and_then(|n| n.dyn_into::<Element>().ok())
}



#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn fixture() -> Element {
        let document = web_sys::window().unwrap().document().unwrap();
        let root = document.create_element("div").unwrap();
        root.set_inner_html(
            r#"<ul data-project="acme"><li data-work="logo"><a href="./acme-logo.html"><span>Logo</span></a></li></ul>"#,
        );
        document.body().unwrap().append_child(&root).unwrap();
        root
    }

    #[wasm_bindgen_test]
    fn text_target_resolves_to_link() {
        let root = fixture();
        let span = root.query_selector("span").unwrap().unwrap();
        let text = span.first_child().unwrap();
        let link = match_element(&text, "[data-work] > a").unwrap();
        assert_eq!(link.tag_name(), "A");
        root.remove();
    }

    #[wasm_bindgen_test]
    fn invalid_selector_never_throws() {
        let root = fixture();
        let span: Node = root.query_selector("span").unwrap().unwrap().into();
        assert!(match_element(&span, "[[").is_none());
        root.remove();
    }
}
