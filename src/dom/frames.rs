use std::cell::RefCell;
use std::rc::Rc;

use gloo::render::{request_animation_frame, AnimationFrame};

/// Pending two-frame continuation; dropping it cancels whichever frame has
/// not fired yet.
pub struct TwoFrames {
    _first: AnimationFrame,
    _second: Rc<RefCell<Option<AnimationFrame>>>,
}

/// Runs `f` on the second animation frame from now.
///
/// The frame in between is what lets the browser commit the current (snapped,
/// untransitioned) layout, so whatever `f` changes animates from there.
pub fn after_two_frames(f: impl FnOnce() + 'static) -> TwoFrames {
    let second = Rc::new(RefCell::new(None));
    let slot = second.clone();
    let first = request_animation_frame(move |_| {
        let handle = request_animation_frame(move |_| f());
        *slot.borrow_mut() = Some(handle);
    });
    TwoFrames {
        _first: first,
        _second: second,
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use futures::channel::oneshot;
    use std::cell::Cell;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    async fn next_frame() {
        let (tx, rx) = oneshot::channel();
        let _frame = request_animation_frame(move |_| {
            let _ = tx.send(());
        });
        let _ = rx.await;
    }

    /// Bumps `count` on each of the next `remaining` frames.
    fn count_frames(count: Rc<Cell<u32>>, keep: Rc<RefCell<Vec<AnimationFrame>>>, remaining: u32) {
        if remaining == 0 {
            return;
        }
        let held = keep.clone();
        let frame = request_animation_frame(move |_| {
            count.set(count.get() + 1);
            count_frames(count, held, remaining - 1);
        });
        keep.borrow_mut().push(frame);
    }

    #[wasm_bindgen_test]
    async fn runs_on_the_second_frame() {
        let count = Rc::new(Cell::new(0));
        let keep = Rc::new(RefCell::new(Vec::new()));
        // registered first, so each frame's count is bumped before `f` looks
        count_frames(count.clone(), keep.clone(), 3);

        let (tx, rx) = oneshot::channel();
        let seen = count.clone();
        let _pending = after_two_frames(move || {
            let _ = tx.send(seen.get());
        });
        assert_eq!(rx.await.unwrap(), 2);
    }

    #[wasm_bindgen_test]
    async fn dropping_before_first_frame_cancels() {
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        drop(after_two_frames(move || flag.set(true)));
        for _ in 0..3 {
            next_frame().await;
        }
        assert!(!fired.get());
    }

    #[wasm_bindgen_test]
    async fn dropping_between_frames_cancels_the_second() {
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let pending = after_two_frames(move || flag.set(true));
        next_frame().await;
        assert!(pending._second.borrow().is_some());
        drop(pending);
        for _ in 0..3 {
            next_frame().await;
        }
        assert!(!fired.get());
    }
}
