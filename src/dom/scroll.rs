use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use web_sys::{Element, Window};

/// Whether the blink class is on at this scroll offset.
pub fn blink_active(scroll_y: f64, step_px: f64) -> bool {
    (scroll_y / step_px).round() == 1.0
}

/// Toggles a cosmetic class from the window scroll position, at most once
/// per animation frame. Dropping it detaches the listener.
pub struct ScrollBlink {
    _listener: EventListener,
    _pending: Rc<RefCell<Option<AnimationFrame>>>,
}

impl ScrollBlink {
    pub fn attach(window: &Window, target: Element, class: String, step_px: f64) -> Self {
        let pending: Rc<RefCell<Option<AnimationFrame>>> = Rc::new(RefCell::new(None));
        let listener = {
            let pending = pending.clone();
            let win = window.clone();
            EventListener::new(window, "scroll", move |_| {
                if pending.borrow().is_some() {
                    return;
                }
                let window = win.clone();
                let target = target.clone();
                let class = class.clone();
                let slot = pending.clone();
                let frame = request_animation_frame(move |_| {
                    let y = window.scroll_y().unwrap_or(0.0);
                    let _ = target
                        .class_list()
                        .toggle_with_force(&class, blink_active(y, step_px));
                    slot.borrow_mut().take();
                });
                *pending.borrow_mut() = Some(frame);
            })
        };
        Self {
            _listener: listener,
            _pending: pending,
        }
    }
}
