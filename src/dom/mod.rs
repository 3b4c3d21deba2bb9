pub mod frames;
pub mod matcher;
pub mod router;
pub mod scroll;

pub use frames::after_two_frames;
pub use matcher::match_element;
pub use router::{EventRouter, Subscription};
pub use scroll::ScrollBlink;
