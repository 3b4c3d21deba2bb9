pub mod popup;
pub mod surface;

pub use popup::{OpenRequest, PopupAction, PopupPhase, PopupState};
pub use surface::Surface;
