pub mod analytics;
pub mod content;
pub mod history;
pub mod stylesheet;
pub mod work;

pub use content::{ContentResolver, HttpFragmentSource};
pub use history::BrowserHistory;
pub use stylesheet::{DocumentStylesheets, StylesheetLoader};
pub use work::load_work;
