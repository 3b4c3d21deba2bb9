pub mod app;

pub use app::{App, AppProps};
