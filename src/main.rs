use web_sys::Element;

mod components;
mod config;
mod dom;
mod error;
mod model;
mod services;
mod session;
mod state;
mod util;

use components::{App, AppProps};
use config::PortfolioConfig;
use error::PortfolioError;
use session::Session;

fn boot() -> Result<(), PortfolioError> {
    let window = web_sys::window().ok_or_else(|| PortfolioError::MissingElement("window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| PortfolioError::MissingElement("document".into()))?;

    let (config, config_err) = PortfolioConfig::load(&document);
    log::set_max_level(config.log_level().to_level_filter());
    if let Some(err) = config_err {
        log::warn!("ignoring #{}: {}", config::CONFIG_ELEMENT_ID, err);
    }

    let session = Session::from_document(window, document, config)?;
    let root: Element = session.popup.clone().into();
    // the shell owns the popup's children from here on
    root.set_inner_html("");
    log::info!("portfolio popup ready (home {})", session.defaults.path);
    yew::Renderer::<App>::with_root_and_props(root, AppProps { session }).render();
    Ok(())
}

fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Trace);
    if let Err(err) = boot() {
        log::error!("portfolio popup disabled: {}", err);
    }
}
