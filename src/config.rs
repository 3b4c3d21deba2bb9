use serde::Deserialize;
use web_sys::Document;

use crate::error::PortfolioError;

/// Id of the optional inline JSON block overriding the defaults below.
pub const CONFIG_ELEMENT_ID: &str = "portfolio-config";

/// Page contract and tunables. Every field has a default matching the stock
/// portfolio markup, so an absent config block is the normal case.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PortfolioConfig {
    pub popup_id: String,
    pub work_link_selector: String,
    pub project_link_selector: String,
    pub work_selector: String,
    pub project_selector: String,
    /// Looked up inside the clicked work link to sample the popup tint.
    pub fill_selector: String,
    pub lock_class: String,
    pub opened_class: String,
    pub animated_class: String,
    pub project_opened_class: String,
    /// Element toggled by scroll position; `null` disables the effect.
    pub blink_id: Option<String>,
    pub blink_class: String,
    pub blink_step_px: f64,
    /// Upper bound on the open transition when `transitionend` never fires.
    pub transition_ms: u32,
    pub stylesheets: bool,
    pub analytics: bool,
    /// Path restored on close. Defaults to the page path at load.
    pub home_path: Option<String>,
    pub log_level: String,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            popup_id: "popup".into(),
            work_link_selector: "[data-work] > a".into(),
            project_link_selector: "[data-project] > a".into(),
            work_selector: "[data-work]".into(),
            project_selector: "[data-project]".into(),
            fill_selector: ".frame .fill".into(),
            lock_class: "lock".into(),
            opened_class: "opened".into(),
            animated_class: "animated".into(),
            project_opened_class: "opened".into(),
            blink_id: Some("girl-blink".into()),
            blink_class: "blink".into(),
            blink_step_px: 150.0,
            transition_ms: 600,
            stylesheets: true,
            analytics: true,
            home_path: None,
            log_level: "info".into(),
        }
    }
}

impl PortfolioConfig {
    pub fn from_json(raw: &str) -> Result<Self, PortfolioError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::default());
        }
        let config: PortfolioConfig = serde_json::from_str(raw)?;
        if !(config.blink_step_px.is_finite() && config.blink_step_px > 0.0) {
            return Err(PortfolioError::Config(format!(
                "blinkStepPx must be positive, got {}",
                config.blink_step_px
            )));
        }
        Ok(config)
    }

    /// Reads the inline config block. Returns the defaults together with the
    /// parse error when the block is malformed, so the caller can report it
    /// once logging is up.
    pub fn load(document: &Document) -> (Self, Option<PortfolioError>) {
        let raw = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content());
        match raw {
            None => (Self::default(), None),
            Some(raw) => match Self::from_json(&raw) {
                Ok(config) => (config, None),
                Err(err) => (Self::default(), Some(err)),
            },
        }
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_block_means_defaults() {
        assert_eq!(PortfolioConfig::from_json("  ").unwrap(), PortfolioConfig::default());
        assert_eq!(PortfolioConfig::from_json("{}").unwrap(), PortfolioConfig::default());
    }

    #[test]
    fn overrides_are_camel_case() {
        let config = PortfolioConfig::from_json(
            r#"{"popupId": "overlay", "blinkId": null, "transitionMs": 250, "logLevel": "debug"}"#,
        )
        .unwrap();
        assert_eq!(config.popup_id, "overlay");
        assert_eq!(config.blink_id, None);
        assert_eq!(config.transition_ms, 250);
        assert_eq!(config.log_level(), log::Level::Debug);
        assert_eq!(config.work_link_selector, "[data-work] > a");
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = PortfolioConfig::from_json("{popupId:").unwrap_err();
        assert!(matches!(err, PortfolioError::Config(_)));
    }

    #[test]
    fn non_positive_blink_step_is_rejected() {
        assert!(PortfolioConfig::from_json(r#"{"blinkStepPx": 0}"#).is_err());
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let config = PortfolioConfig {
            log_level: "chatty".into(),
            ..Default::default()
        };
        assert_eq!(config.log_level(), log::Level::Info);
    }
}
