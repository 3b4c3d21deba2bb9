// Small helpers shared across modules

use wasm_bindgen::{JsCast, JsValue};

/// Converts a computed CSS color such as `rgb(18, 52, 86)`, `rgb(18 52 86)` or
/// `rgba(18, 52, 86, 0.5)` to `#123456`.
///
/// Hex input is passed through lowercased. Anything else (including `none`)
/// yields `None`.
pub fn rgb_to_hex(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix('#') {
        let valid = matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
        return valid.then(|| format!("#{}", hex.to_ascii_lowercase()));
    }
    let lower = raw.to_ascii_lowercase();
    let body = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))?;
    let body = body.split(')').next()?;
    // "rgb(1 2 3 / 50%)" carries alpha after a slash
    let body = body.split('/').next()?;
    let sep = if body.contains(',') { ',' } else { ' ' };
    let mut channels = body
        .split(sep)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().ok());
    let mut next = || -> Option<u8> {
        let value = channels.next()??;
        Some(value.round().clamp(0.0, 255.0) as u8)
    };
    let (r, g, b) = (next()?, next()?, next()?);
    Some(format!("#{:02x}{:02x}{:02x}", r, g, b))
}

/// Best-effort readable text for a thrown JS value.
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{:?}", value)
}
