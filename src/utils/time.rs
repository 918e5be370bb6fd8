use chrono::{DateTime, Utc};

/// Formats a review timestamp the way the browser's `toLocaleString` does, so
/// the rendered date follows the reader's locale and timezone.
#[cfg(target_arch = "wasm32")]
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    use wasm_bindgen::JsValue;

    let millis = timestamp.timestamp_millis() as f64;
    let date = js_sys::Date::new(&JsValue::from_f64(millis));
    date.to_locale_string("default", &JsValue::UNDEFINED).into()
}

/// Native fallback used by the server render and by tests.
#[cfg(not(target_arch = "wasm32"))]
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&chrono::Local)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}
