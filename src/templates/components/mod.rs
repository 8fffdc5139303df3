use chrono::DateTime;
use maud::{html, Markup};

/// Millis-since-epoch to "YYYY-MM-DD HH:MM" (UTC).
pub fn fmt_fecha(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".into(),
    }
}

/// Date only.
pub fn fmt_fecha_corta(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => "-".into(),
    }
}

/// Small colored status chip; the class carries the wire string so the CSS
/// can style per estado.
pub fn estado_badge(estado: &str) -> Markup {
    html! {
        span class={ "badge badge-" (estado) } { (estado) }
    }
}
