// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;
use time::macros::format_description;

/// Unix timestamp as "YYYY-MM-DD HH:MM" in UTC, or "N/A" when absent.
pub fn format_timestamp(timestamp: Option<i64>) -> String {
    let Some(timestamp) = timestamp else {
        return "N/A".to_owned();
    };
    let Ok(moment) = OffsetDateTime::from_unix_timestamp(timestamp) else {
        return "N/A".to_owned();
    };
    moment
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| "N/A".to_owned())
}

/// Remaining time until the loss deadline, relative to `now`.
pub fn format_time_left(losedate: Option<i64>, now: OffsetDateTime) -> String {
    let Some(losedate) = losedate else {
        return "N/A".to_owned();
    };
    let remaining = losedate - now.unix_timestamp();
    if remaining < 0 {
        return "EXPIRED".to_owned();
    }

    let days = remaining / 86_400;
    let hours = (remaining % 86_400) / 3_600;
    let minutes = (remaining % 3_600) / 60;
    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Fits text into a fixed-width table cell: pads short values with trailing
/// spaces, truncates long ones to `width - 3` characters plus "...". The
/// result is always exactly `width` characters.
pub fn fit_cell(text: &str, width: usize) -> String {
    let mut out = if text.chars().count() <= width {
        text.to_owned()
    } else {
        let mut kept: String = text.chars().take(width.saturating_sub(3)).collect();
        kept.push_str("...");
        kept
    };
    let padding = width.saturating_sub(out.chars().count());
    out.push_str(&" ".repeat(padding));
    out
}

pub fn format_value(value: Option<f64>) -> String {
    format!("{:.1}", value.unwrap_or(0.0))
}

pub fn format_money(value: Option<f64>) -> String {
    format!("${:.2}", value.unwrap_or(0.0))
}
