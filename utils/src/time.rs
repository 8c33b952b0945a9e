//! Time formatting helpers.

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Describe how far `target` is from `now`, both in seconds.
pub fn format_countdown(target: u64, now: u64) -> String {
    if target > now {
        format!("in {}", format_duration(target - now))
    } else if target == now {
        "now".to_string()
    } else {
        format!("{} ago", format_duration(now - target))
    }
}
