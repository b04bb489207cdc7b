use std::time::Duration;

/// Shortens `text` to at most `max_chars` characters, marking the cut with an
/// ellipsis.
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    if max_chars == 0 {
        return String::new();
    }

    let mut label: String = text.chars().take(max_chars - 1).collect();
    label.push('…');
    label
}

pub fn format_age(age: Duration) -> String {
    let seconds = age.as_secs();
    if seconds < 60 {
        format!("{seconds}s ago")
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else {
        format!("{}h {}m ago", seconds / 3600, (seconds % 3600) / 60)
    }
}
