//! Utility functions for rendering UI components

pub fn format_duration(ms: u32) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(30_000), "0:30");
        assert_eq!(format_duration(326_500), "5:26");
    }

    #[test]
    fn truncates_long_text() {
        assert_eq!(truncate_string("Lose Yourself", 20), "Lose Yourself");
        assert_eq!(truncate_string("Lose Yourself", 8), "Lose ...");
    }
}
