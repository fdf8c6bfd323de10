use std::time::Duration;

/// Formats a duration as "mm:ss". Minutes are not wrapped into hours.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}
