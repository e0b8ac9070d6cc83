use chrono::{DateTime, Utc};

/// UTC timestamp safe for file names, e.g. `2024-03-01_17-05-09z`.
pub fn timestamp_string(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d_%H-%M-%Sz").to_string()
}

/// File name for a screenshot taken `iteration` samples into a session that
/// started at `started`.
pub fn screenshot_file_name(prefix: &str, started: DateTime<Utc>, iteration: u32) -> String {
    format!("{prefix}.{}.{iteration}samp.png", timestamp_string(started))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 17, 5, 9).unwrap()
    }

    #[test]
    fn timestamp_is_zero_padded_utc() {
        assert_eq!(timestamp_string(at()), "2024-03-01_17-05-09z");
    }

    #[test]
    fn file_name_carries_prefix_time_and_samples() {
        assert_eq!(
            screenshot_file_name("cornell", at(), 512),
            "cornell.2024-03-01_17-05-09z.512samp.png"
        );
    }
}
