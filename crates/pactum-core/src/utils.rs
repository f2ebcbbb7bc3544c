//! Small shared helpers: where Pactum keeps its files, the date shown to the
//! controller, and log-friendly previews of long text.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};

/// Directory holding `config.json`: `$HOME/.pactum`, or `./.pactum` when no
/// home directory is known.
pub fn pactum_home() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pactum")
}

/// Local calendar date, rendered `YYYY-MM-DD` for prompts.
pub fn today_iso() -> String {
    iso_date(Local::now().date_naive())
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// At most `limit` characters of `text`; cut text ends in `...` (counted in
/// `limit`).
pub fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some(_) => {
            let keep = limit.saturating_sub(3);
            let cut = text.char_indices().nth(keep).map_or(text.len(), |(i, _)| i);
            format!("{}...", &text[..cut])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_keeps_short_text() {
        assert_eq!(preview("Contract #101", 80), "Contract #101");
        assert_eq!(preview("exactly", 7), "exactly");
    }

    #[test]
    fn test_preview_cuts_on_char_boundary() {
        assert_eq!(preview("Send the signed contract to Globex", 12), "Send the ...");
        assert_eq!(preview("Vertragsänderung", 8), "Vertr...");
        assert_eq!(preview("契約書を送ってください", 5), "契約...");
    }

    #[test]
    fn test_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(iso_date(date), "2025-01-01");
        assert!(NaiveDate::parse_from_str(&today_iso(), "%Y-%m-%d").is_ok());
    }

    #[test]
    fn test_home_dir_name() {
        assert_eq!(pactum_home().file_name().unwrap(), ".pactum");
    }
}
