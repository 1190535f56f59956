use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{today_token, DATE_TOKEN_FORMAT};

/// `dd/mm/yyyy`, `dd-mm-yyyy` or `dd.mm.yyyy`. Separators are checked for
/// consistency after matching.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})([/.\-])(\d{1,2})([/.\-])(\d{4})\b").expect("valid regex")
});

/// Where the date part of a certificate file name comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DateSource {
    /// Same token for every certificate in the run.
    Fixed { token: String },
    /// First valid date printed on the page, else `fallback`.
    FromText { fallback: String },
}

impl Default for DateSource {
    fn default() -> Self {
        Self::Fixed {
            token: today_token(),
        }
    }
}

impl DateSource {
    /// A fixed token. Input that is itself a date is normalized to the
    /// file-name format, so `25/06/2024` becomes `25-06-2024`.
    pub fn fixed(token: &str) -> Self {
        Self::Fixed {
            token: normalize_token(token),
        }
    }

    pub fn from_text(fallback: &str) -> Self {
        Self::FromText {
            fallback: normalize_token(fallback),
        }
    }

    pub fn resolve(&self, page_text: &str) -> String {
        match self {
            Self::Fixed { token } => token.clone(),
            Self::FromText { fallback } => find_date_in_text(page_text)
                .map(format_date_token)
                .unwrap_or_else(|| fallback.clone()),
        }
    }
}

/// First calendar-valid day-month-year date in the text.
pub fn find_date_in_text(text: &str) -> Option<NaiveDate> {
    DATE_RE.captures_iter(text).find_map(|caps| {
        if caps[2] != caps[4] {
            return None;
        }
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[3].parse().ok()?;
        let year: i32 = caps[5].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

pub fn format_date_token(date: NaiveDate) -> String {
    date.format(DATE_TOKEN_FORMAT).to_string()
}

fn normalize_token(token: &str) -> String {
    let token = token.trim();
    match find_date_in_text(token) {
        Some(date) if DATE_RE.find(token).is_some_and(|m| m.as_str() == token) => {
            format_date_token(date)
        }
        _ => token.to_string(),
    }
}

/// Drop characters that are unsafe in a file or folder name and trim.
pub fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control())
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect::<String>()
        .trim()
        .trim_matches('.')
        .trim()
        .to_string()
}

/// `{client}_{name}_{date}_{seq}.pdf` with spaces replaced by underscores.
pub fn certificate_file_name(client: &str, name: &str, date: &str, sequence: u32) -> String {
    format!(
        "{}_{}_{}_{}.pdf",
        sanitize_component(client),
        sanitize_component(name),
        sanitize_component(date),
        sequence
    )
    .replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_replaces_spaces() {
        assert_eq!(
            certificate_file_name("Acme Lda", "Maria Silva", "25-06-2024", 1),
            "Acme_Lda_Maria_Silva_25-06-2024_1.pdf"
        );
    }

    #[test]
    fn file_name_strips_path_separators() {
        assert_eq!(
            certificate_file_name("A/B Corp", "..\\Rui", "01-01-2024", 3),
            "AB_Corp_Rui_01-01-2024_3.pdf"
        );
    }

    #[test]
    fn empty_client_keeps_leading_separator() {
        assert_eq!(
            certificate_file_name("", "Maria Silva", "25-06-2024", 2),
            "_Maria_Silva_25-06-2024_2.pdf"
        );
    }

    #[test]
    fn finds_first_valid_date() {
        let text = "Ref 99/99/2024. Realizado em 25/06/2024 e 01/07/2024";
        assert_eq!(
            find_date_in_text(text),
            NaiveDate::from_ymd_opt(2024, 6, 25)
        );
    }

    #[test]
    fn accepts_dash_and_dot_separators() {
        assert_eq!(find_date_in_text("em 3-7-2023"), NaiveDate::from_ymd_opt(2023, 7, 3));
        assert_eq!(find_date_in_text("em 03.07.2023"), NaiveDate::from_ymd_opt(2023, 7, 3));
    }

    #[test]
    fn mixed_separators_and_invalid_days_are_ignored() {
        assert_eq!(find_date_in_text("25/06-2024"), None);
        assert_eq!(find_date_in_text("31/02/2024"), None);
        assert_eq!(find_date_in_text("no date"), None);
    }

    #[test]
    fn fixed_source_ignores_text() {
        let source = DateSource::fixed("25-06-2024");
        assert_eq!(source.resolve("Data: 01/01/2020"), "25-06-2024");
    }

    #[test]
    fn fixed_token_in_other_format_is_normalized() {
        assert_eq!(DateSource::fixed("25/06/2024").resolve(""), "25-06-2024");
        assert_eq!(DateSource::fixed(" junho2024 ").resolve(""), "junho2024");
    }

    #[test]
    fn from_text_uses_page_date_or_fallback() {
        let source = DateSource::from_text("00-00-0000");
        assert_eq!(source.resolve("Lisboa, 5/6/2024"), "05-06-2024");
        assert_eq!(source.resolve("sem data"), "00-00-0000");
    }

    #[test]
    fn default_source_is_today() {
        assert_eq!(
            DateSource::default(),
            DateSource::Fixed {
                token: today_token()
            }
        );
    }

    #[test]
    fn date_source_serde_shape() {
        let json = serde_json::to_value(DateSource::from_text("01-01-2024")).unwrap();
        assert_eq!(json["mode"], "from_text");
        assert_eq!(json["fallback"], "01-01-2024");

        let parsed: DateSource =
            serde_json::from_str(r#"{"mode":"fixed","token":"25-06-2024"}"#).unwrap();
        assert_eq!(parsed, DateSource::fixed("25-06-2024"));
    }
}
