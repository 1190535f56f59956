/// Application-level constants
pub const APP_NAME: &str = "certsplit";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Date format used for the date token in certificate file names.
pub const DATE_TOKEN_FORMAT: &str = "%d-%m-%Y";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "certsplit=info"
}

/// Date token for today, in the file-name format.
pub fn today_token() -> String {
    chrono::Local::now().format(DATE_TOKEN_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_certsplit() {
        assert_eq!(APP_NAME, "certsplit");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn log_filter_targets_crate() {
        assert!(default_log_filter().starts_with(APP_NAME));
    }

    #[test]
    fn today_token_is_day_month_year() {
        let token = today_token();
        assert_eq!(token.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&token, DATE_TOKEN_FORMAT).is_ok());
    }
}
