//! INI file configuration adapter.

use crate::domain::error::StraddleError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StraddleError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| StraddleError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// An adapter with no sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_double(&self, section: &str, key: &str) -> Option<Result<f64, String>> {
        let raw = self.config.get(section, key)?;
        Some(raw.trim().parse::<f64>().map_err(|_| raw))
    }

    fn get_bool(&self, section: &str, key: &str) -> Option<Result<bool, String>> {
        let raw = self.config.get(section, key)?;
        Some(Self::parse_bool(&raw).ok_or(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[backtest]
initial_capital = 400000
lot_size = 25
slippage = 0.001

[strategy]
entry_time = 09:16
session_close = 15:15:00
end_of_data = close_at_last_bar

[data]
path = data/final.csv

[report]
output_dir = out
charts = no
"#;

    #[test]
    fn reads_all_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_double("backtest", "initial_capital"), Some(Ok(400000.0)));
        assert_eq!(adapter.get_double("backtest", "lot_size"), Some(Ok(25.0)));
        assert_eq!(adapter.get_double("backtest", "slippage"), Some(Ok(0.001)));
        assert_eq!(
            adapter.get_string("data", "path"),
            Some("data/final.csv".to_string())
        );
        assert_eq!(adapter.get_string("report", "output_dir"), Some("out".to_string()));
        assert_eq!(adapter.get_bool("report", "charts"), Some(Ok(false)));
    }

    #[test]
    fn missing_keys_are_none() {
        let adapter = FileConfigAdapter::from_string("[backtest]\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_double("backtest", "lot_size"), None);
        assert_eq!(adapter.get_bool("report", "charts"), None);
    }

    #[test]
    fn non_numeric_values_report_raw_text() {
        let adapter = FileConfigAdapter::from_string(
            "[backtest]\nlot_size = many\ninitial_capital = 5,00,000\n[strategy]\nstop_offset = 50pts\n",
        )
        .unwrap();
        assert_eq!(adapter.get_double("backtest", "lot_size"), Some(Err("many".to_string())));
        assert_eq!(
            adapter.get_double("backtest", "initial_capital"),
            Some(Err("5,00,000".to_string()))
        );
        assert_eq!(adapter.get_double("strategy", "stop_offset"), Some(Err("50pts".to_string())));
    }

    #[test]
    fn bool_spellings() {
        let adapter =
            FileConfigAdapter::from_string("[report]\na = yes\nb = On\nc = 0\nd = maybe\n").unwrap();
        assert_eq!(adapter.get_bool("report", "a"), Some(Ok(true)));
        assert_eq!(adapter.get_bool("report", "b"), Some(Ok(true)));
        assert_eq!(adapter.get_bool("report", "c"), Some(Ok(false)));
        assert_eq!(adapter.get_bool("report", "d"), Some(Err("maybe".to_string())));
    }

    #[test]
    fn times_parse_with_or_without_seconds() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_time("strategy", "entry_time"),
            Some(Ok(NaiveTime::from_hms_opt(9, 16, 0).unwrap()))
        );
        assert_eq!(
            adapter.get_time("strategy", "session_close"),
            Some(Ok(NaiveTime::from_hms_opt(15, 15, 0).unwrap()))
        );
        assert_eq!(adapter.get_time("strategy", "missing"), None);
    }

    #[test]
    fn bad_time_reports_raw_value() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nentry_time = noon\n").unwrap();
        assert_eq!(
            adapter.get_time("strategy", "entry_time"),
            Some(Err("noon".to_string()))
        );
    }

    #[test]
    fn empty_adapter_has_nothing() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("data", "path"), None);
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("strategy", "end_of_data"),
            Some("close_at_last_bar".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_parse_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/straddle.ini");
        assert!(matches!(result, Err(StraddleError::ConfigParse { .. })));
    }
}
