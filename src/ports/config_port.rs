//! Configuration access port trait.
//!
//! Typed getters return `None` when the key is absent and `Some(Err(raw))`
//! when it is present but does not parse, so callers can tell a missing
//! value from a mistyped one.

use chrono::NaiveTime;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_double(&self, section: &str, key: &str) -> Option<Result<f64, String>>;
    fn get_bool(&self, section: &str, key: &str) -> Option<Result<bool, String>>;

    /// Clock time as `HH:MM` or `HH:MM:SS`.
    fn get_time(&self, section: &str, key: &str) -> Option<Result<NaiveTime, String>> {
        let raw = self.get_string(section, key)?;
        let trimmed = raw.trim();
        Some(
            NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
                .map_err(|_| raw.clone()),
        )
    }
}
