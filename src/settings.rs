//! Server parameter tracking.
//!
//! Every `ParameterStatus` message the backend sends (`client_encoding`,
//! `DateStyle`, `server_version`, `TimeZone`, ...) is folded into a
//! [`SettingsRegistry`] as it arrives. Codecs consult it — today only for the
//! text encoding — rather than the engine re-deriving it per call.

use std::collections::HashMap;

/// Text encoding in effect for the connection, derived from `client_encoding`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoding {
    /// `UTF8` / `UNICODE` — the only encoding codecs decode with `str::from_utf8`.
    Utf8,
    /// Any other `client_encoding` value; text codecs still receive raw bytes,
    /// but callers decoding to `String` should expect lossy or failed decodes.
    Other(String),
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Utf8
    }
}

/// Tracks server runtime parameters reported via `ParameterStatus`.
#[derive(Debug, Default, Clone)]
pub struct SettingsRegistry {
    params: HashMap<String, String>,
}

impl SettingsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a `ParameterStatus(name, value)` update.
    pub fn apply(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// Look up a server parameter by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The server's reported `server_version`, if any.
    pub fn server_version(&self) -> Option<&str> {
        self.get("server_version")
    }

    /// The text encoding in effect, derived from `client_encoding`.
    pub fn encoding(&self) -> Encoding {
        match self.get("client_encoding") {
            None => Encoding::Utf8,
            Some(v) if v.eq_ignore_ascii_case("UTF8") || v.eq_ignore_ascii_case("UNICODE") => {
                Encoding::Utf8
            }
            Some(other) => Encoding::Other(other.to_string()),
        }
    }

    /// Iterate over all known (name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_utf8() {
        let settings = SettingsRegistry::new();
        assert_eq!(settings.encoding(), Encoding::Utf8);
    }

    #[test]
    fn tracks_client_encoding() {
        let mut settings = SettingsRegistry::new();
        settings.apply("client_encoding", "LATIN1");
        assert_eq!(settings.encoding(), Encoding::Other("LATIN1".into()));
        settings.apply("client_encoding", "UTF8");
        assert_eq!(settings.encoding(), Encoding::Utf8);
    }

    #[test]
    fn server_version_lookup() {
        let mut settings = SettingsRegistry::new();
        settings.apply("server_version", "16.2");
        assert_eq!(settings.server_version(), Some("16.2"));
    }
}
