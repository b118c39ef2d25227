use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::attestation::{AttestationSettings, BinaryEncoding};
use crate::utils::logging::LoggingHelper;

/// Name of the settings file looked up in the working and config directories
pub const SETTINGS_FILE: &str = "Settings.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub attestation: AttestationSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read or parsed
    /// - Logger initialization fails
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_env_file();

        // Load base settings from TOML or defaults
        let (mut settings, source) = Self::load_base_settings()?;

        // Apply environment variable overrides
        let rejected = settings.apply_env_overrides();

        Self::initialize_logger(&settings.logging.level)?;
        if let Some(source) = source {
            LoggingHelper::log_settings_source(&source);
        }
        for (variable, value) in rejected {
            LoggingHelper::log_invalid_override(&variable, &value);
        }

        Ok(settings)
    }

    /// Initialize the `env_logger` backend with `level` as default filter
    ///
    /// # Errors
    ///
    /// Returns an error if a logger is already installed
    fn initialize_logger(level: &str) -> Result<(), Box<dyn std::error::Error>> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
            .try_init()?;
        Ok(())
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `PASSKEY_SYNTH_CONFIG_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read
    /// - TOML parsing fails
    fn load_base_settings() -> Result<(Self, Option<PathBuf>), Box<dyn std::error::Error>> {
        let mut settings = Self::default();
        let mut source = None;

        let default_config_path = PathBuf::from(SETTINGS_FILE);
        if default_config_path.exists() {
            settings = Self::load_from_path(&default_config_path)?;
            source = Some(default_config_path);
        }

        if let Ok(config_dir) = std::env::var("PASSKEY_SYNTH_CONFIG_DIR") {
            let config_path = Path::new(&config_dir).join(SETTINGS_FILE);
            if config_path.exists() {
                settings = Self::load_from_path(&config_path)?;
                source = Some(config_path);
            }
        }

        Ok((settings, source))
    }

    /// Parse a single settings file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// these settings
    pub fn load_from_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let toml_content = fs::read_to_string(path)?;
        Ok(basic_toml::from_str(&toml_content)?)
    }

    /// Apply environment variable overrides
    ///
    /// Returns the variables whose values could not be parsed; those leave
    /// the corresponding setting untouched.
    pub fn apply_env_overrides(&mut self) -> Vec<(String, String)> {
        let mut rejected = Vec::new();
        let attestation = &mut self.attestation;

        if let Ok(origin) = std::env::var("PASSKEY_SYNTH_ORIGIN") {
            attestation.origin = origin;
        }
        if let Ok(aaguid) = std::env::var("PASSKEY_SYNTH_AAGUID") {
            match Uuid::parse_str(aaguid.trim()) {
                Ok(parsed) => attestation.aaguid = parsed,
                Err(_) => rejected.push(("PASSKEY_SYNTH_AAGUID".to_string(), aaguid)),
            }
        }
        if let Ok(encoding) = std::env::var("PASSKEY_SYNTH_CLIENT_DATA_ENCODING") {
            match BinaryEncoding::from_name(&encoding) {
                Some(parsed) => attestation.client_data_encoding = parsed,
                None => rejected.push(("PASSKEY_SYNTH_CLIENT_DATA_ENCODING".to_string(), encoding)),
            }
        }
        if let Ok(cross_origin) = std::env::var("PASSKEY_SYNTH_CROSS_ORIGIN") {
            match cross_origin.trim().parse::<bool>() {
                Ok(parsed) => attestation.cross_origin = parsed,
                Err(_) => rejected.push(("PASSKEY_SYNTH_CROSS_ORIGIN".to_string(), cross_origin)),
            }
        }
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            self.logging.level = log_level;
        }

        rejected
    }

    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            Self::apply_env_file(&contents);
        }
    }

    /// Export `KEY=value` lines; blank lines and `#` comments are skipped
    fn apply_env_file(contents: &str) {
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                std::env::set_var(key.trim(), value.trim());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const OVERRIDE_VARS: [&str; 5] = [
        "PASSKEY_SYNTH_ORIGIN",
        "PASSKEY_SYNTH_AAGUID",
        "PASSKEY_SYNTH_CLIENT_DATA_ENCODING",
        "PASSKEY_SYNTH_CROSS_ORIGIN",
        "RUST_LOG",
    ];

    fn clear_overrides() {
        for var in OVERRIDE_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.attestation.origin, "https://localhost");
        assert!(settings.attestation.aaguid.is_nil());
        assert!(!settings.attestation.cross_origin);
        assert_eq!(
            settings.attestation.client_data_encoding,
            BinaryEncoding::Standard
        );
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[attestation]\norigin = \"https://example.com\"\nclient_data_encoding = \"url_safe_no_pad\"\naaguid = \"00112233-4455-6677-8899-aabbccddeeff\""
        )
        .unwrap();

        let settings = Settings::load_from_path(file.path()).unwrap();
        assert_eq!(settings.attestation.origin, "https://example.com");
        assert_eq!(
            settings.attestation.client_data_encoding,
            BinaryEncoding::UrlSafeNoPad
        );
        assert_eq!(
            settings.attestation.aaguid.to_string(),
            "00112233-4455-6677-8899-aabbccddeeff"
        );
        assert!(!settings.attestation.cross_origin);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[attestation]\ncross_origin = \"maybe\"").unwrap();
        assert!(Settings::load_from_path(file.path()).is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_overrides();
        std::env::set_var("PASSKEY_SYNTH_ORIGIN", "https://override.example");
        std::env::set_var("PASSKEY_SYNTH_CLIENT_DATA_ENCODING", "url_safe");
        std::env::set_var("PASSKEY_SYNTH_CROSS_ORIGIN", "true");
        std::env::set_var("RUST_LOG", "debug");

        let mut settings = Settings::default();
        let rejected = settings.apply_env_overrides();

        assert!(rejected.is_empty());
        assert_eq!(settings.attestation.origin, "https://override.example");
        assert_eq!(
            settings.attestation.client_data_encoding,
            BinaryEncoding::UrlSafe
        );
        assert!(settings.attestation.cross_origin);
        assert_eq!(settings.logging.level, "debug");

        clear_overrides();
    }

    #[test]
    #[serial]
    fn test_invalid_env_overrides_are_reported() {
        clear_overrides();
        std::env::set_var("PASSKEY_SYNTH_AAGUID", "not-a-uuid");
        std::env::set_var("PASSKEY_SYNTH_CROSS_ORIGIN", "sometimes");

        let mut settings = Settings::default();
        let rejected = settings.apply_env_overrides();

        let names: Vec<&str> = rejected.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            vec!["PASSKEY_SYNTH_AAGUID", "PASSKEY_SYNTH_CROSS_ORIGIN"]
        );
        assert!(settings.attestation.aaguid.is_nil());
        assert!(!settings.attestation.cross_origin);

        clear_overrides();
    }

    #[test]
    #[serial]
    fn test_env_file_skips_comments() {
        clear_overrides();
        std::env::remove_var("# PASSKEY_SYNTH_ORIGIN");

        Settings::apply_env_file(
            "# PASSKEY_SYNTH_ORIGIN=https://commented.example\n\nPASSKEY_SYNTH_CROSS_ORIGIN = true\n",
        );

        assert!(std::env::var("# PASSKEY_SYNTH_ORIGIN").is_err());
        assert!(std::env::var("PASSKEY_SYNTH_ORIGIN").is_err());
        assert_eq!(
            std::env::var("PASSKEY_SYNTH_CROSS_ORIGIN").as_deref(),
            Ok("true")
        );

        clear_overrides();
    }
}
