//! Application configuration for the CFDI payroll explorer.
//!
//! User config lives at `~/.cfdi-nomina/cfdi-nomina.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NominaError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "cfdi-nomina.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".cfdi-nomina";

/// Longest worksheet name a workbook accepts.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters a worksheet name may not contain.
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

// ---------------------------------------------------------------------------
// Config structs (matching cfdi-nomina.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Export defaults.
    #[serde(default)]
    pub export: ExportConfig,

    /// Text table rendering.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Which file(s) an export produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Both,
}

impl ExportFormat {
    pub fn includes_csv(self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }

    pub fn includes_xlsx(self) -> bool {
        matches!(self, Self::Xlsx | Self::Both)
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = NominaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "both" => Ok(Self::Both),
            other => Err(NominaError::config(format!(
                "unknown export format '{other}': expected csv, xlsx or both"
            ))),
        }
    }
}

/// `[export]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory exports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Name of the single XLSX worksheet.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Default export format.
    #[serde(default = "default_format")]
    pub format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            sheet_name: default_sheet_name(),
            format: default_format(),
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_sheet_name() -> String {
    "Datos CFDI".into()
}
fn default_format() -> ExportFormat {
    ExportFormat::Both
}

/// `[display]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Maximum characters of the concept column in text tables.
    #[serde(default = "default_concept_width")]
    pub concept_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            concept_width: default_concept_width(),
        }
    }
}

fn default_concept_width() -> usize {
    32
}

// ---------------------------------------------------------------------------
// Export settings (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime export configuration, merged from config file and CLI flags.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Directory the files are written into.
    pub output_dir: PathBuf,
    /// Worksheet name for XLSX output.
    pub sheet_name: String,
    /// Which files to produce.
    pub format: ExportFormat,
}

impl From<&AppConfig> for ExportSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            output_dir: PathBuf::from(&config.export.output_dir),
            sheet_name: config.export.sheet_name.clone(),
            format: config.export.format,
        }
    }
}

/// Check that a worksheet name is acceptable to spreadsheet applications.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    let len = name.chars().count();
    if len == 0 || len > MAX_SHEET_NAME_LEN {
        return Err(NominaError::config(format!(
            "sheet name must be 1-{MAX_SHEET_NAME_LEN} characters, got {len}"
        )));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_CHARS.contains(c)) {
        return Err(NominaError::config(format!(
            "sheet name '{name}' contains forbidden character '{c}'"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.cfdi-nomina/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| NominaError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.cfdi-nomina/cfdi-nomina.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| NominaError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| NominaError::config(format!("failed to parse {}: {e}", path.display())))?;
    validate_sheet_name(&config.export.sheet_name)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| NominaError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| NominaError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| NominaError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("sheet_name"));
        assert!(toml_str.contains("Datos CFDI"));
        assert!(toml_str.contains("format = \"both\""));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.export.format, ExportFormat::Both);
        assert_eq!(parsed.display.concept_width, 32);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let toml_str = r#"
[export]
format = "xlsx"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.export.format, ExportFormat::Xlsx);
        assert_eq!(config.export.sheet_name, "Datos CFDI");
        assert_eq!(config.export.output_dir, ".");
    }

    #[test]
    fn export_settings_from_app_config() {
        let app = AppConfig::default();
        let settings = ExportSettings::from(&app);
        assert_eq!(settings.output_dir, PathBuf::from("."));
        assert!(settings.format.includes_csv());
        assert!(settings.format.includes_xlsx());
    }

    #[test]
    fn export_format_from_str() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(" xlsx ".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        let err = "pdf".parse::<ExportFormat>().unwrap_err();
        assert!(err.to_string().contains("unknown export format 'pdf'"));
    }

    #[test]
    fn sheet_name_validation() {
        assert!(validate_sheet_name("Datos CFDI").is_ok());
        assert!(validate_sheet_name("").is_err());
        assert!(validate_sheet_name("Nómina 2024/01").is_err());
        assert!(validate_sheet_name(&"x".repeat(32)).is_err());
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[export]\nsheet_name = \"Bad:Name\"\n").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("forbidden character"));

        std::fs::write(&path, "[display]\nconcept_width = 20\n").expect("write");
        let config = load_config_from(&path).expect("load");
        assert_eq!(config.display.concept_width, 20);
    }

    #[test]
    fn load_config_from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_config_from(&dir.path().join(CONFIG_FILE_NAME)).unwrap_err();
        assert!(matches!(err, NominaError::Io { .. }));
    }
}
