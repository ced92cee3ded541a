use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use leadbook_core::domain::{DuplicatePolicy, FollowUpStatus, LeadSource, LeadStage};
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "leadbook";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_MAX_FILE_MB: u64 = 10;
pub const MAX_FILE_MB_LIMIT: u64 = 100;
pub const DEFAULT_SAMPLE_ROWS: usize = 5;
pub const MAX_SAMPLE_ROWS: usize = 50;
pub const DEFAULT_MAX_INVALID_RATIO: f64 = 0.5;
pub const DEFAULT_TIMELINE_LIMIT: usize = 50;
pub const MAX_TIMELINE_LIMIT: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub import: ImportConfig,
    pub timeline: TimelineConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    pub max_file_bytes: u64,
    pub sample_rows: usize,
    pub max_invalid_ratio: f64,
    pub duplicate_policy: DuplicatePolicy,
    pub default_source: LeadSource,
    pub default_stage: LeadStage,
    pub default_follow_up: FollowUpStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineConfig {
    pub limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            import: ImportConfig {
                max_file_bytes: DEFAULT_MAX_FILE_MB * 1024 * 1024,
                sample_rows: DEFAULT_SAMPLE_ROWS,
                max_invalid_ratio: DEFAULT_MAX_INVALID_RATIO,
                duplicate_policy: DuplicatePolicy::Skip,
                default_source: LeadSource::Import,
                default_stage: LeadStage::New,
                default_follow_up: FollowUpStatus::Pending,
            },
            timeline: TimelineConfig {
                limit: DEFAULT_TIMELINE_LIMIT,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid import.max_file_mb value: {0}")]
    InvalidMaxFileMb(u64),
    #[error("invalid import.sample_rows value: {0}")]
    InvalidSampleRows(usize),
    #[error("invalid import.max_invalid_ratio value: {0}")]
    InvalidInvalidRatio(f64),
    #[error("invalid import.{field} value: {value}")]
    InvalidImportDefault { field: &'static str, value: String },
    #[error("invalid timeline.limit value: {0}")]
    InvalidTimelineLimit(usize),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    import: Option<ImportFile>,
    timeline: Option<TimelineFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ImportFile {
    max_file_mb: Option<u64>,
    sample_rows: Option<usize>,
    max_invalid_ratio: Option<f64>,
    duplicate_policy: Option<DuplicatePolicy>,
    default_source: Option<String>,
    default_stage: Option<String>,
    default_follow_up: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TimelineFile {
    limit: Option<usize>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(import) = parsed.import {
        merge_import(&mut config.import, import)?;
    }

    if let Some(timeline) = parsed.timeline {
        if let Some(limit) = timeline.limit {
            if limit == 0 || limit > MAX_TIMELINE_LIMIT {
                return Err(ConfigError::InvalidTimelineLimit(limit));
            }
            config.timeline.limit = limit;
        }
    }

    Ok(config)
}

fn merge_import(config: &mut ImportConfig, import: ImportFile) -> Result<()> {
    if let Some(mb) = import.max_file_mb {
        if mb == 0 || mb > MAX_FILE_MB_LIMIT {
            return Err(ConfigError::InvalidMaxFileMb(mb));
        }
        config.max_file_bytes = mb * 1024 * 1024;
    }

    if let Some(rows) = import.sample_rows {
        if rows == 0 || rows > MAX_SAMPLE_ROWS {
            return Err(ConfigError::InvalidSampleRows(rows));
        }
        config.sample_rows = rows;
    }

    if let Some(ratio) = import.max_invalid_ratio {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::InvalidInvalidRatio(ratio));
        }
        config.max_invalid_ratio = ratio;
    }

    if let Some(policy) = import.duplicate_policy {
        config.duplicate_policy = policy;
    }

    if let Some(raw) = import.default_source {
        config.default_source = parse_default("default_source", &raw)?;
    }
    if let Some(raw) = import.default_stage {
        config.default_stage = parse_default("default_stage", &raw)?;
    }
    if let Some(raw) = import.default_follow_up {
        config.default_follow_up = parse_default("default_follow_up", &raw)?;
    }

    Ok(())
}

fn parse_default<T: FromStr>(field: &'static str, raw: &str) -> Result<T> {
    raw.parse().map_err(|_| ConfigError::InvalidImportDefault {
        field,
        value: raw.to_string(),
    })
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_at_path, merge_config, ConfigError, ConfigFile, ImportFile, TimelineFile};
    use leadbook_core::domain::{DuplicatePolicy, LeadSource, LeadStage};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    #[test]
    fn merge_config_applies_values() {
        let parsed = ConfigFile {
            import: Some(ImportFile {
                max_file_mb: Some(2),
                sample_rows: Some(10),
                max_invalid_ratio: Some(0.25),
                duplicate_policy: Some(DuplicatePolicy::Update),
                default_source: Some("referral".to_string()),
                default_stage: Some("contacted".to_string()),
                default_follow_up: None,
            }),
            timeline: Some(TimelineFile { limit: Some(20) }),
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.import.max_file_bytes, 2 * 1024 * 1024);
        assert_eq!(merged.import.sample_rows, 10);
        assert_eq!(merged.import.max_invalid_ratio, 0.25);
        assert_eq!(merged.import.duplicate_policy, DuplicatePolicy::Update);
        assert_eq!(merged.import.default_source, LeadSource::Referral);
        assert_eq!(merged.import.default_stage, LeadStage::Contacted);
        assert_eq!(merged.timeline.limit, 20);
    }

    #[test]
    fn merge_config_rejects_out_of_range_values() {
        let ratio = ConfigFile {
            import: Some(ImportFile {
                max_invalid_ratio: Some(1.5),
                ..Default::default()
            }),
            timeline: None,
        };
        assert!(matches!(
            merge_config(ratio),
            Err(ConfigError::InvalidInvalidRatio(_))
        ));

        let stage = ConfigFile {
            import: Some(ImportFile {
                default_stage: Some("someday".to_string()),
                ..Default::default()
            }),
            timeline: None,
        };
        let err = merge_config(stage).unwrap_err();
        assert!(err.to_string().contains("default_stage"));
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
        assert!(load_at_path(&missing, false).expect("optional").is_none());
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[import]\nsample_rows = 3\nduplicate_policy = \"update\"\n[timeline]\nlimit = 10\n",
        )
        .expect("write config");
        restrict_permissions(&path);

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.import.sample_rows, 3);
        assert_eq!(config.import.duplicate_policy, DuplicatePolicy::Update);
        assert_eq!(config.timeline.limit, 10);
    }

    #[test]
    fn load_at_path_rejects_unknown_keys() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "[import]\nbatch_size = 3\n").expect("write config");
        restrict_permissions(&path);

        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
