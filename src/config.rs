use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::policy::{NormalizationPolicy, Profile, Unit, UnitSelection};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub root_paths: Vec<String>,
    pub ignore_patterns: Vec<String>,
    /// Listings kept per directory by the keep-target-count pass.
    pub target_count: usize,
    /// Receives heavier pack-size variants.
    pub duplicate_dir_name: String,
    /// Receives listings beyond `target_count`.
    pub excess_dir_name: String,
    pub image_extensions: Vec<String>,
    pub sidecar_extensions: Vec<String>,
    pub history_file_name: String,
    pub normalization: NormalizationConfig,
    pub catalog: CatalogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_paths: Vec::new(),
            ignore_patterns: Vec::new(),
            target_count: 20,
            duplicate_dir_name: "다른 무게 물건".to_string(),
            excess_dir_name: "초과 파일".to_string(),
            image_extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
            sidecar_extensions: vec!["txt".into(), "json".into()],
            history_file_name: ".weigh-duper-history.jsonl".to_string(),
            normalization: NormalizationConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Directory names the walker never descends into.
    pub fn overflow_dir_names(&self) -> Vec<&str> {
        vec![
            self.duplicate_dir_name.as_str(),
            self.excess_dir_name.as_str(),
        ]
    }
}

/// Profile selection plus per-field overrides of its policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_tokens: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_segments: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<Vec<Unit>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_selection: Option<UnitSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_multiplier: Option<bool>,
}

impl NormalizationConfig {
    pub fn to_policy(&self) -> NormalizationPolicy {
        let mut policy = self.profile.policy();
        if let Some(tokens) = &self.noise_tokens {
            policy.noise_tokens = tokens.clone();
        }
        if let Some(segments) = self.prefix_segments {
            policy.prefix_segments = segments;
        }
        if let Some(limit) = self.key_tokens {
            // Zero means "no limit".
            policy.key_tokens = (limit > 0).then_some(limit);
        }
        if let Some(units) = &self.units {
            policy.units = units.clone();
        }
        if let Some(selection) = self.unit_selection {
            policy.unit_selection = selection;
        }
        if let Some(apply) = self.apply_multiplier {
            policy.apply_multiplier = apply;
        }
        policy
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Prepended to the root-relative image path of every catalog entry.
    pub image_url_prefix: String,
}

/// Load `Config.toml` (or `path`), then `WEIGH_DUPER_*` environment overrides.
pub fn load_configuration_from(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let file_source = match path {
        Some(path) => ConfigFile::from(path).required(true),
        None => ConfigFile::with_name("Config").required(false),
    };

    let builder = Config::builder()
        .add_source(file_source)
        .add_source(
            Environment::with_prefix("WEIGH_DUPER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Remove directories that are subdirectories of other directories in the list.
pub fn non_overlapping_directories(dirs: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();

    for dir in dirs {
        let dir_path = Path::new(&dir);

        if result.iter().any(|res| dir_path.starts_with(Path::new(res))) {
            continue;
        }

        result.retain(|res| !Path::new(res).starts_with(dir_path));
        result.push(dir);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_non_overlapping_no_overlap() {
        let dirs = vec![
            "/data/cat".to_string(),
            "/data/dog".to_string(),
            "/var/crawl".to_string(),
        ];
        let result = non_overlapping_directories(dirs);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_non_overlapping_with_subdirectory() {
        let dirs = vec![
            "/data/dog/간식".to_string(),
            "/data/dog".to_string(),
            "/data/dog/사료".to_string(),
            "/var/crawl".to_string(),
        ];
        let result = non_overlapping_directories(dirs);
        assert_eq!(result, vec!["/data/dog".to_string(), "/var/crawl".to_string()]);
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.target_count, 20);
        assert_eq!(config.overflow_dir_names(), vec!["다른 무게 물건", "초과 파일"]);
        assert_eq!(config.normalization.to_policy(), NormalizationPolicy::strict());
    }

    #[test]
    fn test_overrides_apply_on_top_of_profile() {
        let normalization = NormalizationConfig {
            profile: Profile::CategoryPrefixed,
            key_tokens: Some(0),
            apply_multiplier: Some(false),
            ..Default::default()
        };
        let policy = normalization.to_policy();
        assert_eq!(policy.prefix_segments, 2);
        assert_eq!(policy.key_tokens, None);
        assert!(!policy.apply_multiplier);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weigh.toml");
        fs::write(
            &path,
            r#"
root_paths = ["crawled_data"]
target_count = 12

[normalization]
profile = "category-prefixed"
units = ["kg", "g"]
"#,
        )
        .unwrap();

        let config = load_configuration_from(Some(&path)).unwrap();
        assert_eq!(config.root_paths, vec!["crawled_data".to_string()]);
        assert_eq!(config.target_count, 12);
        assert_eq!(config.excess_dir_name, "초과 파일");
        let policy = config.normalization.to_policy();
        assert_eq!(policy.units, vec![Unit::Kg, Unit::G]);
        assert_eq!(policy.key_tokens, Some(3));
    }
}
