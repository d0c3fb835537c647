//! Runtime configuration: where the city files live and how many raw rows to
//! show per page.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::selection::{City, parse_city};

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Maps city names to CSV paths, overriding the default file names.
///
/// Stored as a plain JSON object on disk:
/// ```json
/// {
///   "chicago": "/data/bikeshare/chicago_2017.csv",
///   "washington": "dc.csv"
/// }
/// ```
/// Relative paths are resolved against the data directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityFiles {
    entries: HashMap<City, PathBuf>,
}

impl CityFiles {
    /// Loads the map from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading city file map '{}'", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("parsing city file map '{}'", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: HashMap<String, PathBuf> = serde_json::from_str(content)?;
        let mut entries = HashMap::new();
        for (name, path) in raw {
            let city = parse_city(&name)?;
            if entries.insert(city, path).is_some() {
                bail!("city '{}' listed more than once", city);
            }
        }
        Ok(Self { entries })
    }

    /// Returns the configured path for `city`, if one is set.
    pub fn get(&self, city: City) -> Option<&Path> {
        self.entries.get(&city).map(PathBuf::as_path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub page_size: usize,
    pub city_files: CityFiles,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("."),
            page_size: DEFAULT_PAGE_SIZE,
            city_files: CityFiles::default(),
        }
    }
}

impl Config {
    /// Reads `BIKESHARE_DATA_DIR` and `BIKESHARE_PAGE_SIZE` from the process
    /// environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(dir) = lookup("BIKESHARE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(size) = lookup("BIKESHARE_PAGE_SIZE") {
            config.page_size = size
                .trim()
                .parse()
                .with_context(|| format!("BIKESHARE_PAGE_SIZE must be a number, got '{size}'"))?;
        }
        if config.page_size == 0 {
            bail!("BIKESHARE_PAGE_SIZE must be greater than zero");
        }

        Ok(config)
    }

    /// Resolves the CSV path for `city`.
    pub fn path_for(&self, city: City) -> PathBuf {
        match self.city_files.get(city) {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.data_dir.join(path),
            None => self.data_dir.join(city.file_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.page_size, 5);
        assert_eq!(config.path_for(City::NewYorkCity), PathBuf::from("./new_york_city.csv"));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(|key| match key {
            "BIKESHARE_DATA_DIR" => Some("/srv/bikeshare".into()),
            "BIKESHARE_PAGE_SIZE" => Some("10".into()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.page_size, 10);
        assert_eq!(
            config.path_for(City::Chicago),
            PathBuf::from("/srv/bikeshare/chicago.csv")
        );
    }

    #[test]
    fn test_invalid_page_size() {
        fn bad(value: &'static str) -> impl Fn(&str) -> Option<String> {
            move |key: &str| (key == "BIKESHARE_PAGE_SIZE").then(|| value.to_string())
        }
        assert!(Config::from_lookup(bad("five")).is_err());
        assert!(Config::from_lookup(bad("0")).is_err());
    }

    #[test]
    fn test_city_files_override() {
        let files = CityFiles::from_json(
            r#"{ "Chicago": "chicago_2017.csv", "washington": "/abs/dc.csv" }"#,
        )
        .unwrap();
        let config = Config {
            data_dir: PathBuf::from("data"),
            city_files: files,
            ..Config::default()
        };

        assert_eq!(
            config.path_for(City::Chicago),
            PathBuf::from("data/chicago_2017.csv")
        );
        assert_eq!(config.path_for(City::Washington), PathBuf::from("/abs/dc.csv"));
        assert_eq!(
            config.path_for(City::NewYorkCity),
            PathBuf::from("data/new_york_city.csv")
        );
    }

    #[test]
    fn test_city_files_rejects_unknown_city() {
        assert!(CityFiles::from_json(r#"{ "boston": "boston.csv" }"#).is_err());
        assert!(CityFiles::from_json(r#"{ "chicago": "a.csv", "CHICAGO": "b.csv" }"#).is_err());
    }

    #[test]
    fn test_city_files_load_from_disk() {
        let path = std::env::temp_dir().join("bikeshare_explorer_city_files.json");
        std::fs::write(&path, r#"{ "new york city": "nyc.csv" }"#).unwrap();

        let files = CityFiles::load(&path).unwrap();
        assert_eq!(files.get(City::NewYorkCity), Some(Path::new("nyc.csv")));
        assert_eq!(files.get(City::Chicago), None);

        std::fs::remove_file(&path).unwrap();
    }
}
