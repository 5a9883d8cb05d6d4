use std::env;
use std::path::PathBuf;

/// 5 MiB per uploaded image
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_MAX_GALLERY_IMAGES: usize = 12;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub max_gallery_images: usize,
    pub owner_username: Option<String>,
    pub owner_password: Option<String>,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup (environment, map in tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<usize>().ok());

        Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://mygigguide.db?mode=rwc".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES")
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            max_gallery_images: parsed("MAX_GALLERY_IMAGES")
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_GALLERY_IMAGES),
            owner_username: lookup("OWNER_USERNAME").filter(|s| !s.trim().is_empty()),
            owner_password: lookup("OWNER_PASSWORD").filter(|s| !s.is_empty()),
            seed_demo: lookup("SEED_DEMO")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.database_url, "sqlite://mygigguide.db?mode=rwc");
        assert_eq!(config.port, 8000);
        assert!(config.cors_allowed_origins.is_empty());
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.max_gallery_images, DEFAULT_MAX_GALLERY_IMAGES);
        assert!(config.owner_username.is_none());
        assert!(!config.seed_demo);
    }

    #[test]
    fn values_are_parsed() {
        let config = config_from(&[
            ("PORT", "9100"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:3000, https://mygigguide.app,"),
            ("MAX_GALLERY_IMAGES", "4"),
            ("SEED_DEMO", "1"),
            ("OWNER_USERNAME", "root"),
        ]);
        assert_eq!(config.port, 9100);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:3000", "https://mygigguide.app"]
        );
        assert_eq!(config.max_gallery_images, 4);
        assert!(config.seed_demo);
        assert_eq!(config.owner_username.as_deref(), Some("root"));
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = config_from(&[("PORT", "http"), ("MAX_UPLOAD_BYTES", "0")]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }
}
