use anyhow::{Context, Result};

/// Default path fragments that mark pages living one directory below the site root.
pub const DEFAULT_SECTION_MARKERS: [&str; 3] = ["/Program", "/Strategic", "/Execution"];

#[derive(Debug, Clone)]
pub struct Config {
    // Static server
    pub site_root: String,
    pub port: u16,

    // Hosted contact store (Supabase)
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,

    // Translations
    pub translations_dir: String,
    pub section_markers: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", value))?,
            Err(_) => 3000,
        };

        Ok(Self {
            site_root: std::env::var("SITE_ROOT").unwrap_or_else(|_| ".".to_string()),
            port,

            supabase_url: non_empty_var("SUPABASE_URL"),
            supabase_anon_key: non_empty_var("SUPABASE_ANON_KEY"),

            translations_dir: std::env::var("TRANSLATIONS_DIR")
                .unwrap_or_else(|_| "translations".to_string()),
            section_markers: std::env::var("SECTION_MARKERS")
                .map(|v| parse_markers(&v))
                .unwrap_or_else(|_| default_section_markers()),
        })
    }

    /// Supabase URL and anon key, required only by the contact operations.
    pub fn contact_credentials(&self) -> Result<(&str, &str)> {
        let url = self
            .supabase_url
            .as_deref()
            .context("SUPABASE_URL not set")?;
        let key = self
            .supabase_anon_key
            .as_deref()
            .context("SUPABASE_ANON_KEY not set")?;
        Ok((url, key))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_root: ".".to_string(),
            port: 3000,
            supabase_url: None,
            supabase_anon_key: None,
            translations_dir: "translations".to_string(),
            section_markers: default_section_markers(),
        }
    }
}

pub fn default_section_markers() -> Vec<String> {
    DEFAULT_SECTION_MARKERS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_markers(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "SITE_ROOT",
        "PORT",
        "SUPABASE_URL",
        "SUPABASE_ANON_KEY",
        "TRANSLATIONS_DIR",
        "SECTION_MARKERS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.site_root, ".");
        assert_eq!(config.translations_dir, "translations");
        assert_eq!(
            config.section_markers,
            vec!["/Program", "/Strategic", "/Execution"]
        );
    }

    #[test]
    fn test_parse_markers_trims_and_skips_empty() {
        assert_eq!(
            parse_markers(" /Docs , ,/Blog"),
            vec!["/Docs".to_string(), "/Blog".to_string()]
        );
        assert!(parse_markers("").is_empty());
    }

    #[test]
    fn test_contact_credentials_missing_url() {
        let config = Config {
            supabase_anon_key: Some("anon".to_string()),
            ..Config::default()
        };
        let err = config.contact_credentials().unwrap_err();
        assert!(err.to_string().contains("SUPABASE_URL"));
    }

    #[test]
    fn test_contact_credentials_missing_key() {
        let config = Config {
            supabase_url: Some("https://example.supabase.co".to_string()),
            ..Config::default()
        };
        let err = config.contact_credentials().unwrap_err();
        assert!(err.to_string().contains("SUPABASE_ANON_KEY"));
    }

    #[test]
    fn test_contact_credentials_present() {
        let config = Config {
            supabase_url: Some("https://example.supabase.co".to_string()),
            supabase_anon_key: Some("anon".to_string()),
            ..Config::default()
        };
        let (url, key) = config.contact_credentials().unwrap();
        assert_eq!(url, "https://example.supabase.co");
        assert_eq!(key, "anon");
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.site_root, ".");
        assert_eq!(config.supabase_url, None);
        assert_eq!(config.section_markers, default_section_markers());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_overrides() {
        clear_env();
        std::env::set_var("SITE_ROOT", "public");
        std::env::set_var("PORT", "8080");
        std::env::set_var("SUPABASE_URL", " https://example.supabase.co ");
        std::env::set_var("SUPABASE_ANON_KEY", "anon");
        std::env::set_var("SECTION_MARKERS", "/Docs,/Blog");

        let config = Config::from_env().unwrap();
        clear_env();

        assert_eq!(config.site_root, "public");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.supabase_url.as_deref(),
            Some("https://example.supabase.co")
        );
        assert_eq!(config.section_markers, vec!["/Docs", "/Blog"]);
    }

    #[test]
    #[serial]
    fn test_from_env_blank_credentials_are_unset() {
        clear_env();
        std::env::set_var("SUPABASE_ANON_KEY", "   ");
        let config = Config::from_env().unwrap();
        clear_env();
        assert_eq!(config.supabase_anon_key, None);
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port() {
        clear_env();
        std::env::set_var("PORT", "http");
        let err = Config::from_env().unwrap_err();
        clear_env();
        assert!(err.to_string().contains("PORT"));
    }
}
