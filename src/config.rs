use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ocr: OcrSection,
    /// Optional TOML file overriding the built-in emissions catalog.
    pub catalog_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OcrSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the env var holding the API key, not the key itself.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "nvidia/nemotron-nano-12b-v2-vl:free".to_string()
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

impl Default for OcrSection {
    fn default() -> Self {
        OcrSection {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load from `path` if the file exists, otherwise fall back to
    /// defaults so the `lines`/stdin workflows need no config at all.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Config {
                ocr: OcrSection::default(),
                catalog_path: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.ocr.api_key_env, "OPENROUTER_API_KEY");
        assert!(cfg.catalog_path.is_none());
    }

    #[test]
    fn test_partial_ocr_section() {
        let cfg: Config = toml::from_str(
            r#"
            catalog_path = "custom-catalog.toml"

            [ocr]
            model = "some/other-vision-model"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.ocr.model, "some/other-vision-model");
        assert_eq!(cfg.ocr.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(cfg.catalog_path.as_deref(), Some("custom-catalog.toml"));
    }
}
