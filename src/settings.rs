use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use config::{Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

/// Files tried, in order, when `CONFIG_PATH` is not set
const DEFAULT_CONFIG_FILES: &[&str] = &["gateway.yaml", "gateway.yml", "gateway.json"];

/// Flat environment variables mapped onto settings keys
const FLAT_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("TRANSLATE_PROVIDER", "translation.provider"),
    ("DEEPL_API_KEY", "translation.deepl.api_key"),
    ("DEEPL_API_URL", "translation.deepl.api_url"),
    ("OPENAI_API_KEY", "translation.openai.api_key"),
    ("OPENAI_MODEL", "translation.openai.model"),
    ("OPENAI_BASE_URL", "translation.openai.base_url"),
    ("PORT", "server.port"),
];

/// Translations must stay near-deterministic
const MAX_TEMPERATURE: f32 = 0.3;

/// Process-wide settings, built once at start-up
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub translation: TranslationSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Everything the gateway needs to pick and call a provider
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationSettings {
    /// `deepl` or `openai`; anything else selects the fallback
    #[serde(default)]
    pub provider: Option<String>,
    /// Outbound request timeout, `0` disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub deepl: DeepLSettings,
    #[serde(default)]
    pub openai: OpenAISettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeepLSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_deepl_api_url")]
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAISettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub temperature: f32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_deepl_api_url() -> String {
    "https://api-free.deepl.com/v2/translate".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl ServerSettings {
    /// Bind the listener; `host` may be a name (`localhost`) or an IPv4/IPv6 literal.
    pub async fn bind(&self) -> Result<TcpListener> {
        TcpListener::bind((self.host.as_str(), self.port))
            .await
            .with_context(|| format!("failed to bind {}:{}", self.host, self.port))
    }
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            provider: None,
            timeout_secs: default_timeout_secs(),
            deepl: DeepLSettings::default(),
            openai: OpenAISettings::default(),
        }
    }
}

impl Default for DeepLSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_deepl_api_url(),
        }
    }
}

impl Default for OpenAISettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openai_model(),
            base_url: default_openai_base_url(),
            temperature: 0.0,
        }
    }
}

impl Settings {
    /// Load settings from the optional config file and the process environment.
    pub fn load() -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        let path = env
            .get("CONFIG_PATH")
            .cloned()
            .or_else(|| {
                DEFAULT_CONFIG_FILES
                    .iter()
                    .find(|p| Path::new(p).exists())
                    .map(|p| p.to_string())
            });

        let file = match path {
            Some(path) => Some(read_config_file(&path, &env)?),
            None => None,
        };

        Self::from_sources(file, &env)
    }

    /// Layer defaults, file contents and environment into a `Settings`.
    ///
    /// `env` stands in for the process environment so tests never touch it.
    pub fn from_sources(
        file: Option<(String, FileFormat)>,
        env: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some((content, format)) = file {
            builder = builder.add_source(File::from_str(&content, format));
        }

        builder = builder.add_source(
            Environment::with_prefix("GATEWAY")
                .prefix_separator("_")
                .separator("__")
                .source(Some(env.clone())),
        );

        for (var, key) in FLAT_ENV_OVERRIDES {
            builder = builder.set_override_option(*key, env.get(*var).cloned())?;
        }

        let mut settings: Settings = builder
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    /// Blank strings count as unset.
    fn normalize(&mut self) {
        let blank_to_none = |value: &mut Option<String>| {
            if value.as_deref().map_or(false, |v| v.trim().is_empty()) {
                *value = None;
            }
        };
        blank_to_none(&mut self.translation.provider);
        blank_to_none(&mut self.translation.deepl.api_key);
        blank_to_none(&mut self.translation.openai.api_key);
    }

    fn validate(&self) -> Result<()> {
        let temperature = self.translation.openai.temperature;
        if !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
            anyhow::bail!(
                "translation.openai.temperature must be within [0, {MAX_TEMPERATURE}], got {temperature}"
            );
        }
        Ok(())
    }
}

/// Read a YAML or JSON config file, substituting `${VAR}` from `env`.
pub fn read_config_file(
    path: &str,
    env: &HashMap<String, String>,
) -> Result<(String, FileFormat)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {path}"))?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let pattern = Regex::new(r"\$\{(\w+)\}")?;
    let content = pattern
        .replace_all(content, |caps: &regex::Captures| {
            env.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned();

    let path_lower = path.to_lowercase();
    let format = if path_lower.ends_with(".json") {
        FileFormat::Json
    } else {
        FileFormat::Yaml
    };

    debug!("Read configuration file {} as {:?}", path, format);
    Ok((content, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_without_any_source() {
        let settings = Settings::from_sources(None, &HashMap::new()).unwrap();

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.translation.provider, None);
        assert_eq!(settings.translation.timeout_secs, 30);
        assert_eq!(settings.translation.openai.model, "gpt-4o-mini");
        assert_eq!(
            settings.translation.deepl.api_url,
            "https://api-free.deepl.com/v2/translate"
        );
    }

    #[test]
    fn flat_variables_override_file() {
        let yaml = r#"
translation:
  provider: openai
  openai:
    api_key: from-file
    model: file-model
"#;
        let settings = Settings::from_sources(
            Some((yaml.to_string(), FileFormat::Yaml)),
            &env(&[("TRANSLATE_PROVIDER", "deepl"), ("DEEPL_API_KEY", "k-1")]),
        )
        .unwrap();

        assert_eq!(settings.translation.provider.as_deref(), Some("deepl"));
        assert_eq!(settings.translation.deepl.api_key.as_deref(), Some("k-1"));
        assert_eq!(settings.translation.openai.api_key.as_deref(), Some("from-file"));
        assert_eq!(settings.translation.openai.model, "file-model");
    }

    #[test]
    fn prefixed_variables_nest() {
        let settings = Settings::from_sources(
            None,
            &env(&[
                ("GATEWAY_SERVER__PORT", "8080"),
                ("GATEWAY_TRANSLATION__TIMEOUT_SECS", "5"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.translation.timeout_secs, 5);
    }

    #[test]
    fn blank_credentials_are_unset() {
        let settings = Settings::from_sources(
            None,
            &env(&[("TRANSLATE_PROVIDER", "deepl"), ("DEEPL_API_KEY", "  ")]),
        )
        .unwrap();

        assert_eq!(settings.translation.deepl.api_key, None);
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let json = r#"{ "translation": { "openai": { "temperature": 3.5 } } }"#;
        let result = Settings::from_sources(
            Some((json.to_string(), FileFormat::Json)),
            &HashMap::new(),
        );

        assert!(result.is_err());
    }

    #[test]
    fn temperature_is_bounded_for_deterministic_output() {
        let settings_with = |t: &str| {
            Settings::from_sources(
                Some((
                    format!(r#"{{ "translation": {{ "openai": {{ "temperature": {t} }} }} }}"#),
                    FileFormat::Json,
                )),
                &HashMap::new(),
            )
        };

        assert!(settings_with("0.5").is_err());
        assert!(settings_with("-0.1").is_err());
        let settings = settings_with("0.3").unwrap();
        assert_eq!(settings.translation.openai.temperature, 0.3);
    }

    #[tokio::test]
    async fn binds_hostnames_and_literals() {
        for host in ["localhost", "127.0.0.1"] {
            let server = ServerSettings {
                host: host.to_string(),
                port: 0,
                ..ServerSettings::default()
            };
            let listener = server.bind().await.unwrap();
            assert!(listener.local_addr().unwrap().ip().is_loopback());
        }
    }

    #[test]
    fn config_file_substitutes_environment() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "translation:\n  provider: deepl\n  deepl:\n    api_key: \"${{MY_DEEPL_KEY}}\"\n  openai:\n    api_key: \"${{MISSING_KEY}}\""
        )
        .unwrap();

        let vars = env(&[("MY_DEEPL_KEY", "secret")]);
        let path = file.path().to_str().unwrap();
        let loaded = read_config_file(path, &vars).unwrap();
        assert_eq!(loaded.1, FileFormat::Yaml);

        let settings = Settings::from_sources(Some(loaded), &vars).unwrap();
        assert_eq!(settings.translation.deepl.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.translation.openai.api_key, None);
    }
}
