use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use super::paths::AppPaths;
use crate::core::errors::ApiError;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub openai: OpenAiSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub embedding_model: String,
    pub chat_model: String,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: None,
            embedding_model: "text-embedding-3-small".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl OpenAiSettings {
    /// Config value wins; OPENAI_API_KEY is the fallback.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| env::var("OPENAI_API_KEY").ok())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub max_chars: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            max_chars: crate::rag::chunker::DEFAULT_MAX_CHARS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub match_threshold: f32,
    pub match_count: usize,
    pub mailbox_filter: Option<String>,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            match_threshold: -0.3,
            match_count: 10,
            mailbox_filter: None,
        }
    }
}

impl Settings {
    pub fn load(paths: &AppPaths) -> Result<Self, ApiError> {
        let mut settings = match config_path(paths) {
            Some(path) => {
                let contents = fs::read_to_string(&path).map_err(|err| {
                    ApiError::internal(format!("failed to read {}: {}", path.display(), err))
                })?;
                serde_yaml::from_str(&contents).map_err(|err| {
                    ApiError::internal(format!("failed to parse {}: {}", path.display(), err))
                })?
            }
            None => Settings::default(),
        };

        if let Some(port) = env::var("MAILDEX_PORT")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
        {
            settings.server.port = port;
        }

        Ok(settings)
    }
}

fn config_path(paths: &AppPaths) -> Option<PathBuf> {
    if let Ok(path) = env::var("MAILDEX_CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }

    let user_config = paths.user_data_dir.join("config.yml");
    if user_config.exists() {
        return Some(user_config);
    }

    let project_config = paths.project_root.join("config.yml");
    if project_config.exists() {
        return Some(project_config);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.chunking.max_chars, 500);
        assert_eq!(settings.retrieval.match_count, 10);
        assert!((settings.retrieval.match_threshold - -0.3).abs() < f32::EPSILON);
        assert_eq!(settings.openai.embedding_model, "text-embedding-3-small");
        assert_eq!(settings.openai.chat_model, "gpt-4o-mini");
        assert!(settings.retrieval.mailbox_filter.is_none());
    }

    #[test]
    fn partial_yaml_keeps_defaults_for_missing_keys() {
        let yaml = "server:\n  port: 9999\nretrieval:\n  match_count: 3\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(settings.server.port, 9999);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.retrieval.match_count, 3);
        assert!((settings.retrieval.match_threshold - -0.3).abs() < f32::EPSILON);
        assert_eq!(settings.chunking.max_chars, 500);
    }

    #[test]
    fn explicit_api_key_beats_the_environment() {
        let settings = OpenAiSettings {
            api_key: Some("sk-from-config".to_string()),
            ..Default::default()
        };
        assert_eq!(
            settings.resolved_api_key().as_deref(),
            Some("sk-from-config")
        );
    }
}
