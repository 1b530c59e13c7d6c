use std::env;
use std::path::PathBuf;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_GEMINI_IMAGE_MODEL: &str = "imagen-3.0-generate-002";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const DEFAULT_OLLAMA_HOST: &str = "http://127.0.0.1:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:latest";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        model: String,
        image_model: String,
    },
    OpenAi {
        api_key: Option<String>,
        base_url: String,
        model: String,
        image_model: Option<String>,
    },
    Ollama {
        host: String,
        model: String,
    },
    Unconfigured,
}

impl ProviderConfig {
    /// Priority order:
    /// 1. GEMINI_API_KEY → Gemini
    /// 2. OPENAI_API_KEY or OPENAI_BASE_URL → OpenAI-compatible endpoint
    /// 3. LLM_USE_OLLAMA=true → Ollama
    fn from_lookup(var: &impl Fn(&str) -> Option<String>) -> Self {
        let or_default = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        if let Some(api_key) = var("GEMINI_API_KEY") {
            return Self::Gemini {
                api_key,
                model: or_default("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                image_model: or_default("GEMINI_IMAGE_MODEL", DEFAULT_GEMINI_IMAGE_MODEL),
            };
        }

        let openai_key = var("OPENAI_API_KEY");
        let openai_base = var("OPENAI_BASE_URL");
        if openai_key.is_some() || openai_base.is_some() {
            return Self::OpenAi {
                api_key: openai_key,
                base_url: openai_base.unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                model: or_default("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
                image_model: var("OPENAI_IMAGE_MODEL"),
            };
        }

        let use_ollama = var("LLM_USE_OLLAMA")
            .unwrap_or_else(|| "false".into())
            .to_ascii_lowercase();
        if matches!(use_ollama.as_str(), "1" | "true" | "yes" | "on") {
            return Self::Ollama {
                host: or_default("OLLAMA_HOST", DEFAULT_OLLAMA_HOST),
                model: or_default("LLM_MODEL", DEFAULT_OLLAMA_MODEL),
            };
        }

        Self::Unconfigured
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    /// `CEBOLA_DATA_DIR`: where chat history is kept instead of the platform
    /// data directory.
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok().filter(|value| !value.trim().is_empty()))
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            provider: ProviderConfig::from_lookup(&var),
            data_dir: var("CEBOLA_DATA_DIR").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(move |key| vars.get(key).cloned())
    }

    #[test]
    fn gemini_takes_priority() {
        let cfg = config(&[("GEMINI_API_KEY", "g"), ("OPENAI_API_KEY", "o")]);
        assert_eq!(
            cfg.provider,
            ProviderConfig::Gemini {
                api_key: "g".to_string(),
                model: DEFAULT_GEMINI_MODEL.to_string(),
                image_model: DEFAULT_GEMINI_IMAGE_MODEL.to_string(),
            }
        );
    }

    #[test]
    fn openai_base_url_alone_is_enough() {
        let cfg = config(&[("OPENAI_BASE_URL", "http://localhost:8080/v1")]);
        match cfg.provider {
            ProviderConfig::OpenAi {
                api_key, base_url, ..
            } => {
                assert!(api_key.is_none());
                assert_eq!(base_url, "http://localhost:8080/v1");
            }
            other => panic!("unexpected provider {other:?}"),
        }
    }

    #[test]
    fn data_dir_override() {
        assert_eq!(config(&[]).data_dir, None);
        assert_eq!(
            config(&[("CEBOLA_DATA_DIR", "/tmp/cebola")]).data_dir,
            Some(PathBuf::from("/tmp/cebola"))
        );
    }

    #[test]
    fn ollama_is_opt_in() {
        assert_eq!(config(&[("LLM_USE_OLLAMA", "no")]).provider, ProviderConfig::Unconfigured);
        assert_eq!(
            config(&[("LLM_USE_OLLAMA", "TRUE"), ("LLM_MODEL", "qwen")]).provider,
            ProviderConfig::Ollama {
                host: DEFAULT_OLLAMA_HOST.to_string(),
                model: "qwen".to_string(),
            }
        );
    }
}
