#[cfg(test)]
mod tests {
    use crate::config::{Config, ConfigError, LLMConfig, LLMProvider};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn with_keys(mut config: Config) -> Config {
        config.research.llm.api_key = "gsk-test".to_string();
        config.writing.llm.api_key = "unused".to_string();
        config
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.research.llm.provider, LLMProvider::Groq);
        assert_eq!(config.research.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.research.llm.max_tokens, Some(350));
        assert_eq!(config.writing.llm.provider, LLMProvider::Ollama);
        assert_eq!(config.writing.llm.model, "llama3.1:8b");
        assert_eq!(config.writing.llm.base_url(), "http://localhost:11434");
        assert!(config.writing.llm.max_tokens.is_none());
        assert!(config.output_path.is_none());
        assert!(!config.check_connection);
        assert!(!config.verbose);
    }

    #[test]
    fn test_llm_provider_default() {
        assert_eq!(LLMProvider::default(), LLMProvider::Groq);
    }

    #[test]
    fn test_llm_provider_from_str() {
        assert_eq!("groq".parse::<LLMProvider>().unwrap(), LLMProvider::Groq);
        assert_eq!("Ollama".parse::<LLMProvider>().unwrap(), LLMProvider::Ollama);
        assert_eq!("OPENAI".parse::<LLMProvider>().unwrap(), LLMProvider::OpenAI);

        let err = "anthropic".parse::<LLMProvider>().unwrap_err();
        assert_eq!(err, "Unknown provider: anthropic");
    }

    #[test]
    fn test_llm_provider_display() {
        assert_eq!(LLMProvider::Groq.to_string(), "groq");
        assert_eq!(LLMProvider::Ollama.to_string(), "ollama");
        assert_eq!(LLMProvider::OpenAI.to_string(), "openai");
    }

    #[test]
    fn test_provider_credentials_and_endpoints() {
        assert_eq!(LLMProvider::Groq.api_key_env(), Some("GROQ_API_KEY"));
        assert_eq!(LLMProvider::OpenAI.api_key_env(), Some("OPENAI_API_KEY"));
        assert_eq!(LLMProvider::Ollama.api_key_env(), None);

        let mut llm = LLMConfig::research_default();
        assert_eq!(llm.base_url(), "https://api.groq.com/openai/v1");
        llm.api_base_url = "http://proxy.local/v1".to_string();
        assert_eq!(llm.base_url(), "http://proxy.local/v1");
    }

    #[test]
    fn test_llm_config_default() {
        let config = LLMConfig::default();

        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_turns, 5);
        assert_eq!(config.timeout_seconds, 300);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            output_path = "./out"

            [writing.llm]
            provider = "openai"
            model = "gpt-4o-mini"
            max_tokens = 4096

            [research.agents.research_manager]
            role = "Lead Researcher"
            goal = "Compile the report"
            backstory = "Seasoned."
            "#,
        )
        .unwrap();

        assert_eq!(config.output_path, Some(PathBuf::from("./out")));
        assert_eq!(config.writing.llm.provider, LLMProvider::OpenAI);
        assert_eq!(config.writing.llm.max_tokens, Some(4096));
        assert_eq!(config.writing.llm.temperature, 0.2);
        assert_eq!(config.research.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.research.agents.research_manager.role, "Lead Researcher");
        assert_eq!(
            config.research.agents.web_specialist.role,
            "Web Content Specialist"
        );
        assert_eq!(
            config.writing.agents.technical_writer.role,
            "Technical Writer"
        );
    }

    #[test]
    fn test_llm_table_requires_provider_and_model() {
        let result = toml::from_str::<Config>(
            r#"
            [research.llm]
            temperature = 0.5
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("guide-flow.toml");
        std::fs::write(
            &path,
            r#"
            verbose = true

            [research.llm]
            provider = "ollama"
            model = "qwen2.5:7b"
            "#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(config.verbose);
        assert_eq!(config.research.llm.provider, LLMProvider::Ollama);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_missing_is_error() {
        assert!(Config::from_file(Path::new("/nonexistent/guide-flow.toml")).is_err());
    }

    #[test]
    fn test_validate_missing_key_for_remote_provider() {
        let config = Config::default();
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::MissingApiKey {
                stage: "research",
                provider: LLMProvider::Groq,
                env_var: "GROQ_API_KEY",
            }
        );

        let mut config = with_keys(Config::default());
        config.writing.llm.provider = LLMProvider::OpenAI;
        config.writing.llm.api_key = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingApiKey { stage: "writing", .. })
        ));
    }

    #[test]
    fn test_validate_model_settings() {
        assert!(with_keys(Config::default()).validate().is_ok());

        let mut config = with_keys(Config::default());
        config.writing.llm.model = " ".to_string();
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::MissingModel { stage: "writing" }
        );

        let mut config = with_keys(Config::default());
        config.research.llm.temperature = 3.5;
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::InvalidTemperature {
                stage: "research",
                value: 3.5
            }
        );

        let mut config = with_keys(Config::default());
        config.research.llm.max_turns = 0;
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::ZeroTurns { stage: "research" }
        );
    }

    #[test]
    fn test_configured_key_is_not_replaced_by_environment() {
        let mut llm = LLMConfig::research_default();
        llm.api_key = "from-file".to_string();
        llm.resolve_api_key();
        assert_eq!(llm.api_key, "from-file");
    }
}
