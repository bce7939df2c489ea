use anyhow::Result;
use strum_macros::{Display, EnumIter, EnumString};

use super::{
    base::Provider, configs::ProviderConfig, ollama::OllamaProvider, openai::OpenAiProvider,
};

#[derive(EnumIter, EnumString, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ProviderType {
    Ollama,
    OpenAi,
}

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider + Send + Sync>> {
    match config {
        ProviderConfig::Ollama(ollama_config) => Ok(Box::new(OllamaProvider::new(ollama_config)?)),
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(ProviderType::from_str("ollama").unwrap(), ProviderType::Ollama);
        assert_eq!(ProviderType::from_str("open-ai").unwrap(), ProviderType::OpenAi);
        assert_eq!(ProviderType::from_str("Open-Ai").unwrap(), ProviderType::OpenAi);
        assert!(ProviderType::from_str("claude").is_err());
    }

    #[test]
    fn test_provider_type_listing() {
        let names: Vec<String> = ProviderType::iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["ollama", "open-ai"]);
    }
}
