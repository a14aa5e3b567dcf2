//! Backend lookup by `ProviderKind`

use crate::settings::ProviderSettings;
use crate::{GeminiProvider, OllamaProvider, OpenAiProvider};
use newsdesk_domain::{ExtractionProvider, ProviderError, ProviderKind};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// The set of backends a pipeline can dispatch to
///
/// Shared logic asks the registry for a provider by kind and never branches on
/// backend identity itself.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderKind, Arc<dyn ExtractionProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every backend the settings make usable
    ///
    /// Hosted backends without an API key are skipped; selecting them later
    /// yields `ProviderError::NotConfigured`.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        let mut registry = Self::new();

        registry.register_result(ProviderKind::OpenAi, OpenAiProvider::from_config(&settings.openai));
        registry.register_result(ProviderKind::Gemini, GeminiProvider::from_config(&settings.gemini));
        registry.register_result(ProviderKind::Ollama, OllamaProvider::from_config(&settings.ollama));

        registry
    }

    fn register_result<P>(&mut self, kind: ProviderKind, result: Result<P, ProviderError>)
    where
        P: ExtractionProvider + 'static,
    {
        match result {
            Ok(provider) => {
                debug!("Registered {} provider (model {})", kind, provider.model());
                self.register(provider);
            }
            Err(ProviderError::NotConfigured(reason)) => {
                debug!("Skipping {} provider: {}", kind, reason);
            }
            Err(e) => {
                warn!("Failed to set up {} provider: {}", kind, e);
            }
        }
    }

    /// Add a provider under its own kind, replacing any previous one
    pub fn register<P>(&mut self, provider: P) -> &mut Self
    where
        P: ExtractionProvider + 'static,
    {
        self.providers.insert(provider.kind(), Arc::new(provider));
        self
    }

    /// Add an already shared provider under an explicit kind
    pub fn register_as(&mut self, kind: ProviderKind, provider: Arc<dyn ExtractionProvider>) -> &mut Self {
        self.providers.insert(kind, provider);
        self
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_provider<P>(mut self, provider: P) -> Self
    where
        P: ExtractionProvider + 'static,
    {
        self.register(provider);
        self
    }

    /// Look up the provider for `kind`
    ///
    /// # Errors
    /// `NotConfigured` when no provider of that kind was registered.
    pub fn get(&self, kind: ProviderKind) -> Result<Arc<dyn ExtractionProvider>, ProviderError> {
        self.providers
            .get(&kind)
            .cloned()
            .ok_or_else(|| ProviderError::NotConfigured(format!("no {} provider registered", kind)))
    }

    /// Whether a provider of `kind` is available
    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// Registered kinds, in display order
    pub fn kinds(&self) -> Vec<ProviderKind> {
        self.providers.keys().copied().collect()
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.providers.iter().map(|(k, p)| (k.as_str(), p.model())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockProvider;
    use crate::settings::{GeminiConfig, OpenAiConfig};

    #[test]
    fn test_get_unregistered_kind() {
        let registry = ProviderRegistry::new();
        assert!(matches!(
            registry.get(ProviderKind::Gemini),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_register_under_own_kind() {
        let registry = ProviderRegistry::new()
            .with_provider(MockProvider::new("{}").with_kind(ProviderKind::Gemini));
        assert!(registry.contains(ProviderKind::Gemini));
        assert!(!registry.contains(ProviderKind::OpenAi));
        assert_eq!(registry.get(ProviderKind::Gemini).unwrap().kind(), ProviderKind::Gemini);
    }

    #[test]
    fn test_register_as_explicit_kind() {
        let mut registry = ProviderRegistry::new();
        registry.register_as(ProviderKind::Ollama, Arc::new(MockProvider::new("{}")));
        assert_eq!(registry.kinds(), vec![ProviderKind::Ollama]);
    }

    #[test]
    fn test_from_settings_with_keys() {
        let settings = ProviderSettings {
            openai: OpenAiConfig {
                api_key: Some("sk-test".to_string()),
                ..OpenAiConfig::default()
            },
            gemini: GeminiConfig {
                api_key: Some("g-test".to_string()),
                ..GeminiConfig::default()
            },
            ..ProviderSettings::default()
        };

        let registry = ProviderRegistry::from_settings(&settings);
        assert_eq!(
            registry.kinds(),
            vec![ProviderKind::OpenAi, ProviderKind::Gemini, ProviderKind::Ollama]
        );
        assert_eq!(registry.get(ProviderKind::OpenAi).unwrap().model(), "gpt-4o-mini");
    }
}
