use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::{
    storage::Storage,
    types::{ProviderCredential, ProviderId},
};

/// Storage key for the provider → API key mapping.
pub const API_KEYS_STORAGE_KEY: &str = "ratatouille_api_keys";
/// Storage key for the last selected provider.
pub const PROVIDER_STORAGE_KEY: &str = "ratatouille_model";

pub type ProviderKeys = BTreeMap<ProviderId, String>;

/// Parses the stored key mapping. Unknown providers are dropped and anything
/// unreadable loads as an empty mapping.
pub fn load_keys(raw: Option<&str>) -> ProviderKeys {
    let Some(raw) = raw else {
        return ProviderKeys::new();
    };

    match serde_json::from_str::<BTreeMap<String, String>>(raw) {
        Ok(stored) => stored
            .into_iter()
            .filter_map(|(provider, key)| Some((provider.parse().ok()?, key)))
            .collect(),
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable stored API keys");
            ProviderKeys::new()
        }
    }
}

pub fn save_keys(keys: &ProviderKeys) -> String {
    let stored: BTreeMap<&str, &str> = keys
        .iter()
        .map(|(provider, key)| (provider.as_str(), key.as_str()))
        .collect();

    serde_json::to_string(&stored).unwrap_or_else(|_| "{}".to_string())
}

/// Active provider plus one API key per provider, persisted through a
/// [`Storage`].
pub struct SettingsStore<S> {
    storage: S,
    active: ProviderId,
    keys: ProviderKeys,
}

impl<S: Storage> SettingsStore<S> {
    pub fn load(storage: S) -> Self {
        let keys = load_keys(storage.get(API_KEYS_STORAGE_KEY).as_deref());
        let active = storage
            .get(PROVIDER_STORAGE_KEY)
            .and_then(|p| p.parse().ok())
            .unwrap_or_default();

        Self {
            storage,
            active,
            keys,
        }
    }

    pub fn active_provider(&self) -> ProviderId {
        self.active
    }

    /// Key of the active provider, empty when none has been entered.
    pub fn api_key(&self) -> &str {
        self.keys.get(&self.active).map_or("", String::as_str)
    }

    pub fn keys(&self) -> &ProviderKeys {
        &self.keys
    }

    pub fn select_provider(&mut self, provider: ProviderId) {
        debug!(%provider, "Selecting provider");

        self.active = provider;
        self.storage
            .set(PROVIDER_STORAGE_KEY, provider.as_str().to_string());
    }

    /// Updates the key for the active provider only and persists the whole
    /// mapping.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.keys.insert(self.active, api_key.into());
        self.storage
            .set(API_KEYS_STORAGE_KEY, save_keys(&self.keys));
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key().is_empty()
    }

    pub fn credential(&self) -> ProviderCredential {
        ProviderCredential::new(self.active, self.api_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn switching_providers_restores_each_key() {
        let mut settings = SettingsStore::load(MemoryStorage::new());

        settings.select_provider(ProviderId::OpenAi);
        settings.set_api_key("A");
        settings.select_provider(ProviderId::Anthropic);
        assert_eq!(settings.api_key(), "");
        settings.set_api_key("B");
        settings.select_provider(ProviderId::OpenAi);

        assert_eq!(settings.api_key(), "A");
        settings.select_provider(ProviderId::Anthropic);
        assert_eq!(settings.api_key(), "B");
    }

    #[test]
    fn settings_survive_a_reload() {
        let storage = MemoryStorage::new();
        {
            let mut settings = SettingsStore::load(&storage);
            settings.select_provider(ProviderId::Grok);
            settings.set_api_key("xai-123");
        }

        let settings = SettingsStore::load(&storage);

        assert_eq!(settings.active_provider(), ProviderId::Grok);
        assert_eq!(settings.api_key(), "xai-123");
        assert!(settings.has_credential());
    }

    #[test]
    fn empty_key_is_not_a_credential() {
        let mut settings = SettingsStore::load(MemoryStorage::new());
        assert!(!settings.has_credential());

        settings.set_api_key("");
        assert!(!settings.has_credential());
        assert!(!settings.credential().is_configured());
    }

    #[test]
    fn stored_mapping_round_trips_and_tolerates_garbage() {
        let mut keys = ProviderKeys::new();
        keys.insert(ProviderId::Perplexity, "pplx".to_string());

        let raw = save_keys(&keys);
        assert_eq!(raw, r#"{"perplexity":"pplx"}"#);
        assert_eq!(load_keys(Some(&raw)), keys);

        assert!(load_keys(Some("not json")).is_empty());
        assert!(load_keys(None).is_empty());
        assert_eq!(
            load_keys(Some(r#"{"perplexity":"pplx","mistral":"m"}"#)),
            keys
        );
    }

    #[test]
    fn unknown_stored_provider_falls_back_to_default() {
        let storage = MemoryStorage::new();
        storage.set(PROVIDER_STORAGE_KEY, "mistral".to_string());

        let settings = SettingsStore::load(storage);

        assert_eq!(settings.active_provider(), ProviderId::OpenAi);
    }
}
