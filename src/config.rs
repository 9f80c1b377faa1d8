use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::{
        Service,
        WaniWordsError,
    },
    persistence::{
        load_json_or_default,
        save_json,
    },
};

/// Contents of `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeys {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wanikani: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jpdb: Option<String>,
}

impl ApiKeys {
    pub fn get(&self, service: Service) -> Option<&str> {
        let key = match service {
            Service::WaniKani => &self.wanikani,
            Service::Jpdb => &self.jpdb,
        };
        key.as_deref().filter(|k| !k.trim().is_empty())
    }

    fn slot(&mut self, service: Service) -> &mut Option<String> {
        match service {
            Service::WaniKani => &mut self.wanikani,
            Service::Jpdb => &mut self.jpdb,
        }
    }
}

/// Supplies a replacement API key when the stored one is missing or was rejected.
/// Implemented by the user interface; the library never reads input itself.
pub trait CredentialProvider {
    fn request_key(&mut self, service: Service) -> Result<String, WaniWordsError>;
}

pub struct ConfigStore {
    path: PathBuf,
    keys: ApiKeys,
}

impl ConfigStore {
    /// Missing or unreadable config is treated as empty; the keys get asked for again.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let keys = load_json_or_default(&path);
        Self { path, keys }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn keys(&self) -> &ApiKeys {
        &self.keys
    }

    /// The stored key for `service`, asking `provider` (and saving the answer) if there is none.
    pub fn require_key(
        &mut self,
        service: Service,
        provider: &mut dyn CredentialProvider,
    ) -> Result<String, WaniWordsError> {
        if let Some(key) = self.keys.get(service) {
            return Ok(key.to_string());
        }

        tracing::info!("Missing {} key from config", service.config_key());
        let key = provider.request_key(service)?.trim().to_string();
        if key.is_empty() {
            return Err(WaniWordsError::Config(format!("No {} API key provided", service)));
        }
        self.set_key(service, key.clone())?;
        Ok(key)
    }

    pub fn set_key(&mut self, service: Service, key: String) -> Result<(), WaniWordsError> {
        *self.keys.slot(service) = Some(key);
        self.save()
    }

    /// Forgets the key for `service` so the next run asks for a new one.
    pub fn invalidate(&mut self, service: Service) -> Result<(), WaniWordsError> {
        tracing::warn!("Removing rejected {} key from config", service);
        *self.keys.slot(service) = None;
        self.save()
    }

    /// Invalidates the rejected key if `error` is an authentication failure.
    pub fn invalidate_rejected(&mut self, error: &WaniWordsError) -> Result<bool, WaniWordsError> {
        match error.rejected_credential() {
            Some(service) => {
                self.invalidate(service)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn save(&self) -> Result<(), WaniWordsError> {
        save_json(&self.keys, &self.path)
    }
}
