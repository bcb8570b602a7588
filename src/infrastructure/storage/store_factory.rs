use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{MediaStore, StorageError};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::bunny_store::BunnyMediaStore;
use super::local_store::LocalMediaStore;

pub struct MediaStoreFactory;

impl MediaStoreFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn MediaStore>, StorageError> {
        match settings.provider {
            StorageProviderSetting::Local => {
                let path = PathBuf::from(&settings.local_path);
                let store = LocalMediaStore::new(path, &settings.public_base_url)?;
                Ok(Arc::new(store))
            }
            StorageProviderSetting::Bunny => {
                let zone = settings.bunny_zone.as_deref().ok_or_else(|| {
                    StorageError::Misconfigured("bunny_zone required".into())
                })?;
                let key = settings.bunny_access_key.as_deref().ok_or_else(|| {
                    StorageError::Misconfigured("bunny_access_key required".into())
                })?;
                let store = BunnyMediaStore::new(
                    zone,
                    key,
                    &settings.public_base_url,
                    settings.bunny_storage_url.clone(),
                )?;
                Ok(Arc::new(store))
            }
        }
    }
}
