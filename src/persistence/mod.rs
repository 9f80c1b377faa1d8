use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::WaniWordsError;

const APP_NAME: &str = "waniwords";

pub const CONFIG_FILE: &str = "config.json";
pub const KNOWLEDGE_CACHE_FILE: &str = "wanikani_cache.json";
pub const FREQUENCY_LIST_FILE: &str = "frequency_list.json";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        data_dir.join(APP_NAME)
    } else {
        PathBuf::from(".")
    }
}

pub fn save_json<T: Serialize>(data: &T, file_path: &Path) -> Result<(), WaniWordsError> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(data)?;
    fs::write(file_path, json)?;
    tracing::debug!("Data saved to: {}", file_path.display());
    Ok(())
}

/// `Ok(None)` when the file does not exist yet.
pub fn load_json<T: for<'de> Deserialize<'de>>(
    file_path: &Path,
) -> Result<Option<T>, WaniWordsError> {
    if !file_path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(file_path)?;
    let data: T = serde_json::from_str(&json)?;
    tracing::debug!("Data loaded from: {}", file_path.display());
    Ok(Some(data))
}

/// For working data that can be rebuilt: a missing or unreadable file yields the default.
pub fn load_json_or_default<T: for<'de> Deserialize<'de> + Default>(file_path: &Path) -> T {
    match load_json::<T>(file_path) {
        Ok(Some(data)) => data,
        Ok(None) => {
            tracing::info!("{} not found, starting empty", file_path.display());
            T::default()
        }
        Err(e) => {
            tracing::warn!("Failed to load {}: {}. Using defaults.", file_path.display(), e);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");

        assert!(load_json::<BTreeMap<String, u32>>(&path).unwrap().is_none());

        let mut data = BTreeMap::new();
        data.insert("猫".to_string(), 5);
        save_json(&data, &path).unwrap();
        assert_eq!(load_json::<BTreeMap<String, u32>>(&path).unwrap(), Some(data.clone()));
        assert_eq!(load_json_or_default::<BTreeMap<String, u32>>(&path), data);

        fs::write(&path, "{ not json").unwrap();
        assert!(load_json::<BTreeMap<String, u32>>(&path).is_err());
        assert!(load_json_or_default::<BTreeMap<String, u32>>(&path).is_empty());
    }
}
