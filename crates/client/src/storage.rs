//! Cross-platform persistent storage for session state.
//!
//! Web builds use `localStorage`; desktop builds use JSON files under the
//! platform config directory (`~/.config/shopdash/` on Linux). Values are
//! read synchronously, which is what lets the realtime client consult the
//! auth token at send time without suspending.

use serde::{de::DeserializeOwned, Serialize};

/// Serialize and persist a value. Returns whether the write succeeded.
pub fn save<T: Serialize>(key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => save_raw(key, &json),
        Err(_) => false,
    }
}

/// Load and deserialize a value. `None` when the key is missing or the
/// stored payload no longer matches the expected shape.
pub fn load<T: DeserializeOwned>(key: &str) -> Option<T> {
    serde_json::from_str(&load_raw(key)?).ok()
}

/// Remove a stored value, if present.
pub fn remove(key: &str) {
    remove_raw(key);
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

#[cfg(target_arch = "wasm32")]
fn save_raw(key: &str, value: &str) -> bool {
    match local_storage() {
        Some(storage) => storage.set_item(key, value).is_ok(),
        None => false,
    }
}

#[cfg(target_arch = "wasm32")]
fn load_raw(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok()?
}

#[cfg(target_arch = "wasm32")]
fn remove_raw(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn storage_path(key: &str) -> Option<std::path::PathBuf> {
    let dir = dirs::config_dir()?.join("shopdash");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).ok()?;
    }
    // Keys are ours, but sanitize anyway so a key never escapes the dir.
    let safe_key = key.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_");
    Some(dir.join(format!("{safe_key}.json")))
}

#[cfg(not(target_arch = "wasm32"))]
fn save_raw(key: &str, value: &str) -> bool {
    match storage_path(key) {
        Some(path) => std::fs::write(path, value).is_ok(),
        None => false,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_raw(key: &str) -> Option<String> {
    std::fs::read_to_string(storage_path(key)?).ok()
}

#[cfg(not(target_arch = "wasm32"))]
fn remove_raw(key: &str) {
    if let Some(path) = storage_path(key) {
        let _ = std::fs::remove_file(path);
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn round_trips_and_removes() {
        let key = "storage_test_round_trip";
        assert!(save(key, &vec![1u32, 2, 3]));
        assert_eq!(load::<Vec<u32>>(key), Some(vec![1, 2, 3]));
        remove(key);
        assert_eq!(load::<Vec<u32>>(key), None);
    }

    #[test]
    fn shape_mismatch_loads_as_none() {
        let key = "storage_test_mismatch";
        assert!(save(key, &"just a string"));
        assert_eq!(load::<Vec<u32>>(key), None);
        remove(key);
    }
}
