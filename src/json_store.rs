//! Flat JSON records persisted next to each other: loaded by overlaying the
//! file's keys on the built-in defaults, written back whole on every save.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Reads `path` and merges it over `T::default()`.
///
/// A missing, unreadable or malformed file yields the defaults; anything but
/// a missing file is logged. Keys that do not deserialize into their field
/// are dropped one by one so the remaining keys survive.
pub fn load_merged<T>(path: &Path) -> T
where
    T: Default + Serialize + DeserializeOwned,
{
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return T::default(),
        Err(err) => {
            log::warn!("Unable to read {}: {err}", path.display());
            return T::default();
        }
    };
    match merge_over_defaults(&raw) {
        Ok(record) => record,
        Err(err) => {
            log::warn!("Ignoring {}: {err:?}", path.display());
            T::default()
        }
    }
}

pub fn merge_over_defaults<T>(raw: &str) -> Result<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    let persisted: Value = serde_json::from_str(raw).context("Invalid JSON")?;
    let Value::Object(persisted) = persisted else {
        bail!("Expected a JSON object");
    };
    let mut merged = defaults_object::<T>()?;
    for (key, value) in persisted {
        let mut candidate = merged.clone();
        candidate.insert(key.clone(), value.clone());
        match serde_json::from_value::<T>(Value::Object(candidate)) {
            Ok(_) => {
                merged.insert(key, value);
            }
            Err(err) => log::warn!("Falling back to default for `{key}`: {err}"),
        }
    }
    serde_json::from_value(Value::Object(merged)).context("Merged record failed to deserialize")
}

fn defaults_object<T>() -> Result<Map<String, Value>>
where
    T: Default + Serialize,
{
    match serde_json::to_value(T::default()).context("Serialize defaults")? {
        Value::Object(map) => Ok(map),
        _ => bail!("Record defaults must serialize to a JSON object"),
    }
}

/// Pretty-prints `record` to `path`, creating the parent directory on demand.
pub fn save_pretty<T: Serialize>(record: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let data = serde_json::to_string_pretty(record).context("Serialize record")?;
    let temp = path.with_extension("tmp");
    fs::write(&temp, data).with_context(|| format!("Failed to write {}", temp.display()))?;
    fs::rename(&temp, path).with_context(|| format!("Failed to replace {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: i32,
        extra: Option<i32>,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                name: "default".into(),
                count: 3,
                extra: None,
            }
        }
    }

    #[test]
    fn missing_keys_take_defaults() {
        let merged: Sample = merge_over_defaults(r#"{"count": 9}"#).unwrap();
        assert_eq!(
            merged,
            Sample {
                name: "default".into(),
                count: 9,
                extra: None,
            }
        );
    }

    #[test]
    fn mistyped_key_is_dropped_alone() {
        let merged: Sample = merge_over_defaults(r#"{"name": "kept", "count": "nine"}"#).unwrap();
        assert_eq!(merged.name, "kept");
        assert_eq!(merged.count, 3);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let merged: Sample = merge_over_defaults(r#"{"legacy": true, "extra": 4}"#).unwrap();
        assert_eq!(merged.extra, Some(4));
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(merge_over_defaults::<Sample>("[1, 2]").is_err());
        assert!(merge_over_defaults::<Sample>("{not json").is_err());
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{{{").unwrap();
        assert_eq!(load_merged::<Sample>(&path), Sample::default());
        assert_eq!(
            load_merged::<Sample>(&dir.path().join("absent.json")),
            Sample::default()
        );
    }

    #[test]
    fn non_utf8_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.json");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();
        assert_eq!(load_merged::<Sample>(&path), Sample::default());
    }

    #[test]
    fn directory_in_place_of_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");
        fs::create_dir(&path).unwrap();
        assert_eq!(load_merged::<Sample>(&path), Sample::default());
    }

    #[test]
    fn save_creates_directory_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("record.json");
        let record = Sample {
            name: "saved".into(),
            count: 1,
            extra: Some(2),
        };
        save_pretty(&record, &path).unwrap();
        assert!(!path.with_extension("tmp").exists());
        assert_eq!(load_merged::<Sample>(&path), record);
    }
}
