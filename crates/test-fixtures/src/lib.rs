//! Test fixture loader and fake collaborators for DeepMemory integration tests.
//!
//! Provides typed deserialization of scenario JSON files plus substitutable
//! embedding, vector-index, and graph-store fakes for failure-path tests.

pub mod fakes;
pub mod scenario;

use serde::de::DeserializeOwned;
use std::path::PathBuf;

pub use scenario::{GraphFixture, Scenario};

/// Root directory of the fixture files.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("golden")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a fixture file as raw JSON Value.
pub fn load_fixture_value(relative_path: &str) -> serde_json::Value {
    load_fixture(relative_path)
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// List all JSON files in a fixture subdirectory, sorted by name.
pub fn list_fixtures(subdir: &str) -> Vec<PathBuf> {
    let dir = fixtures_root().join(subdir);
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("Failed to read directory {}: {}", dir.display(), e))
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            path.extension().is_some_and(|ext| ext == "json").then_some(path)
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_root_exists() {
        assert!(fixtures_root().exists(), "golden directory not found");
    }

    #[test]
    fn all_scenario_files_exist() {
        for f in [
            "scenarios/jordy_launch.json",
            "scenarios/contradiction.json",
        ] {
            assert!(fixture_exists(f), "Missing fixture: {}", f);
        }
        assert_eq!(list_fixtures("scenarios").len(), 2);
    }

    #[test]
    fn every_scenario_parses() {
        for path in list_fixtures("scenarios") {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            let scenario: Scenario = load_fixture(&format!("scenarios/{name}"));
            assert!(!scenario.query.is_empty(), "{name} has no query");
        }
    }
}
