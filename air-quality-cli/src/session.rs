use air_quality_core::{PlaceInfo, PollutionReading};
use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// What the last successful lookup left behind, restored on the next run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub last_reading: Option<PollutionReading>,
    #[serde(default)]
    pub last_place: Option<PlaceInfo>,
    #[serde(default)]
    pub last_query: Option<String>,
}

impl Session {
    pub fn file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "air-quality", "airq")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(dirs.data_dir().join("session.json"))
    }

    /// Load the saved session. A missing or unreadable file yields an empty session.
    pub fn load() -> Self {
        match Self::file_path() {
            Ok(path) => Self::load_from(&path),
            Err(err) => {
                tracing::warn!(error = %err, "No session directory; starting fresh");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return Self::default(),
        };

        serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "Ignoring corrupt session file");
            Self::default()
        })
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize session")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write session file: {}", path.display()))?;

        Ok(())
    }

    /// Record a successful lookup. `query` is `None` for device-location lookups,
    /// which keep the previous free-text query.
    pub fn record(&mut self, place: PlaceInfo, reading: PollutionReading, query: Option<&str>) {
        self.last_place = Some(place);
        self.last_reading = Some(reading);
        if let Some(query) = query {
            self.last_query = Some(query.trim().to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use air_quality_core::Components;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("airq-session-test-{}-{name}", std::process::id()))
            .join("session.json")
    }

    fn place() -> PlaceInfo {
        PlaceInfo { name: "Bandung".into(), country: "ID".into(), lat: -6.9147, lon: 107.6098 }
    }

    fn reading() -> PollutionReading {
        PollutionReading {
            timestamp: 1_700_000_000,
            aqi_index: 2,
            components: Components { pm2_5: 14.2, pm10: 20.0, ..Components::default() },
        }
    }

    #[test]
    fn missing_file_is_empty_session() {
        let session = Session::load_from(Path::new("/nonexistent/airq/session.json"));
        assert_eq!(session, Session::default());
    }

    #[test]
    fn saved_session_is_restored() {
        let path = temp_path("roundtrip");
        let mut session = Session::default();
        session.record(place(), reading(), Some(" Bandung "));
        session.save_to(&path).expect("saves");

        let restored = Session::load_from(&path);
        assert_eq!(restored.last_place, Some(place()));
        assert_eq!(restored.last_reading, Some(reading()));
        assert_eq!(restored.last_query.as_deref(), Some("Bandung"));

        let _ = fs::remove_dir_all(path.parent().expect("has parent"));
    }

    #[test]
    fn corrupt_file_is_ignored() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().expect("has parent")).expect("mkdir");
        fs::write(&path, "{ not json").expect("write");

        assert_eq!(Session::load_from(&path), Session::default());

        let _ = fs::remove_dir_all(path.parent().expect("has parent"));
    }

    #[test]
    fn location_lookup_keeps_previous_query() {
        let mut session = Session::default();
        session.record(place(), reading(), Some("Bandung"));
        session.record(place(), reading(), None);
        assert_eq!(session.last_query.as_deref(), Some("Bandung"));
    }
}
