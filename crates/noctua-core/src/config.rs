// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SDK configuration, read from the `noctuagg.json` file bundled with the
// host application.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NoctuaError, Result};

/// File name of the bundled configuration.
pub const CONFIG_FILE_NAME: &str = "noctuagg.json";

/// Locations searched under each root by [`NoctuaConfig::load_default`], in
/// order. The first is where Unity-style hosts place raw assets.
pub const CONFIG_SEARCH_PATHS: [&str; 2] = ["Data/Raw/noctuagg.json", "noctuagg.json"];

/// Event collector used when `trackerURL` is absent or empty.
pub const DEFAULT_TRACKER_URL: &str = "https://kafka-proxy-poc.noctuaprojects.com/api/v1/events";

/// Top-level configuration.
///
/// Sections for vendor attribution SDKs (`adjust`, `firebase`, `facebook`)
/// may appear in the same file; they belong to the host and are ignored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoctuaConfig {
    /// Client identifier issued by Noctua. Must be non-empty.
    pub client_id: String,
    #[serde(default)]
    pub game_id: Option<i64>,
    /// Settings for the built-in Noctua services. When absent, no event
    /// collector is wired and purchases are routed to the default store.
    #[serde(default)]
    pub noctua: Option<NoctuaServiceConfig>,
}

/// Settings for the built-in Noctua tracker and store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoctuaServiceConfig {
    /// Event collector endpoint.
    #[serde(default, rename = "trackerURL")]
    pub tracker_url: Option<String>,
    /// Reject every purchase attempt.
    #[serde(default)]
    pub iap_disabled: Option<bool>,
    /// Drop custom events before they reach any tracker.
    #[serde(default)]
    pub custom_event_disabled: Option<bool>,
}

impl NoctuaServiceConfig {
    /// Tracker URL with the default substituted for a missing or blank value.
    pub fn tracker_url(&self) -> &str {
        match self.tracker_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => DEFAULT_TRACKER_URL,
        }
    }
}

impl NoctuaConfig {
    /// Parse and validate a configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: NoctuaConfig =
            serde_json::from_str(json).map_err(|e| NoctuaError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file from an explicit path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => NoctuaError::ConfigNotFound,
            _ => NoctuaError::Io(e),
        })?;
        tracing::debug!(path = %path.display(), "loading Noctua config");
        Self::from_json_str(&raw)
    }

    /// Search [`CONFIG_SEARCH_PATHS`] under `base` and load the first hit.
    pub fn load_from_dir(base: impl AsRef<Path>) -> Result<Self> {
        let path = find_config(base.as_ref()).ok_or(NoctuaError::ConfigNotFound)?;
        Self::load(path)
    }

    /// Search each root in turn and load the first configuration found.
    pub fn load_from_dirs<I, P>(roots: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let path = roots
            .into_iter()
            .find_map(|root| find_config(root.as_ref()))
            .ok_or(NoctuaError::ConfigNotFound)?;
        Self::load(path)
    }

    /// Search the working directory, then the directory holding the running
    /// executable (the `.app` bundle on iOS).
    pub fn load_default() -> Result<Self> {
        Self::load_from_dirs(default_roots())
    }

    /// Whether purchases are disabled by configuration.
    pub fn iap_disabled(&self) -> bool {
        self.noctua
            .as_ref()
            .and_then(|n| n.iap_disabled)
            .unwrap_or(false)
    }

    /// Whether custom events are dropped by configuration.
    pub fn custom_event_disabled(&self) -> bool {
        self.noctua
            .as_ref()
            .and_then(|n| n.custom_event_disabled)
            .unwrap_or(false)
    }

    fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(NoctuaError::MissingKey("clientId".into()));
        }
        Ok(())
    }
}

fn default_roots() -> Vec<PathBuf> {
    let mut roots = vec![PathBuf::from(".")];
    match std::env::current_exe() {
        Ok(exe) => roots.extend(exe.parent().map(Path::to_path_buf)),
        Err(e) => tracing::debug!(error = %e, "executable path unavailable"),
    }
    roots
}

fn find_config(base: &Path) -> Option<PathBuf> {
    CONFIG_SEARCH_PATHS
        .iter()
        .map(|rel| base.join(rel))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let config = NoctuaConfig::from_json_str(r#"{"clientId":"abc"}"#).expect("parse");
        assert_eq!(config.client_id, "abc");
        assert!(config.noctua.is_none());
        assert!(!config.iap_disabled());
    }

    #[test]
    fn parses_service_section_and_ignores_vendor_sections() {
        let json = r#"{
            "clientId": "abc",
            "gameId": 42,
            "noctua": {
                "trackerURL": "https://collector.example/events",
                "iapDisabled": true,
                "customEventDisabled": false
            },
            "adjust": { "ios": { "appToken": "tok" } }
        }"#;
        let config = NoctuaConfig::from_json_str(json).expect("parse");
        assert_eq!(config.game_id, Some(42));
        let noctua = config.noctua.as_ref().expect("noctua section");
        assert_eq!(noctua.tracker_url(), "https://collector.example/events");
        assert!(config.iap_disabled());
        assert!(!config.custom_event_disabled());
    }

    #[test]
    fn blank_tracker_url_falls_back_to_default() {
        let section = NoctuaServiceConfig {
            tracker_url: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(section.tracker_url(), DEFAULT_TRACKER_URL);
        assert_eq!(NoctuaServiceConfig::default().tracker_url(), DEFAULT_TRACKER_URL);
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let err = NoctuaConfig::from_json_str(r#"{"clientId":""}"#).unwrap_err();
        assert!(matches!(err, NoctuaError::MissingKey(ref k) if k == "clientId"));
    }

    #[test]
    fn missing_client_id_is_invalid() {
        let err = NoctuaConfig::from_json_str(r#"{"gameId":1}"#).unwrap_err();
        assert!(matches!(err, NoctuaError::InvalidConfig(_)));
    }

    #[test]
    fn load_from_dir_prefers_raw_data_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("Data/Raw")).expect("mkdir");
        std::fs::write(dir.path().join("Data/Raw/noctuagg.json"), r#"{"clientId":"raw"}"#)
            .expect("write raw");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{"clientId":"root"}"#)
            .expect("write root");

        let config = NoctuaConfig::load_from_dir(dir.path()).expect("load");
        assert_eq!(config.client_id, "raw");
    }

    #[test]
    fn load_from_dir_without_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = NoctuaConfig::load_from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, NoctuaError::ConfigNotFound));
    }

    #[test]
    fn load_from_dirs_falls_through_to_bundle_dir() {
        let working = tempfile::tempdir().expect("tempdir");
        let bundle = tempfile::tempdir().expect("tempdir");
        std::fs::write(bundle.path().join(CONFIG_FILE_NAME), r#"{"clientId":"bundled"}"#)
            .expect("write bundle");

        let config =
            NoctuaConfig::load_from_dirs([working.path(), bundle.path()]).expect("load");
        assert_eq!(config.client_id, "bundled");

        let err = NoctuaConfig::load_from_dirs([working.path()]).unwrap_err();
        assert!(matches!(err, NoctuaError::ConfigNotFound));
    }

    #[test]
    fn default_roots_include_executable_dir() {
        let exe_dir = std::env::current_exe()
            .expect("current exe")
            .parent()
            .expect("exe dir")
            .to_path_buf();
        let roots = default_roots();
        assert_eq!(roots[0], PathBuf::from("."));
        assert!(roots.contains(&exe_dir));
    }
}
