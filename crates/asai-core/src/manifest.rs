//! The `prompt.json` system manifest.
//!
//! The file carries the persona given to the text model plus the welcome
//! message shown on the home page:
//!
//! ```json
//! {
//!   "ai_system_manifest": {
//!     "identity": "...",
//!     "initialization_protocol": { "message": "Hello! ..." }
//!   }
//! }
//! ```
//!
//! The whole `ai_system_manifest` object becomes the system instruction. The
//! app cannot run without it, so every failure here is fatal to the caller.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors while loading the prompt manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing or invalid field '{0}'")]
    MissingField(&'static str),
}

/// The loaded system manifest.
#[derive(Clone, Debug)]
pub struct PromptManifest {
    /// System instruction sent with every model call.
    pub system_instruction: String,
    /// Welcome message shown when a conversation starts.
    pub welcome_message: String,
}

impl PromptManifest {
    /// Load and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let raw: Value = serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let manifest = Self::from_value(&raw)?;
        debug!(
            path = %path.display(),
            instruction_len = manifest.system_instruction.len(),
            "loaded prompt manifest"
        );
        Ok(manifest)
    }

    /// Build a manifest from an already-parsed JSON document.
    pub fn from_value(raw: &Value) -> Result<Self, ManifestError> {
        let manifest = raw
            .get("ai_system_manifest")
            .filter(|m| m.is_object())
            .ok_or(ManifestError::MissingField("ai_system_manifest"))?;

        let welcome_message = manifest
            .get("initialization_protocol")
            .and_then(|p| p.get("message"))
            .and_then(Value::as_str)
            .ok_or(ManifestError::MissingField(
                "ai_system_manifest.initialization_protocol.message",
            ))?
            .to_string();

        let system_instruction = serde_json::to_string_pretty(manifest)
            .map_err(|_| ManifestError::MissingField("ai_system_manifest"))?;

        Ok(PromptManifest {
            system_instruction,
            welcome_message,
        })
    }
}

/// A starter manifest written by `asai onboard`.
pub const SAMPLE_MANIFEST: &str = r#"{
  "ai_system_manifest": {
    "identity": {
      "name": "Asai-Gen",
      "role": "Interior design consultant"
    },
    "behavior": [
      "Ask about the space, budget and style before proposing anything.",
      "When you present an idea, start the paragraph with 'Concept:' or 'Proposal:'.",
      "List finishes under a 'Materials:' heading."
    ],
    "initialization_protocol": {
      "message": "Hello! I'm Asai-Gen, your interior design consultant. Tell me about the space you want to transform."
    }
  }
}
"#;

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_from_value() {
        let raw = json!({
            "ai_system_manifest": {
                "identity": "Asai",
                "initialization_protocol": { "message": "¡Hola!" }
            }
        });

        let manifest = PromptManifest::from_value(&raw).unwrap();
        assert_eq!(manifest.welcome_message, "¡Hola!");
        assert!(manifest.system_instruction.contains("\"identity\": \"Asai\""));
        assert!(manifest.system_instruction.contains("initialization_protocol"));
    }

    #[test]
    fn test_missing_manifest_object() {
        let err = PromptManifest::from_value(&json!({"other": 1})).unwrap_err();
        assert!(matches!(err, ManifestError::MissingField("ai_system_manifest")));
    }

    #[test]
    fn test_manifest_must_be_object() {
        let err = PromptManifest::from_value(&json!({"ai_system_manifest": "text"})).unwrap_err();
        assert!(matches!(err, ManifestError::MissingField(_)));
    }

    #[test]
    fn test_missing_welcome_message() {
        let raw = json!({"ai_system_manifest": {"initialization_protocol": {}}});
        let err = PromptManifest::from_value(&raw).unwrap_err();
        assert!(err.to_string().contains("initialization_protocol.message"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = PromptManifest::load(Path::new("/nonexistent/prompt.json")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/prompt.json"));
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = PromptManifest::load(file.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn test_sample_manifest_is_valid() {
        let raw: Value = serde_json::from_str(SAMPLE_MANIFEST).unwrap();
        let manifest = PromptManifest::from_value(&raw).unwrap();
        assert!(manifest.welcome_message.starts_with("Hello!"));
    }
}
