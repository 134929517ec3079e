//! Profile document: the persisted form of a target layout.
//!
//! ```json
//! {
//!   "spawnX": 0.0,
//!   "spawnY": 0.0,
//!   "targets": [
//!     { "id": 1, "x": 100.0, "y": 100.0, "key": "KeyA" },
//!     { "id": 2, "x": 300.0, "y": 150.0, "key": null }
//!   ]
//! }
//! ```
//!
//! Files written by older ClickMapper builds (`{"Pucks":[{"Id":1,"X":..,
//! "Y":..,"Key":"A"}]}`) decode through serde aliases. Their spawn point is
//! missing and defaults to the canvas origin.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::geometry::CanvasPoint;
use super::registry::MAX_TARGET_ID;
use super::target::{ClickTarget, TargetId};
use crate::keymap::Key;

/// Errors returned by [`decode_profile`] and [`encode_profile`].
#[derive(Debug, Error)]
pub enum ProfileFormatError {
    #[error("malformed profile document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("coordinate of {0} is not a finite number")]
    NonFinite(String),

    #[error("target id {0} is above the maximum of {max}", max = MAX_TARGET_ID)]
    IdOutOfRange(u32),
}

/// A complete layout: the spawn point plus every target.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Profile {
    pub spawn_position: CanvasPoint,
    pub targets: Vec<ClickTarget>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileDocument {
    #[serde(default, alias = "SpawnX")]
    spawn_x: f64,
    #[serde(default, alias = "SpawnY")]
    spawn_y: f64,
    #[serde(default, alias = "Pucks")]
    targets: Vec<TargetRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TargetRecord {
    #[serde(alias = "Id")]
    id: u32,
    #[serde(alias = "X")]
    x: f64,
    #[serde(alias = "Y")]
    y: f64,
    #[serde(default, alias = "Key")]
    key: Option<String>,
}

impl From<&ClickTarget> for TargetRecord {
    fn from(target: &ClickTarget) -> Self {
        Self {
            id: target.id.0,
            x: target.position.x,
            y: target.position.y,
            key: target.key.map(|k| k.name().to_string()),
        }
    }
}

impl TargetRecord {
    fn into_target(self) -> ClickTarget {
        let mut target = ClickTarget::new(TargetId(self.id), CanvasPoint::new(self.x, self.y));
        match self.key.as_deref().map(str::trim) {
            None | Some("") | Some("None") => {}
            Some(name) => match name.parse::<Key>() {
                Ok(key) => target.key = Some(key),
                Err(e) => warn!(target_id = self.id, "loading target without key: {e}"),
            },
        }
        target
    }
}

/// Serialises `profile` as pretty-printed JSON.
///
/// # Errors
///
/// [`ProfileFormatError::NonFinite`] if a coordinate is NaN or infinite.
pub fn encode_profile(profile: &Profile) -> Result<String, ProfileFormatError> {
    let finite = |p: CanvasPoint| p.x.is_finite() && p.y.is_finite();
    if !finite(profile.spawn_position) {
        return Err(ProfileFormatError::NonFinite("spawn point".to_string()));
    }
    if let Some(t) = profile.targets.iter().find(|t| !finite(t.position)) {
        return Err(ProfileFormatError::NonFinite(format!("target {}", t.id)));
    }
    let document = ProfileDocument {
        spawn_x: profile.spawn_position.x,
        spawn_y: profile.spawn_position.y,
        targets: profile.targets.iter().map(TargetRecord::from).collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parses a profile document, current or legacy.
///
/// A target whose key name is not recognised is kept without a key.
///
/// # Errors
///
/// [`ProfileFormatError::Json`] if the text is not a valid profile document,
/// [`ProfileFormatError::IdOutOfRange`] if a target id is above
/// [`MAX_TARGET_ID`].
pub fn decode_profile(text: &str) -> Result<Profile, ProfileFormatError> {
    let document: ProfileDocument = serde_json::from_str(text)?;
    if let Some(record) = document.targets.iter().find(|r| r.id > MAX_TARGET_ID) {
        return Err(ProfileFormatError::IdOutOfRange(record.id));
    }
    Ok(Profile {
        spawn_position: CanvasPoint::new(document.spawn_x, document.spawn_y),
        targets: document
            .targets
            .into_iter()
            .map(TargetRecord::into_target)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Profile {
        Profile {
            spawn_position: CanvasPoint::new(12.5, 40.0),
            targets: vec![
                ClickTarget::new(TargetId(1), CanvasPoint::new(100.0, 100.0)).with_key(Key::KeyA),
                ClickTarget::new(TargetId(2), CanvasPoint::new(300.25, 150.75)),
                ClickTarget::new(TargetId(5), CanvasPoint::new(-20.0, 0.0)).with_key(Key::NumpadEnter),
            ],
        }
    }

    #[test]
    fn test_encoded_profile_decodes_to_equal_profile() {
        // Arrange
        let profile = sample();

        // Act
        let text = encode_profile(&profile).unwrap();
        let decoded = decode_profile(&text).unwrap();

        // Assert
        assert_eq!(decoded, profile);
    }

    #[test]
    fn test_encoded_profile_uses_camel_case_fields_and_canonical_key_names() {
        let text = encode_profile(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["spawnX"], 12.5);
        assert_eq!(value["spawnY"], 40.0);
        assert_eq!(value["targets"][0]["key"], "KeyA");
        assert!(value["targets"][1]["key"].is_null());
        assert_eq!(value["targets"][2]["key"], "NumpadEnter");
    }

    #[test]
    fn test_legacy_document_decodes_with_default_spawn() {
        // Arrange
        let legacy = r#"{
          "Pucks": [
            { "Id": 3, "X": 100.5, "Y": 200, "Key": "D1" },
            { "Id": 4, "X": 50, "Y": 60, "Key": "" },
            { "Id": 7, "X": 0, "Y": 0, "Key": "NumPad9" }
          ]
        }"#;

        // Act
        let profile = decode_profile(legacy).unwrap();

        // Assert
        assert_eq!(profile.spawn_position, CanvasPoint::default());
        assert_eq!(profile.targets.len(), 3);
        assert_eq!(profile.targets[0].id, TargetId(3));
        assert_eq!(profile.targets[0].position, CanvasPoint::new(100.5, 200.0));
        assert_eq!(profile.targets[0].key, Some(Key::Digit1));
        assert_eq!(profile.targets[1].key, None);
        assert_eq!(profile.targets[2].key, Some(Key::Numpad9));
    }

    #[test]
    fn test_unknown_key_name_loads_target_without_key() {
        let text = r#"{"targets":[{"id":1,"x":1,"y":2,"key":"VolumeUp"}]}"#;

        let profile = decode_profile(text).unwrap();

        assert_eq!(profile.targets.len(), 1);
        assert_eq!(profile.targets[0].key, None);
    }

    #[test]
    fn test_missing_key_field_means_unassigned() {
        let text = r#"{"spawnX":5,"spawnY":6,"targets":[{"id":9,"x":1,"y":2}]}"#;

        let profile = decode_profile(text).unwrap();

        assert_eq!(profile.spawn_position, CanvasPoint::new(5.0, 6.0));
        assert_eq!(profile.targets[0].key, None);
    }

    #[test]
    fn test_empty_document_is_an_empty_profile() {
        assert_eq!(decode_profile("{}").unwrap(), Profile::default());
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        let cases = [
            "",
            "not json",
            r#"{"targets":[{"x":1,"y":2}]}"#,
            r#"{"targets":[{"id":"one","x":1,"y":2}]}"#,
            r#"{"targets":{"id":1}}"#,
        ];
        for bad in cases {
            assert!(decode_profile(bad).is_err(), "{bad:?} must not decode");
        }
    }

    #[test]
    fn test_non_finite_coordinate_fails_to_encode() {
        let profile = Profile {
            spawn_position: CanvasPoint::new(f64::NAN, 0.0),
            targets: Vec::new(),
        };

        assert!(matches!(
            encode_profile(&profile),
            Err(ProfileFormatError::NonFinite(_))
        ));
    }

    #[test]
    fn test_target_id_above_maximum_is_rejected() {
        // Arrange
        let text = r#"{"targets":[{"id":4294967295,"x":1,"y":1,"key":"KeyA"}]}"#;

        // Act
        let result = decode_profile(text);

        // Assert
        assert!(matches!(result, Err(ProfileFormatError::IdOutOfRange(u32::MAX))));
    }
}
