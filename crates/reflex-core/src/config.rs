// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Device settings and declarative bindings.
//!
//! Bindings can be written by hand in RON or JSON and applied to an
//! [`InputSystem`](crate::InputSystem) with
//! [`apply_bindings`](crate::InputSystem::apply_bindings).
//!
//! ```ron
//! (
//!     config: Some((mouse_sensitivity: 0.5)),
//!     values: [(name: "Jump", sources: [Input(Key("Space"))])],
//!     axes: [
//!         (
//!             name: "MoveX",
//!             positive: [Input(Key("KeyD"))],
//!             negative: [Input(Key("KeyA"))],
//!         ),
//!         (
//!             name: "LookX",
//!             mode: MaxAbs,
//!             positive: [Input(MouseAxis(DeltaX))],
//!         ),
//!     ],
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{InputError, Result};
use crate::input::device::{DEFAULT_STICK_DEADZONE, DEFAULT_TRIGGER_DEADZONE};
use crate::input::{ChordResolution, InputSource, DEFAULT_DEADZONE};
use crate::math::Vec2;

/// Device and frame settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Deadzone given to values declared by bindings without their own.
    pub default_deadzone: f32,
    /// Radial deadzone applied to both analog sticks.
    pub stick_deadzone: f32,
    /// Deadzone applied to analog triggers.
    pub trigger_deadzone: f32,
    /// Multiplier applied to mouse motion before it is published.
    pub mouse_sensitivity: f32,
    /// Start with the cursor captured for camera look.
    pub capture_mouse: bool,
    /// Window point the captured cursor is warped back to.
    pub recenter_anchor: Vec2,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            default_deadzone: DEFAULT_DEADZONE,
            stick_deadzone: DEFAULT_STICK_DEADZONE,
            trigger_deadzone: DEFAULT_TRIGGER_DEADZONE,
            mouse_sensitivity: 1.0,
            capture_mouse: false,
            recenter_anchor: Vec2::ZERO,
        }
    }
}

/// Where a binding reads its value from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BindingSource {
    /// A physical control.
    Input(InputSource),
    /// A value or axis declared earlier by name.
    Named(String),
}

/// A named value fed by one or more sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueBinding {
    /// Name the value is queried by.
    pub name: String,
    /// How simultaneous sources combine.
    #[serde(default)]
    pub mode: ChordResolution,
    /// Press threshold. Falls back to [`InputConfig::default_deadzone`].
    #[serde(default)]
    pub deadzone: Option<f32>,
    /// Sources feeding the value.
    #[serde(default)]
    pub sources: Vec<BindingSource>,
}

/// A named bipolar axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisBinding {
    /// Name the axis is queried by.
    pub name: String,
    /// How simultaneous sources on the same side combine. Signed analog
    /// sources such as mouse deltas or sticks need
    /// [`ChordResolution::MaxAbs`].
    #[serde(default)]
    pub mode: ChordResolution,
    /// Sources pushing the axis towards `+1`.
    #[serde(default)]
    pub positive: Vec<BindingSource>,
    /// Sources pushing the axis towards `-1`.
    #[serde(default)]
    pub negative: Vec<BindingSource>,
}

/// A named two-dimensional vector over two axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorBinding {
    /// Name the vector is queried by.
    pub name: String,
    /// Axis providing the x component.
    pub x: String,
    /// Axis providing the y component.
    pub y: String,
}

/// A complete binding document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputBindings {
    /// Device settings. Documents without them leave the active settings alone.
    pub config: Option<InputConfig>,
    /// Value declarations, applied first.
    pub values: Vec<ValueBinding>,
    /// Axis declarations, applied after values.
    pub axes: Vec<AxisBinding>,
    /// Vector declarations, applied last.
    pub vectors: Vec<VectorBinding>,
}

impl InputBindings {
    /// Parses a RON document.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| InputError::Config(e.to_string()))
    }

    /// Parses a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| InputError::Config(e.to_string()))
    }

    /// Loads a document from disk. `.json` files are read as JSON, anything
    /// else as RON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading input bindings from {}.", path.display());
        let text = std::fs::read_to_string(path)
            .map_err(|e| InputError::Config(format!("{}: {e}", path.display())))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_ron_str(&text),
        }
    }

    /// Serializes the document as pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| InputError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, MouseAxis};
    use crate::InputSystem;

    const BINDINGS: &str = r#"(
        config: Some((mouse_sensitivity: 0.5)),
        values: [
            (name: "Jump", sources: [Input(Key("Space")), Input(GamepadButton(pad: 0, button: South))]),
        ],
        axes: [
            (name: "MoveX", positive: [Input(Key("KeyD"))], negative: [Input(Key("KeyA"))]),
            (name: "MoveY", positive: [Input(Key("KeyW"))], negative: [Input(Key("KeyS"))]),
            (name: "LookX", mode: MaxAbs, positive: [Input(MouseAxis(DeltaX))]),
        ],
        vectors: [(name: "Move", x: "MoveX", y: "MoveY")],
    )"#;

    #[test]
    fn test_ron_document_parses() {
        let bindings = InputBindings::from_ron_str(BINDINGS).unwrap();
        let config = bindings.config.as_ref().unwrap();
        assert_eq!(config.mouse_sensitivity, 0.5);
        assert_eq!(config.stick_deadzone, DEFAULT_STICK_DEADZONE);
        assert_eq!(bindings.axes[0].mode, ChordResolution::Max);
        assert_eq!(bindings.axes[2].mode, ChordResolution::MaxAbs);
        assert_eq!(bindings.values[0].mode, ChordResolution::Max);
        assert_eq!(bindings.values[0].deadzone, None);
        assert_eq!(
            bindings.axes[2].positive,
            vec![BindingSource::Input(InputSource::MouseAxis(MouseAxis::DeltaX))]
        );
    }

    #[test]
    fn test_json_document_parses() {
        let json = r#"{
            "values": [{"name": "Fire", "mode": "MaxAbs", "deadzone": 0.3,
                        "sources": [{"Input": {"Key": "KeyF"}}]}]
        }"#;
        let bindings = InputBindings::from_json_str(json).unwrap();
        assert_eq!(bindings.values[0].mode, ChordResolution::MaxAbs);
        assert_eq!(bindings.values[0].deadzone, Some(0.3));
        assert_eq!(bindings.config, None);
    }

    #[test]
    fn test_malformed_document_is_a_config_error() {
        let err = InputBindings::from_ron_str("(values: [").unwrap_err();
        assert!(matches!(err, InputError::Config(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_ron_output_reparses() {
        let bindings = InputBindings::from_ron_str(BINDINGS).unwrap();
        let text = bindings.to_ron_string().unwrap();
        assert_eq!(InputBindings::from_ron_str(&text).unwrap(), bindings);
    }

    #[test]
    fn test_apply_builds_the_map() {
        let mut input = InputSystem::default();
        input
            .apply_bindings(&InputBindings::from_ron_str(BINDINGS).unwrap())
            .unwrap();
        assert_eq!(input.config().mouse_sensitivity, 0.5);

        input.set_key_down_status(KeyCode::from("KeyW"), true);
        input.set_key_down_status(KeyCode::from("KeyA"), true);
        assert_eq!(input.map().get_vector("Move"), Vec2::new(-1.0, 1.0));
        assert!(!input.map().is_down("Jump"));
    }

    #[test]
    fn test_apply_rejects_empty_axes_and_unknown_names() {
        let mut input = InputSystem::default();
        let empty = InputBindings {
            axes: vec![AxisBinding {
                name: "Dead".into(),
                mode: ChordResolution::Max,
                positive: vec![],
                negative: vec![],
            }],
            ..Default::default()
        };
        assert_eq!(
            input.apply_bindings(&empty),
            Err(InputError::EmptyAxis("Dead".into()))
        );

        let dangling = InputBindings {
            vectors: vec![VectorBinding {
                name: "Look".into(),
                x: "LookX".into(),
                y: "LookY".into(),
            }],
            ..Default::default()
        };
        assert_eq!(
            input.apply_bindings(&dangling),
            Err(InputError::UnknownAxis("LookX".into()))
        );

        let named = InputBindings {
            values: vec![ValueBinding {
                name: "Use".into(),
                mode: ChordResolution::Max,
                deadzone: None,
                sources: vec![BindingSource::Named("Missing".into())],
            }],
            ..Default::default()
        };
        assert_eq!(
            input.apply_bindings(&named),
            Err(InputError::UnknownValue("Missing".into()))
        );
        assert_eq!(input.map().names().count(), 0);
    }

    #[test]
    fn test_failed_document_leaves_no_entries_behind() {
        let mut input = InputSystem::default();
        let bindings = InputBindings::from_ron_str(
            r#"(
                values: [(name: "Jump", sources: [Input(Key("Space"))])],
                axes: [(
                    name: "MoveX",
                    positive: [Input(Key("KeyD"))],
                    negative: [Named("Missing")],
                )],
            )"#,
        )
        .unwrap();

        assert_eq!(
            input.apply_bindings(&bindings),
            Err(InputError::UnknownValue("Missing".into()))
        );
        assert_eq!(input.map().names().count(), 0);

        input.set_key_down_status(KeyCode::from("KeyD"), true);
        input.set_key_down_status(KeyCode::from("Space"), true);
        assert_eq!(input.map().get_value("MoveX"), 0.0);
        assert!(!input.map().is_down("Jump"));
    }

    #[test]
    fn test_failed_document_restores_existing_entries() {
        let mut input = InputSystem::default();
        input
            .apply_bindings(&InputBindings::from_ron_str(BINDINGS).unwrap())
            .unwrap();
        let jump = input.map().value_id("Jump").unwrap();
        let deadzone = input.graph().state(jump).unwrap().deadzone;

        // Extends existing entries, then trips over a dangling vector.
        let extension = InputBindings::from_ron_str(
            r#"(
                values: [(name: "Jump", deadzone: Some(0.9), sources: [Input(Key("KeyJ"))])],
                axes: [(name: "MoveX", positive: [Input(Key("ArrowRight"))])],
                vectors: [(name: "Look", x: "LookX", y: "LookY")],
            )"#,
        )
        .unwrap();
        assert_eq!(
            input.apply_bindings(&extension),
            Err(InputError::UnknownAxis("LookY".into()))
        );

        assert_eq!(input.graph().state(jump).unwrap().deadzone, deadzone);
        assert!(input.map().vector_id("Look").is_none());
        input.set_key_down_status(KeyCode::from("KeyJ"), true);
        input.set_key_down_status(KeyCode::from("ArrowRight"), true);
        assert!(!input.map().is_down("Jump"));
        assert_eq!(input.map().get_value("MoveX"), 0.0);

        // The original bindings still work.
        input.set_key_down_status(KeyCode::from("Space"), true);
        input.set_key_down_status(KeyCode::from("KeyD"), true);
        assert!(input.map().is_down("Jump"));
        assert_eq!(input.map().get_value("MoveX"), 1.0);
    }

    #[test]
    fn test_document_without_config_keeps_active_settings() {
        let mut input = InputSystem::new(InputConfig {
            mouse_sensitivity: 3.0,
            ..Default::default()
        });
        let bindings = InputBindings::from_ron_str(
            r#"(values: [(name: "Jump", sources: [Input(Key("Space"))])])"#,
        )
        .unwrap();
        input.apply_bindings(&bindings).unwrap();
        assert_eq!(input.config().mouse_sensitivity, 3.0);

        input
            .apply_bindings(&InputBindings::from_ron_str(BINDINGS).unwrap())
            .unwrap();
        assert_eq!(input.config().mouse_sensitivity, 0.5);
    }

    #[test]
    fn test_rejected_document_keeps_active_settings() {
        let mut input = InputSystem::new(InputConfig {
            mouse_sensitivity: 3.0,
            ..Default::default()
        });
        let bindings = InputBindings::from_ron_str(
            r#"(
                config: Some((mouse_sensitivity: 0.5)),
                vectors: [(name: "Look", x: "LookX", y: "LookY")],
            )"#,
        )
        .unwrap();
        assert!(input.apply_bindings(&bindings).is_err());
        assert_eq!(input.config().mouse_sensitivity, 3.0);
    }
}
