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

//! Defines the error type shared by every part of the input core.
//!
//! Errors fall into two families: configuration errors, raised while a map is
//! being authored or a binding document applied, and precondition violations,
//! raised when an aggregation is asked to resolve nothing. Runtime queries on
//! an already-built map never error; they fall back to neutral defaults.

use crate::input::ValueId;

/// A specialized `Result` type for input operations.
pub type Result<T> = std::result::Result<T, InputError>;

/// The error type for the input core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    /// A mapping was added to a node that cannot aggregate sources.
    #[error("input node {node:?} cannot receive mappings; only virtual values aggregate sources")]
    NotComposite {
        /// The node that rejected the mapping.
        node: ValueId,
    },
    /// No input value is registered under the given name.
    #[error("no input value is registered under '{0}'")]
    UnknownValue(String),
    /// No input axis is registered under the given name.
    #[error("no input axis is registered under '{0}'")]
    UnknownAxis(String),
    /// No input vector is registered under the given name.
    #[error("no input vector is registered under '{0}'")]
    UnknownVector(String),
    /// A gamepad slot outside of the supported range was referenced.
    #[error("gamepad slot {0} is out of range")]
    InvalidGamepad(u8),
    /// A handle referred to a node that was removed or never existed.
    #[error("stale or unknown input handle")]
    InvalidHandle,
    /// The mapping would make a node depend on its own output.
    #[error("mapping {mapped:?} into {node:?} would create a cycle")]
    CyclicMapping {
        /// The node receiving the mapping.
        node: ValueId,
        /// The node that was about to be watched.
        mapped: ValueId,
    },
    /// An axis binding declared no source on either polarity.
    #[error("axis '{0}' has no sources bound to either polarity")]
    EmptyAxis(String),
    /// Chord resolution was asked to aggregate an empty watch list.
    #[error("chord resolution over an empty watch list")]
    EmptyChord,
    /// A binding document could not be read or parsed.
    #[error("invalid input binding document: {0}")]
    Config(String),
}

impl InputError {
    /// Returns `true` for static authoring mistakes that should fail the
    /// configuration step.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, InputError::EmptyChord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_chord_is_a_precondition_violation() {
        assert!(!InputError::EmptyChord.is_configuration());
        assert!(InputError::UnknownAxis("MoveX".to_string()).is_configuration());
        assert!(InputError::Config("bad".to_string()).is_configuration());
    }

    #[test]
    fn test_messages_name_the_offending_entry() {
        let err = InputError::UnknownAxis("LookY".to_string());
        assert_eq!(err.to_string(), "no input axis is registered under 'LookY'");
        assert_eq!(
            InputError::InvalidGamepad(7).to_string(),
            "gamepad slot 7 is out of range"
        );
    }
}
