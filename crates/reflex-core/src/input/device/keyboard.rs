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

//! Keyboard device.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DeviceKind, InputDevice};
use crate::input::graph::{ValueGraph, ValueId};

/// A physical key, identified by its backend-independent name (`"KeyA"`,
/// `"Space"`, `"ArrowLeft"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(String);

impl KeyCode {
    /// Creates a key code from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name of the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for KeyCode {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for KeyCode {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The keyboard: one leaf per key, `1.0` while held and `0.0` otherwise.
#[derive(Debug, Default)]
pub struct Keyboard {
    keys: HashMap<KeyCode, ValueId>,
}

impl Keyboard {
    /// Creates a keyboard with no known key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the leaf of `code`, creating it on first use.
    pub fn key_value(&mut self, graph: &mut ValueGraph, code: &KeyCode) -> ValueId {
        if let Some(id) = self.keys.get(code).filter(|id| graph.contains(**id)) {
            return *id;
        }
        let id = graph.create_leaf();
        self.keys.insert(code.clone(), id);
        id
    }

    /// The leaf of `code`, if the key was ever seen.
    pub fn find(&self, code: &KeyCode) -> Option<ValueId> {
        self.keys.get(code).copied()
    }

    /// Writes the state of a key. Repeated writes of the same state are free.
    pub fn set_key(&mut self, graph: &mut ValueGraph, code: &KeyCode, down: bool) {
        let id = self.key_value(graph, code);
        // The handle was just validated by `key_value`.
        let _ = graph.set_value(id, if down { 1.0 } else { 0.0 });
    }
}

impl InputDevice for Keyboard {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Keyboard
    }

    fn update(&mut self, _delta_seconds: f32, _graph: &mut ValueGraph) {
        // Keys are event driven; nothing accumulates between frames.
    }

    fn reset(&mut self, graph: &mut ValueGraph) {
        for id in self.keys.values() {
            let _ = graph.set_value(*id, 0.0);
        }
    }
}
