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

//! Mouse device.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{DeviceKind, InputDevice};
use crate::input::graph::{ValueGraph, ValueId};
use crate::math::Vec2;

/// An engine-internal representation of a mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// The left mouse button.
    Left,
    /// The right mouse button.
    Right,
    /// The middle mouse button.
    Middle,
    /// The back mouse button (typically on the side).
    Back,
    /// The forward mouse button (typically on the side).
    Forward,
    /// Another mouse button, identified by a numeric code.
    Other(u16),
}

/// The analog channels of a mouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseAxis {
    /// Horizontal motion over the last frame.
    DeltaX,
    /// Vertical motion over the last frame.
    DeltaY,
    /// Horizontal wheel travel over the last frame.
    ScrollX,
    /// Vertical wheel travel over the last frame.
    ScrollY,
}

/// The mouse.
///
/// Buttons are written immediately. Motion and wheel travel are accumulated
/// and published once per frame by [`InputDevice::update`], so the delta
/// channels always describe exactly one frame.
#[derive(Debug)]
pub struct Mouse {
    buttons: HashMap<MouseButton, ValueId>,
    axes: HashMap<MouseAxis, ValueId>,
    pending_motion: Vec2,
    pending_scroll: Vec2,
    sensitivity: f32,
}

impl Default for Mouse {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Mouse {
    /// Creates a mouse whose motion is scaled by `sensitivity`.
    pub fn new(sensitivity: f32) -> Self {
        Self {
            buttons: HashMap::new(),
            axes: HashMap::new(),
            pending_motion: Vec2::ZERO,
            pending_scroll: Vec2::ZERO,
            sensitivity,
        }
    }

    /// Changes the motion scale applied on the next update.
    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
    }

    /// Returns the leaf of `button`, creating it on first use.
    pub fn button_value(&mut self, graph: &mut ValueGraph, button: MouseButton) -> ValueId {
        if let Some(id) = self.buttons.get(&button).filter(|id| graph.contains(**id)) {
            return *id;
        }
        let id = graph.create_leaf();
        self.buttons.insert(button, id);
        id
    }

    /// Returns the leaf of `axis`, creating it on first use.
    pub fn axis_value(&mut self, graph: &mut ValueGraph, axis: MouseAxis) -> ValueId {
        if let Some(id) = self.axes.get(&axis).filter(|id| graph.contains(**id)) {
            return *id;
        }
        let id = graph.create_leaf();
        self.axes.insert(axis, id);
        id
    }

    /// Writes the state of a button.
    pub fn set_button(&mut self, graph: &mut ValueGraph, button: MouseButton, down: bool) {
        let id = self.button_value(graph, button);
        let _ = graph.set_value(id, if down { 1.0 } else { 0.0 });
    }

    /// Adds cursor motion to the current frame.
    pub fn accumulate_motion(&mut self, delta: Vec2) {
        self.pending_motion += delta;
    }

    /// Adds wheel travel to the current frame.
    pub fn accumulate_scroll(&mut self, delta: Vec2) {
        self.pending_scroll += delta;
    }

    /// Motion accumulated since the last update, before scaling.
    pub fn pending_motion(&self) -> Vec2 {
        self.pending_motion
    }

    fn publish(&mut self, graph: &mut ValueGraph, axis: MouseAxis, value: f32) {
        // Channels nobody asked for are not materialised just to write zero.
        if value == 0.0 && !self.axes.contains_key(&axis) {
            return;
        }
        let id = self.axis_value(graph, axis);
        let _ = graph.set_value(id, value);
    }
}

impl InputDevice for Mouse {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Mouse
    }

    fn update(&mut self, _delta_seconds: f32, graph: &mut ValueGraph) {
        let motion = self.pending_motion * self.sensitivity;
        let scroll = self.pending_scroll;
        self.pending_motion = Vec2::ZERO;
        self.pending_scroll = Vec2::ZERO;

        self.publish(graph, MouseAxis::DeltaX, motion.x);
        self.publish(graph, MouseAxis::DeltaY, motion.y);
        self.publish(graph, MouseAxis::ScrollX, scroll.x);
        self.publish(graph, MouseAxis::ScrollY, scroll.y);
    }

    fn reset(&mut self, graph: &mut ValueGraph) {
        self.pending_motion = Vec2::ZERO;
        self.pending_scroll = Vec2::ZERO;
        for id in self.buttons.values().chain(self.axes.values()) {
            let _ = graph.set_value(*id, 0.0);
        }
    }
}
