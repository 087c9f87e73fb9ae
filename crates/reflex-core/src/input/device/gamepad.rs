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

//! XInput-style gamepad device.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{DeviceKind, InputDevice};
use crate::input::graph::{ValueGraph, ValueId};
use crate::math::Vec2;

/// Number of gamepad slots, matching the XInput user index range.
pub const MAX_GAMEPADS: usize = 4;

/// Default radial deadzone applied to both sticks.
pub const DEFAULT_STICK_DEADZONE: f32 = 0.24;

/// Default linear deadzone applied to both triggers.
pub const DEFAULT_TRIGGER_DEADZONE: f32 = 0.12;

/// The digital buttons of a gamepad, named by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamepadButton {
    /// Bottom face button (A on XInput pads).
    South,
    /// Right face button (B).
    East,
    /// Left face button (X).
    West,
    /// Top face button (Y).
    North,
    /// Left bumper.
    LeftShoulder,
    /// Right bumper.
    RightShoulder,
    /// Left stick click.
    LeftThumb,
    /// Right stick click.
    RightThumb,
    /// Start / menu button.
    Start,
    /// Back / view button.
    Select,
    /// Guide button.
    Mode,
    /// D-pad up.
    DPadUp,
    /// D-pad down.
    DPadDown,
    /// D-pad left.
    DPadLeft,
    /// D-pad right.
    DPadRight,
}

/// The analog channels of a gamepad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamepadAxis {
    /// Left stick, horizontal, `-1..=1`.
    LeftStickX,
    /// Left stick, vertical, `-1..=1`, up positive.
    LeftStickY,
    /// Right stick, horizontal, `-1..=1`.
    RightStickX,
    /// Right stick, vertical, `-1..=1`, up positive.
    RightStickY,
    /// Left trigger, `0..=1`.
    LeftTrigger,
    /// Right trigger, `0..=1`.
    RightTrigger,
}

impl GamepadAxis {
    /// For stick channels, the channel sharing the same stick.
    fn stick_partner(self) -> Option<(GamepadAxis, bool)> {
        match self {
            GamepadAxis::LeftStickX => Some((GamepadAxis::LeftStickY, true)),
            GamepadAxis::LeftStickY => Some((GamepadAxis::LeftStickX, false)),
            GamepadAxis::RightStickX => Some((GamepadAxis::RightStickY, true)),
            GamepadAxis::RightStickY => Some((GamepadAxis::RightStickX, false)),
            GamepadAxis::LeftTrigger | GamepadAxis::RightTrigger => None,
        }
    }
}

/// Applies a radial deadzone to a stick and rescales the remaining range so
/// output still spans `0..=1` in magnitude.
pub fn apply_stick_deadzone(stick: Vec2, deadzone: f32) -> Vec2 {
    let magnitude = stick.length();
    if magnitude <= deadzone {
        return Vec2::ZERO;
    }
    let scaled = ((magnitude - deadzone) / (1.0 - deadzone)).min(1.0);
    stick.normalize() * scaled
}

/// Applies a linear deadzone to a trigger and rescales the remaining range.
pub fn apply_trigger_deadzone(value: f32, deadzone: f32) -> f32 {
    if value <= deadzone {
        0.0
    } else {
        ((value - deadzone) / (1.0 - deadzone)).min(1.0)
    }
}

/// A gamepad occupying one slot.
///
/// Buttons publish `0.0` / `1.0` (or the analog pressure when the backend
/// reports one). Sticks publish the deadzone-filtered position, triggers the
/// deadzone-filtered pull.
#[derive(Debug)]
pub struct Gamepad {
    slot: u8,
    connected: bool,
    buttons: HashMap<GamepadButton, ValueId>,
    axes: HashMap<GamepadAxis, ValueId>,
    raw_axes: HashMap<GamepadAxis, f32>,
    stick_deadzone: f32,
    trigger_deadzone: f32,
    needs_reset: bool,
}

impl Gamepad {
    /// Creates a disconnected gamepad for `slot`.
    pub fn new(slot: u8) -> Self {
        Self {
            slot,
            connected: false,
            buttons: HashMap::new(),
            axes: HashMap::new(),
            raw_axes: HashMap::new(),
            stick_deadzone: DEFAULT_STICK_DEADZONE,
            trigger_deadzone: DEFAULT_TRIGGER_DEADZONE,
            needs_reset: false,
        }
    }

    /// The slot of this gamepad.
    pub fn slot(&self) -> u8 {
        self.slot
    }

    /// Returns `true` while a controller occupies the slot.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Changes the stick and trigger deadzones.
    pub fn set_deadzones(&mut self, stick: f32, trigger: f32) {
        self.stick_deadzone = stick;
        self.trigger_deadzone = trigger;
    }

    /// Marks the slot as occupied.
    pub fn connect(&mut self) {
        if !self.connected {
            log::info!("Gamepad connected in slot {}.", self.slot);
        }
        self.connected = true;
        self.needs_reset = false;
    }

    /// Marks the slot as free. Held controls are released on the next update.
    pub fn disconnect(&mut self) {
        if self.connected {
            log::info!("Gamepad disconnected from slot {}.", self.slot);
            self.needs_reset = true;
        }
        self.connected = false;
    }

    /// Returns the leaf of `button`, creating it on first use.
    pub fn button_value(&mut self, graph: &mut ValueGraph, button: GamepadButton) -> ValueId {
        if let Some(id) = self.buttons.get(&button).filter(|id| graph.contains(**id)) {
            return *id;
        }
        let id = graph.create_leaf();
        self.buttons.insert(button, id);
        id
    }

    /// Returns the leaf of `axis`, creating it on first use.
    pub fn axis_value(&mut self, graph: &mut ValueGraph, axis: GamepadAxis) -> ValueId {
        if let Some(id) = self.axes.get(&axis).filter(|id| graph.contains(**id)) {
            return *id;
        }
        let id = graph.create_leaf();
        self.axes.insert(axis, id);
        id
    }

    /// Writes a button, `value` being `0.0..=1.0`.
    pub fn set_button(&mut self, graph: &mut ValueGraph, button: GamepadButton, value: f32) {
        let id = self.button_value(graph, button);
        let _ = graph.set_value(id, value.clamp(0.0, 1.0));
    }

    /// Writes the raw position of an analog channel.
    ///
    /// Stick channels are filtered together with their partner channel, so
    /// moving one component may also rewrite the other.
    pub fn set_axis(&mut self, graph: &mut ValueGraph, axis: GamepadAxis, raw: f32) {
        self.raw_axes.insert(axis, raw);
        match axis.stick_partner() {
            Some((partner, axis_is_x)) => {
                let other = self.raw_axes.get(&partner).copied().unwrap_or(0.0);
                let stick = if axis_is_x {
                    Vec2::new(raw, other)
                } else {
                    Vec2::new(other, raw)
                };
                let filtered = apply_stick_deadzone(stick, self.stick_deadzone);
                let (x_axis, y_axis) = if axis_is_x {
                    (axis, partner)
                } else {
                    (partner, axis)
                };
                let x = self.axis_value(graph, x_axis);
                let y = self.axis_value(graph, y_axis);
                let _ = graph.set_value(x, filtered.x);
                let _ = graph.set_value(y, filtered.y);
            }
            None => {
                let id = self.axis_value(graph, axis);
                let _ = graph.set_value(id, apply_trigger_deadzone(raw, self.trigger_deadzone));
            }
        }
    }
}

impl InputDevice for Gamepad {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Gamepad
    }

    fn update(&mut self, _delta_seconds: f32, graph: &mut ValueGraph) {
        if self.needs_reset {
            self.reset(graph);
        }
    }

    fn reset(&mut self, graph: &mut ValueGraph) {
        self.needs_reset = false;
        self.raw_axes.clear();
        for id in self.buttons.values().chain(self.axes.values()) {
            let _ = graph.set_value(*id, 0.0);
        }
    }
}
