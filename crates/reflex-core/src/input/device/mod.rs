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

//! The raw device layer.
//!
//! Each device owns one leaf of the [`ValueGraph`] per physical control it has
//! seen, created lazily the first time the control is written or bound.
//! Devices only ever write leaves; everything derived from them is settled by
//! the graph.

mod gamepad;
mod keyboard;
mod mouse;

use serde::{Deserialize, Serialize};

use super::graph::ValueGraph;

pub use self::gamepad::{
    apply_stick_deadzone, apply_trigger_deadzone, Gamepad, GamepadAxis, GamepadButton,
    DEFAULT_STICK_DEADZONE, DEFAULT_TRIGGER_DEADZONE, MAX_GAMEPADS,
};
pub use self::keyboard::{KeyCode, Keyboard};
pub use self::mouse::{Mouse, MouseAxis, MouseButton};

/// The hardware class of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// A keyboard.
    Keyboard,
    /// A mouse.
    Mouse,
    /// An XInput-style gamepad.
    Gamepad,
}

/// A physical input device polled once per frame.
pub trait InputDevice {
    /// The hardware class of the device.
    fn kind(&self) -> DeviceKind;

    /// Publishes whatever the device accumulated since the previous frame.
    fn update(&mut self, delta_seconds: f32, graph: &mut ValueGraph);

    /// Returns every control of the device to its rest value.
    fn reset(&mut self, graph: &mut ValueGraph);
}

/// Names any physical control the device layer knows about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputSource {
    /// A keyboard key.
    Key(KeyCode),
    /// A mouse button.
    MouseButton(MouseButton),
    /// A mouse motion or wheel channel.
    MouseAxis(MouseAxis),
    /// A button of the gamepad in slot `pad`.
    GamepadButton {
        /// The gamepad slot.
        pad: u8,
        /// The button.
        button: GamepadButton,
    },
    /// An analog channel of the gamepad in slot `pad`.
    GamepadAxis {
        /// The gamepad slot.
        pad: u8,
        /// The analog channel.
        axis: GamepadAxis,
    },
}

impl InputSource {
    /// The hardware class this source belongs to.
    pub fn device_kind(&self) -> DeviceKind {
        match self {
            InputSource::Key(_) => DeviceKind::Keyboard,
            InputSource::MouseButton(_) | InputSource::MouseAxis(_) => DeviceKind::Mouse,
            InputSource::GamepadButton { .. } | InputSource::GamepadAxis { .. } => {
                DeviceKind::Gamepad
            }
        }
    }
}
