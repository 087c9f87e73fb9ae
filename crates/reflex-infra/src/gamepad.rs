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

//! Gamepad backend built on `gilrs`.
//!
//! Controllers are given the lowest free slot when they connect and keep it
//! until they disconnect. Slots beyond
//! [`MAX_GAMEPADS`](reflex_core::input::MAX_GAMEPADS) are not tracked.

use gilrs::{Axis, Button, EventType, GamepadId, Gilrs};
use reflex_core::input::{GamepadAxis, GamepadButton, RawInput, MAX_GAMEPADS};

/// Assigns controller ids to a fixed number of slots.
#[derive(Debug, Clone)]
struct SlotTable<Id> {
    slots: Vec<Option<Id>>,
}

impl<Id: Copy + PartialEq> SlotTable<Id> {
    fn new(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    fn slot_of(&self, id: Id) -> Option<u8> {
        self.slots
            .iter()
            .position(|s| *s == Some(id))
            .map(|i| i as u8)
    }

    /// Returns the slot of `id`, claiming the lowest free one if needed.
    fn assign(&mut self, id: Id) -> Option<u8> {
        if let Some(slot) = self.slot_of(id) {
            return Some(slot);
        }
        let free = self.slots.iter().position(Option::is_none)?;
        self.slots[free] = Some(id);
        Some(free as u8)
    }

    fn release(&mut self, id: Id) -> Option<u8> {
        let slot = self.slot_of(id)?;
        self.slots[slot as usize] = None;
        Some(slot)
    }
}

/// Polls every connected controller and translates its events.
pub struct GilrsGamepads {
    gilrs: Option<Gilrs>,
    slots: SlotTable<GamepadId>,
}

impl GilrsGamepads {
    /// Opens the gamepad backend.
    ///
    /// A platform without gamepad support yields a backend that never
    /// reports anything.
    pub fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(g) => Some(g),
            Err(e) => {
                log::warn!("Failed to initialize gamepad support: {e}");
                None
            }
        };
        let mut gamepads = Self {
            gilrs,
            slots: SlotTable::new(MAX_GAMEPADS),
        };
        gamepads.claim_present();
        gamepads
    }

    /// Returns `true` if the backend initialised.
    pub fn is_available(&self) -> bool {
        self.gilrs.is_some()
    }

    // Controllers plugged in before startup never send `Connected`.
    fn claim_present(&mut self) {
        let Some(gilrs) = self.gilrs.as_ref() else {
            return;
        };
        for (id, pad) in gilrs.gamepads() {
            match self.slots.assign(id) {
                Some(slot) => log::info!("Gamepad '{}' assigned to slot {slot}.", pad.name()),
                None => log::warn!("No free slot for gamepad '{}'.", pad.name()),
            }
        }
    }

    /// Samples for every controller already present at startup.
    pub fn initial_samples(&self) -> Vec<RawInput> {
        self.slots
            .slots
            .iter()
            .enumerate()
            .filter(|(_, id)| id.is_some())
            .map(|(pad, _)| RawInput::GamepadConnected { pad: pad as u8 })
            .collect()
    }

    /// Drains pending controller events into raw samples.
    pub fn poll(&mut self) -> Vec<RawInput> {
        let mut samples = Vec::new();
        let Some(gilrs) = self.gilrs.as_mut() else {
            return samples;
        };
        while let Some(event) = gilrs.next_event() {
            let sample = match event.event {
                EventType::Connected => self.slots.assign(event.id).map(|pad| {
                    log::debug!("Gamepad connected: {:?} -> slot {pad}", event.id);
                    RawInput::GamepadConnected { pad }
                }),
                EventType::Disconnected => self.slots.release(event.id).map(|pad| {
                    log::debug!("Gamepad disconnected: {:?} from slot {pad}", event.id);
                    RawInput::GamepadDisconnected { pad }
                }),
                other => self
                    .slots
                    .slot_of(event.id)
                    .and_then(|pad| translate_event(pad, &other)),
            };
            samples.extend(sample);
        }
        samples
    }
}

impl Default for GilrsGamepads {
    fn default() -> Self {
        Self::new()
    }
}

/// Translates an input event of the controller in slot `pad`.
///
/// Button values come from `ButtonChanged`, which also covers analog
/// triggers; the digital pressed/released events would duplicate them.
fn translate_event(pad: u8, event: &EventType) -> Option<RawInput> {
    match *event {
        EventType::ButtonChanged(button, value, _) => {
            if let Some(axis) = trigger_axis(button) {
                return Some(RawInput::GamepadAxis { pad, axis, value });
            }
            map_button(button).map(|button| RawInput::GamepadButton { pad, button, value })
        }
        EventType::AxisChanged(axis, value, _) => {
            map_axis(axis).map(|axis| RawInput::GamepadAxis { pad, axis, value })
        }
        _ => None,
    }
}

/// (Internal) Analog triggers that `gilrs` reports as buttons.
fn trigger_axis(button: Button) -> Option<GamepadAxis> {
    match button {
        Button::LeftTrigger2 => Some(GamepadAxis::LeftTrigger),
        Button::RightTrigger2 => Some(GamepadAxis::RightTrigger),
        _ => None,
    }
}

fn map_button(button: Button) -> Option<GamepadButton> {
    Some(match button {
        Button::South => GamepadButton::South,
        Button::East => GamepadButton::East,
        Button::West => GamepadButton::West,
        Button::North => GamepadButton::North,
        Button::LeftTrigger => GamepadButton::LeftShoulder,
        Button::RightTrigger => GamepadButton::RightShoulder,
        Button::LeftThumb => GamepadButton::LeftThumb,
        Button::RightThumb => GamepadButton::RightThumb,
        Button::Start => GamepadButton::Start,
        Button::Select => GamepadButton::Select,
        Button::Mode => GamepadButton::Mode,
        Button::DPadUp => GamepadButton::DPadUp,
        Button::DPadDown => GamepadButton::DPadDown,
        Button::DPadLeft => GamepadButton::DPadLeft,
        Button::DPadRight => GamepadButton::DPadRight,
        _ => return None,
    })
}

fn map_axis(axis: Axis) -> Option<GamepadAxis> {
    Some(match axis {
        Axis::LeftStickX => GamepadAxis::LeftStickX,
        Axis::LeftStickY => GamepadAxis::LeftStickY,
        Axis::RightStickX => GamepadAxis::RightStickX,
        Axis::RightStickY => GamepadAxis::RightStickY,
        Axis::LeftZ => GamepadAxis::LeftTrigger,
        Axis::RightZ => GamepadAxis::RightTrigger,
        _ => return None,
    })
}
