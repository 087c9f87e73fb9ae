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

//! The frame coordinator.
//!
//! [`InputSystem`] owns the devices and the input map, routes raw samples to
//! them, tracks per-key press/release frames and advances the frame counter
//! that every "just pressed" query is measured against.
//!
//! A frame looks like this on the owning thread:
//!
//! ```text
//! apply()/pump() samples  ->  update(dt)  ->  game logic queries  ->  advance_frame_number()
//! ```

use std::collections::HashMap;
use std::hash::Hash;

use super::device::{
    Gamepad, InputDevice, InputSource, KeyCode, Keyboard, Mouse, MouseButton, MAX_GAMEPADS,
};
use super::graph::{ValueGraph, ValueId};
use super::map::{InputMap, Polarity};
use super::queue::{InputQueue, RawInput};
use crate::config::{BindingSource, InputBindings, InputConfig};
use crate::error::{InputError, Result};
use crate::math::Vec2;

/// Up/down state of a key or button together with the frame of its last
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    /// Whether the button is currently held.
    pub is_down: bool,
    /// Frame on which `is_down` last flipped.
    pub frame_last_changed: u64,
}

/// The platform services needed to sample and warp the system cursor.
pub trait CursorPlatform {
    /// Returns `true` if the window owning the cursor has focus.
    fn is_focused(&self) -> bool;

    /// The cursor position in window coordinates, if known.
    fn cursor_position(&self) -> Option<Vec2>;

    /// Moves the system cursor to `position`, in window coordinates.
    fn set_cursor_position(&mut self, position: Vec2);
}

/// Records a transition in `states`. Returns `true` if the state flipped.
///
/// A button that was never seen counts as up, so a first "up" report does
/// not create an entry and cannot look like a fresh release.
fn transition<K: Eq + Hash>(
    states: &mut HashMap<K, ButtonState>,
    key: K,
    down: bool,
    frame: u64,
) -> bool {
    match states.get_mut(&key) {
        Some(state) if state.is_down == down => false,
        Some(state) => {
            state.is_down = down;
            state.frame_last_changed = frame;
            true
        }
        None if down => {
            states.insert(
                key,
                ButtonState {
                    is_down: true,
                    frame_last_changed: frame,
                },
            );
            true
        }
        None => false,
    }
}

/// A change made while applying a binding document.
#[derive(Debug)]
enum BindingUndo {
    Value(String),
    Axis(String),
    Vector(String),
    Mapping { target: ValueId, source: ValueId },
    Deadzone { node: ValueId, deadzone: f32 },
}

/// Owns the input devices, the input map and the frame counter.
#[derive(Debug)]
pub struct InputSystem {
    map: InputMap,
    keyboard: Keyboard,
    mouse: Mouse,
    gamepads: Vec<Gamepad>,
    key_states: HashMap<KeyCode, ButtonState>,
    mouse_states: HashMap<MouseButton, ButtonState>,
    scroll: Vec2,
    last_character: Option<char>,
    cursor_position: Option<Vec2>,
    last_sampled: Option<Vec2>,
    capture_mouse: bool,
    recenter_pending: bool,
    recenter_anchor: Vec2,
    focused: bool,
    queue: InputQueue,
    config: InputConfig,
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}

impl InputSystem {
    /// Creates an input system at frame zero with an empty map.
    pub fn new(config: InputConfig) -> Self {
        log::info!("Initializing input system.");
        let mut system = Self {
            map: InputMap::new(),
            keyboard: Keyboard::new(),
            mouse: Mouse::new(config.mouse_sensitivity),
            gamepads: (0..MAX_GAMEPADS as u8).map(Gamepad::new).collect(),
            key_states: HashMap::new(),
            mouse_states: HashMap::new(),
            scroll: Vec2::ZERO,
            last_character: None,
            cursor_position: None,
            last_sampled: None,
            capture_mouse: false,
            recenter_pending: false,
            recenter_anchor: Vec2::ZERO,
            focused: true,
            queue: InputQueue::new(),
            config: InputConfig::default(),
        };
        system.set_config(config);
        system
    }

    /// Applies device settings from `config`.
    pub fn set_config(&mut self, config: InputConfig) {
        self.mouse.set_sensitivity(config.mouse_sensitivity);
        for pad in &mut self.gamepads {
            pad.set_deadzones(config.stick_deadzone, config.trigger_deadzone);
        }
        self.recenter_anchor = config.recenter_anchor;
        self.set_mouse_capture(config.capture_mouse);
        self.config = config;
    }

    /// The active device settings.
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// The input map.
    pub fn map(&self) -> &InputMap {
        &self.map
    }

    /// Mutable access to the input map.
    pub fn map_mut(&mut self) -> &mut InputMap {
        &mut self.map
    }

    /// The value graph shared by the devices and the map.
    pub fn graph(&self) -> &ValueGraph {
        self.map.graph()
    }

    /// The keyboard device.
    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    /// The mouse device.
    pub fn mouse(&self) -> &Mouse {
        &self.mouse
    }

    /// The gamepad in `slot`, if the slot exists.
    pub fn gamepad(&self, slot: u8) -> Option<&Gamepad> {
        self.gamepads.get(slot as usize)
    }

    // --- Frame bookkeeping ---

    /// The current frame.
    pub fn frame_number(&self) -> u64 {
        self.map.graph().frame()
    }

    /// Ends the current frame.
    ///
    /// Must run exactly once per tick, after sampling and game logic, so that
    /// every "just" query made during the tick sees the same frame.
    pub fn advance_frame_number(&mut self) {
        let frame = self.frame_number() + 1;
        self.map.graph_mut().set_frame(frame);
        self.scroll = Vec2::ZERO;
        self.last_character = None;
        log::trace!("Input frame advanced to {frame}.");
    }

    // --- Keys and buttons ---

    /// Records the state of a key and writes the keyboard leaf.
    ///
    /// Repeated reports of the held state (auto-repeat) keep the frame of the
    /// original press.
    pub fn set_key_down_status(&mut self, code: KeyCode, down: bool) {
        let frame = self.frame_number();
        self.keyboard.set_key(self.map.graph_mut(), &code, down);
        if transition(&mut self.key_states, code, down, frame) {
            log::trace!("Key state changed on frame {frame}.");
        }
    }

    /// Records the state of a mouse button and writes the mouse leaf.
    pub fn set_mouse_down_status(&mut self, button: MouseButton, down: bool) {
        let frame = self.frame_number();
        self.mouse.set_button(self.map.graph_mut(), button, down);
        transition(&mut self.mouse_states, button, down, frame);
    }

    /// The tracked state of a key, if it was ever pressed.
    pub fn key_state(&self, code: &KeyCode) -> Option<ButtonState> {
        self.key_states.get(code).copied()
    }

    /// `true` while the key is held.
    pub fn is_key_down(&self, code: &KeyCode) -> bool {
        self.key_states.get(code).is_some_and(|s| s.is_down)
    }

    /// `true` while the key is not held.
    pub fn is_key_up(&self, code: &KeyCode) -> bool {
        !self.is_key_down(code)
    }

    /// `true` if the key went down during the current frame.
    pub fn was_key_just_pressed(&self, code: &KeyCode) -> bool {
        let frame = self.frame_number();
        self.key_states
            .get(code)
            .is_some_and(|s| s.is_down && s.frame_last_changed == frame)
    }

    /// `true` if the key went up during the current frame.
    pub fn was_key_just_released(&self, code: &KeyCode) -> bool {
        let frame = self.frame_number();
        self.key_states
            .get(code)
            .is_some_and(|s| !s.is_down && s.frame_last_changed == frame)
    }

    /// `true` while the button is held.
    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_states.get(&button).is_some_and(|s| s.is_down)
    }

    /// `true` while the button is not held.
    pub fn is_mouse_up(&self, button: MouseButton) -> bool {
        !self.is_mouse_down(button)
    }

    /// `true` if the button went down during the current frame.
    pub fn was_mouse_just_pressed(&self, button: MouseButton) -> bool {
        let frame = self.frame_number();
        self.mouse_states
            .get(&button)
            .is_some_and(|s| s.is_down && s.frame_last_changed == frame)
    }

    /// `true` if the button went up during the current frame.
    pub fn was_mouse_just_released(&self, button: MouseButton) -> bool {
        let frame = self.frame_number();
        self.mouse_states
            .get(&button)
            .is_some_and(|s| !s.is_down && s.frame_last_changed == frame)
    }

    /// Releases every held key and mouse button.
    pub fn release_all(&mut self) {
        let keys: Vec<KeyCode> = self
            .key_states
            .iter()
            .filter(|(_, s)| s.is_down)
            .map(|(k, _)| k.clone())
            .collect();
        for key in keys {
            self.set_key_down_status(key, false);
        }
        let buttons: Vec<MouseButton> = self
            .mouse_states
            .iter()
            .filter(|(_, s)| s.is_down)
            .map(|(b, _)| *b)
            .collect();
        for button in buttons {
            self.set_mouse_down_status(button, false);
        }
    }

    // --- Per-frame transients ---

    /// Wheel travel accumulated during the current frame.
    pub fn scroll_amount(&self) -> Vec2 {
        self.scroll
    }

    /// The last character typed during the current frame.
    pub fn last_character(&self) -> Option<char> {
        self.last_character
    }

    /// The last known cursor position.
    pub fn cursor_position(&self) -> Option<Vec2> {
        self.cursor_position
    }

    /// Whether the window had focus at the last update.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    // --- Mouse capture ---

    /// Enables or disables camera-look capture.
    ///
    /// While capture is on, each update measures the cursor against the
    /// recenter anchor and warps it back there.
    pub fn set_mouse_capture(&mut self, capture: bool) {
        if capture && !self.capture_mouse {
            self.recenter_pending = true;
        }
        self.capture_mouse = capture;
        self.last_sampled = None;
    }

    /// Returns `true` while capture is on.
    pub fn is_mouse_captured(&self) -> bool {
        self.capture_mouse
    }

    /// Moves the point the cursor is warped back to while captured.
    pub fn set_recenter_anchor(&mut self, anchor: Vec2) {
        self.recenter_anchor = anchor;
    }

    // --- Sampling ---

    /// Samples the cursor, forwards the frame's motion to the mouse and runs
    /// every device update.
    pub fn update(&mut self, delta_seconds: f32, platform: &mut dyn CursorPlatform) {
        self.focused = platform.is_focused();
        if self.focused {
            self.sample_cursor(platform);
        } else {
            self.last_sampled = None;
        }

        let graph = self.map.graph_mut();
        let devices = std::iter::once(&mut self.keyboard as &mut dyn InputDevice)
            .chain(std::iter::once(&mut self.mouse as &mut dyn InputDevice))
            .chain(self.gamepads.iter_mut().map(|p| p as &mut dyn InputDevice));
        for device in devices {
            log::trace!("Updating {:?} device.", device.kind());
            device.update(delta_seconds, graph);
        }
    }

    fn sample_cursor(&mut self, platform: &mut dyn CursorPlatform) {
        let Some(position) = platform.cursor_position() else {
            return;
        };
        self.cursor_position = Some(position);

        if self.capture_mouse {
            if self.recenter_pending {
                // The cursor was wherever the user left it; only warp.
                self.recenter_pending = false;
            } else {
                let delta = position - self.recenter_anchor;
                if delta != Vec2::ZERO {
                    self.mouse.accumulate_motion(delta);
                }
            }
            if position != self.recenter_anchor {
                platform.set_cursor_position(self.recenter_anchor);
            }
            self.cursor_position = Some(self.recenter_anchor);
        } else {
            if let Some(last) = self.last_sampled {
                let delta = position - last;
                if delta != Vec2::ZERO {
                    self.mouse.accumulate_motion(delta);
                }
            }
            self.last_sampled = Some(position);
        }
    }

    /// Applies one raw sample immediately.
    pub fn apply(&mut self, sample: RawInput) {
        match sample {
            RawInput::Key { code, pressed } => self.set_key_down_status(code, pressed),
            RawInput::Character(c) => self.last_character = Some(c),
            RawInput::MouseButton { button, pressed } => {
                self.set_mouse_down_status(button, pressed)
            }
            RawInput::CursorMoved { position } => self.cursor_position = Some(position),
            RawInput::MouseMotion { delta } => self.mouse.accumulate_motion(delta),
            RawInput::Scroll { delta } => {
                self.scroll += delta;
                self.mouse.accumulate_scroll(delta);
            }
            RawInput::GamepadConnected { pad } => {
                if let Some(gamepad) = self.gamepad_slot(pad) {
                    gamepad.connect();
                }
            }
            RawInput::GamepadDisconnected { pad } => {
                if let Some(gamepad) = self.gamepad_slot(pad) {
                    gamepad.disconnect();
                }
            }
            RawInput::GamepadButton { pad, button, value } => {
                let graph = self.map.graph_mut();
                if let Some(gamepad) = Self::connected_pad(&mut self.gamepads, pad) {
                    gamepad.set_button(graph, button, value);
                }
            }
            RawInput::GamepadAxis { pad, axis, value } => {
                let graph = self.map.graph_mut();
                if let Some(gamepad) = Self::connected_pad(&mut self.gamepads, pad) {
                    gamepad.set_axis(graph, axis, value);
                }
            }
            RawInput::Focus(focused) => {
                self.focused = focused;
                if !focused {
                    self.release_all();
                    self.last_sampled = None;
                }
            }
        }
    }

    /// The pad in `slot` if it is connected. Samples that arrive for an empty
    /// slot, or after a disconnect, would re-press leaves the pad released.
    fn connected_pad(gamepads: &mut [Gamepad], pad: u8) -> Option<&mut Gamepad> {
        match gamepads.get_mut(pad as usize) {
            Some(gamepad) if gamepad.is_connected() => Some(gamepad),
            Some(_) => {
                log::debug!("Dropping sample for disconnected gamepad slot {pad}.");
                None
            }
            None => {
                log::warn!("Dropping sample for unknown gamepad slot {pad}.");
                None
            }
        }
    }

    fn gamepad_slot(&mut self, pad: u8) -> Option<&mut Gamepad> {
        let gamepad = self.gamepads.get_mut(pad as usize);
        if gamepad.is_none() {
            log::warn!("Dropping sample for unknown gamepad slot {pad}.");
        }
        gamepad
    }

    /// A sender for queuing samples from other threads.
    pub fn input_sender(&self) -> flume::Sender<RawInput> {
        self.queue.sender()
    }

    /// Queues a sample to be applied by the next [`pump`](Self::pump).
    pub fn queue_input(&self, sample: RawInput) {
        self.queue.push(sample);
    }

    /// Applies every queued sample in arrival order. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let samples = self.queue.drain();
        let count = samples.len();
        for sample in samples {
            self.apply(sample);
        }
        count
    }

    // --- Binding ---

    /// The leaf of a physical control, created on first use.
    ///
    /// # Errors
    /// Returns [`InputError::InvalidGamepad`] for a slot out of range.
    pub fn source_value(&mut self, source: &InputSource) -> Result<ValueId> {
        let graph = self.map.graph_mut();
        let id = match source {
            InputSource::Key(code) => self.keyboard.key_value(graph, code),
            InputSource::MouseButton(button) => self.mouse.button_value(graph, *button),
            InputSource::MouseAxis(axis) => self.mouse.axis_value(graph, *axis),
            InputSource::GamepadButton { pad, button } => self
                .gamepads
                .get_mut(*pad as usize)
                .ok_or(InputError::InvalidGamepad(*pad))?
                .button_value(graph, *button),
            InputSource::GamepadAxis { pad, axis } => self
                .gamepads
                .get_mut(*pad as usize)
                .ok_or(InputError::InvalidGamepad(*pad))?
                .axis_value(graph, *axis),
        };
        Ok(id)
    }

    /// Binds a physical control to the value `name`.
    ///
    /// # Errors
    /// See [`InputMap::add_mapping`] and [`source_value`](Self::source_value).
    pub fn bind_value(&mut self, name: &str, source: &InputSource) -> Result<ValueId> {
        let leaf = self.source_value(source)?;
        self.map.add_mapping(name, leaf)?;
        self.map
            .value_id(name)
            .ok_or_else(|| InputError::UnknownValue(name.to_string()))
    }

    /// Binds a physical control to one side of the axis `name`.
    ///
    /// # Errors
    /// See [`InputMap::add_axis_mapping`] and [`source_value`](Self::source_value).
    pub fn bind_axis(
        &mut self,
        name: &str,
        polarity: Polarity,
        source: &InputSource,
    ) -> Result<ValueId> {
        let leaf = self.source_value(source)?;
        self.map.add_axis_mapping(name, polarity, leaf)?;
        self.map
            .axis_id(name)
            .ok_or_else(|| InputError::UnknownAxis(name.to_string()))
    }

    fn binding_source(&mut self, source: &BindingSource) -> Result<ValueId> {
        match source {
            BindingSource::Input(source) => self.source_value(source),
            BindingSource::Named(name) => self
                .map
                .value_id(name)
                .or_else(|| self.map.axis_id(name))
                .ok_or_else(|| InputError::UnknownValue(name.clone())),
        }
    }

    /// Builds map entries from a binding document.
    ///
    /// Values are applied first, then axes, then vectors, so axes may read
    /// named values and vectors must name axes declared in the document or
    /// already present. The document applies as a whole: if any entry fails,
    /// every value, axis, vector, mapping and deadzone it touched is put back
    /// and the error is returned. Device leaves created along the way are
    /// kept, as they carry no binding. The document's `config` block, when
    /// present, replaces the active settings only once every entry applied.
    ///
    /// # Errors
    /// The first configuration error found while applying the document.
    pub fn apply_bindings(&mut self, bindings: &InputBindings) -> Result<()> {
        log::info!(
            "Applying input bindings: {} values, {} axes, {} vectors.",
            bindings.values.len(),
            bindings.axes.len(),
            bindings.vectors.len()
        );
        let mut journal = Vec::new();
        match self.apply_binding_entries(bindings, &mut journal) {
            Ok(()) => {
                if let Some(config) = &bindings.config {
                    self.set_config(config.clone());
                }
                Ok(())
            }
            Err(e) => {
                log::error!(
                    "Input bindings rejected: {e}. Reverting {} changes.",
                    journal.len()
                );
                self.revert(journal);
                Err(e)
            }
        }
    }

    fn apply_binding_entries(
        &mut self,
        bindings: &InputBindings,
        journal: &mut Vec<BindingUndo>,
    ) -> Result<()> {
        let default_deadzone = bindings
            .config
            .as_ref()
            .map_or(self.config.default_deadzone, |c| c.default_deadzone);

        for binding in &bindings.values {
            let existed = self.map.value_id(&binding.name).is_some();
            let id = self
                .map
                .add_input_value_with_mode(&binding.name, binding.mode);
            if !existed {
                journal.push(BindingUndo::Value(binding.name.clone()));
            } else if let Some(state) = self.map.graph().state(id) {
                journal.push(BindingUndo::Deadzone {
                    node: id,
                    deadzone: state.deadzone,
                });
            }
            let deadzone = binding.deadzone.unwrap_or(default_deadzone);
            self.map.graph_mut().set_deadzone(id, deadzone)?;
            for source in &binding.sources {
                let leaf = self.binding_source(source)?;
                if self.map.graph_mut().add_mapping(id, leaf)? && existed {
                    journal.push(BindingUndo::Mapping {
                        target: id,
                        source: leaf,
                    });
                }
            }
        }

        for binding in &bindings.axes {
            if binding.positive.is_empty() && binding.negative.is_empty() {
                return Err(InputError::EmptyAxis(binding.name.clone()));
            }
            let existed = self.map.axis_id(&binding.name).is_some();
            let axis = self
                .map
                .add_input_axis_with_mode(&binding.name, binding.mode);
            if !existed {
                journal.push(BindingUndo::Axis(binding.name.clone()));
            }
            let (positive, negative) = self
                .map
                .graph()
                .axis_parts(axis)
                .ok_or(InputError::InvalidHandle)?;
            for (side, sources) in [(positive, &binding.positive), (negative, &binding.negative)] {
                for source in sources {
                    let leaf = self.binding_source(source)?;
                    if self.map.graph_mut().add_mapping(side, leaf)? && existed {
                        journal.push(BindingUndo::Mapping {
                            target: side,
                            source: leaf,
                        });
                    }
                }
            }
        }

        for binding in &bindings.vectors {
            for axis in [&binding.x, &binding.y] {
                if self.map.axis_id(axis).is_none() {
                    return Err(InputError::UnknownAxis(axis.clone()));
                }
            }
            let existed = self.map.vector_id(&binding.name).is_some();
            self.map
                .add_input_vector(&binding.name, &binding.x, &binding.y)?;
            if !existed {
                journal.push(BindingUndo::Vector(binding.name.clone()));
            }
        }
        Ok(())
    }

    /// Undoes journaled binding changes, newest first.
    fn revert(&mut self, journal: Vec<BindingUndo>) {
        for undo in journal.into_iter().rev() {
            match undo {
                BindingUndo::Value(name) => {
                    self.map.remove_value(&name);
                }
                BindingUndo::Axis(name) => {
                    self.map.remove_axis(&name);
                }
                BindingUndo::Vector(name) => {
                    self.map.remove_vector(&name);
                }
                BindingUndo::Mapping { target, source } => {
                    let _ = self.map.graph_mut().remove_mapping(target, source);
                }
                BindingUndo::Deadzone { node, deadzone } => {
                    let _ = self.map.graph_mut().set_deadzone(node, deadzone);
                }
            }
        }
    }

    /// The value of the value or axis `name`, `0.0` if unknown.
    pub fn get_value(&self, name: &str) -> f32 {
        self.map.get_value(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{GamepadAxis, GamepadButton, MouseAxis};

    struct FakeCursor {
        focused: bool,
        position: Option<Vec2>,
        warps: Vec<Vec2>,
    }

    impl FakeCursor {
        fn at(x: f32, y: f32) -> Self {
            Self {
                focused: true,
                position: Some(Vec2::new(x, y)),
                warps: Vec::new(),
            }
        }
    }

    impl CursorPlatform for FakeCursor {
        fn is_focused(&self) -> bool {
            self.focused
        }

        fn cursor_position(&self) -> Option<Vec2> {
            self.position
        }

        fn set_cursor_position(&mut self, position: Vec2) {
            self.warps.push(position);
            self.position = Some(position);
        }
    }

    fn key(name: &str) -> KeyCode {
        KeyCode::from(name)
    }

    #[test]
    fn test_just_pressed_lasts_one_frame() {
        let mut input = InputSystem::default();
        input.advance_frame_number();
        input.set_key_down_status(key("KeyK"), true);
        assert!(input.was_key_just_pressed(&key("KeyK")));
        assert!(input.is_key_down(&key("KeyK")));

        input.advance_frame_number();
        assert!(!input.was_key_just_pressed(&key("KeyK")));
        assert!(input.is_key_down(&key("KeyK")));
    }

    #[test]
    fn test_auto_repeat_keeps_the_transition_frame() {
        let mut input = InputSystem::default();
        input.set_key_down_status(key("KeyK"), true);
        let first = input.key_state(&key("KeyK")).unwrap();
        input.set_key_down_status(key("KeyK"), true);
        assert_eq!(input.key_state(&key("KeyK")), Some(first));

        input.advance_frame_number();
        input.set_key_down_status(key("KeyK"), true);
        assert_eq!(input.key_state(&key("KeyK")), Some(first));
        assert!(!input.was_key_just_pressed(&key("KeyK")));
    }

    #[test]
    fn test_unseen_keys_are_neither_pressed_nor_released() {
        let mut input = InputSystem::default();
        input.set_key_down_status(key("KeyZ"), false);
        assert!(!input.was_key_just_released(&key("KeyZ")));
        assert!(input.is_key_up(&key("KeyZ")));
        assert_eq!(input.key_state(&key("KeyZ")), None);
    }

    #[test]
    fn test_mouse_buttons_and_release() {
        let mut input = InputSystem::default();
        input.set_mouse_down_status(MouseButton::Left, true);
        assert!(input.was_mouse_just_pressed(MouseButton::Left));
        input.advance_frame_number();
        input.set_mouse_down_status(MouseButton::Left, false);
        assert!(input.was_mouse_just_released(MouseButton::Left));
        assert!(input.is_mouse_up(MouseButton::Left));
    }

    #[test]
    fn test_advance_clears_transients() {
        let mut input = InputSystem::default();
        input.apply(RawInput::Scroll {
            delta: Vec2::new(0.0, 2.0),
        });
        input.apply(RawInput::Character('x'));
        assert_eq!(input.scroll_amount(), Vec2::new(0.0, 2.0));
        assert_eq!(input.last_character(), Some('x'));

        input.advance_frame_number();
        assert_eq!(input.scroll_amount(), Vec2::ZERO);
        assert_eq!(input.last_character(), None);
        assert_eq!(input.frame_number(), 1);
    }

    #[test]
    fn test_captured_cursor_is_recentered() {
        let mut input = InputSystem::default();
        let dx = input
            .source_value(&InputSource::MouseAxis(MouseAxis::DeltaX))
            .unwrap();
        input.set_recenter_anchor(Vec2::new(100.0, 100.0));
        input.set_mouse_capture(true);

        // The first captured update only warps the cursor to the anchor.
        let mut cursor = FakeCursor::at(300.0, 50.0);
        input.update(0.016, &mut cursor);
        assert_eq!(cursor.warps, vec![Vec2::new(100.0, 100.0)]);
        assert_eq!(input.graph().value(dx), Some(0.0));

        cursor.position = Some(Vec2::new(110.0, 100.0));
        input.update(0.016, &mut cursor);
        assert_eq!(input.graph().value(dx), Some(10.0));
        assert_eq!(cursor.position, Some(Vec2::new(100.0, 100.0)));

        // No motion: the delta channel settles back to zero.
        input.update(0.016, &mut cursor);
        assert_eq!(input.graph().value(dx), Some(0.0));
    }

    #[test]
    fn test_free_cursor_delta_is_frame_relative() {
        let mut input = InputSystem::default();
        let dy = input
            .source_value(&InputSource::MouseAxis(MouseAxis::DeltaY))
            .unwrap();
        let mut cursor = FakeCursor::at(10.0, 10.0);
        input.update(0.016, &mut cursor);
        cursor.position = Some(Vec2::new(10.0, 4.0));
        input.update(0.016, &mut cursor);
        assert_eq!(input.graph().value(dy), Some(-6.0));
        assert!(cursor.warps.is_empty());

        cursor.focused = false;
        input.update(0.016, &mut cursor);
        assert!(!input.is_focused());
    }

    #[test]
    fn test_focus_loss_releases_held_keys() {
        let mut input = InputSystem::default();
        input.apply(RawInput::Key {
            code: key("KeyW"),
            pressed: true,
        });
        input.apply(RawInput::Focus(false));
        assert!(input.is_key_up(&key("KeyW")));
        assert!(input.was_key_just_released(&key("KeyW")));
    }

    #[test]
    fn test_pump_applies_queued_samples_in_order() {
        let mut input = InputSystem::default();
        let sender = input.input_sender();
        sender
            .send(RawInput::Key {
                code: key("Space"),
                pressed: true,
            })
            .unwrap();
        input.queue_input(RawInput::Key {
            code: key("Space"),
            pressed: false,
        });
        assert_eq!(input.pump(), 2);
        assert!(input.was_key_just_released(&key("Space")));
        assert_eq!(input.pump(), 0);
    }

    #[test]
    fn test_invalid_gamepad_slot() {
        let mut input = InputSystem::default();
        let source = InputSource::GamepadButton {
            pad: 9,
            button: GamepadButton::South,
        };
        assert_eq!(
            input.source_value(&source),
            Err(InputError::InvalidGamepad(9))
        );
        input.apply(RawInput::GamepadConnected { pad: 9 });
        assert!(input.gamepad(9).is_none());
    }

    #[test]
    fn test_samples_for_unplugged_pads_are_dropped() {
        let mut input = InputSystem::default();
        let south = input
            .source_value(&InputSource::GamepadButton {
                pad: 0,
                button: GamepadButton::South,
            })
            .unwrap();
        let trigger = input
            .source_value(&InputSource::GamepadAxis {
                pad: 0,
                axis: GamepadAxis::RightTrigger,
            })
            .unwrap();
        let south_sample = |value| RawInput::GamepadButton {
            pad: 0,
            button: GamepadButton::South,
            value,
        };

        // Never connected.
        input.apply(south_sample(1.0));
        assert_eq!(input.graph().value(south), Some(0.0));

        input.apply(RawInput::GamepadConnected { pad: 0 });
        input.apply(south_sample(1.0));
        assert_eq!(input.graph().value(south), Some(1.0));

        // Unplugged: the reset runs, then late samples must not re-press.
        input.apply(RawInput::GamepadDisconnected { pad: 0 });
        input.update(0.016, &mut FakeCursor::at(0.0, 0.0));
        assert_eq!(input.graph().value(south), Some(0.0));
        input.apply(south_sample(1.0));
        input.apply(RawInput::GamepadAxis {
            pad: 0,
            axis: GamepadAxis::RightTrigger,
            value: 1.0,
        });
        assert_eq!(input.graph().value(south), Some(0.0));
        assert_eq!(input.graph().value(trigger), Some(0.0));
    }
}
