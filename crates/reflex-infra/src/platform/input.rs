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

//! Translation from `winit` events to raw input samples.
//!
//! This module is the adapter between the windowing backend and
//! [`InputSystem::apply`](reflex_core::InputSystem::apply); nothing past it
//! sees a `winit` type.

use reflex_core::input::{KeyCode as ReflexKeyCode, MouseButton, RawInput};
use reflex_core::Vec2;
use winit::event::{
    DeviceEvent, ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent,
};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Translates a `winit::event::WindowEvent` into a [`RawInput`] sample.
///
/// Key auto-repeats are forwarded as further presses; the input system keeps
/// the frame of the original press. Window events that carry no input
/// (resizes, redraws, close requests) produce `None`.
///
/// Typed text travels separately, see [`translate_winit_text`].
pub fn translate_winit_input(event: &WindowEvent) -> Option<RawInput> {
    match event {
        WindowEvent::KeyboardInput {
            event: key_event, ..
        } => {
            let PhysicalKey::Code(keycode) = key_event.physical_key else {
                return None;
            };
            Some(RawInput::Key {
                code: map_keycode(keycode),
                pressed: key_event.state == ElementState::Pressed,
            })
        }
        WindowEvent::CursorMoved { position, .. } => Some(RawInput::CursorMoved {
            position: Vec2::new(position.x as f32, position.y as f32),
        }),
        WindowEvent::MouseInput { state, button, .. } => Some(RawInput::MouseButton {
            button: map_mouse_button(*button),
            pressed: *state == ElementState::Pressed,
        }),
        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy): (f32, f32) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(pos) => (pos.x as f32, pos.y as f32),
            };
            if dx != 0.0 || dy != 0.0 {
                Some(RawInput::Scroll {
                    delta: Vec2::new(dx, dy),
                })
            } else {
                None
            }
        }
        WindowEvent::Focused(focused) => Some(RawInput::Focus(*focused)),
        _ => None,
    }
}

/// Extracts the printable character typed by a key press, if any.
pub fn translate_winit_text(event: &WindowEvent) -> Option<RawInput> {
    let WindowEvent::KeyboardInput {
        event: key_event, ..
    } = event
    else {
        return None;
    };
    if key_event.state != ElementState::Pressed {
        return None;
    }
    key_event
        .text
        .as_ref()
        .and_then(|text| text.chars().next())
        .filter(|c| !c.is_control())
        .map(RawInput::Character)
}

/// Translates raw device motion into a [`RawInput::MouseMotion`] sample.
///
/// Device motion is unaccelerated and keeps arriving while the cursor is
/// pinned at a screen edge. Hosts forwarding it should leave the cursor
/// free, as the input system also measures cursor travel each update.
pub fn translate_device_event(event: &DeviceEvent) -> Option<RawInput> {
    match event {
        DeviceEvent::MouseMotion { delta: (dx, dy) } => Some(RawInput::MouseMotion {
            delta: Vec2::new(*dx as f32, *dy as f32),
        }),
        _ => None,
    }
}

// --- Private Helper Functions ---

/// (Internal) Maps a `winit::keyboard::KeyCode` to the backend-agnostic key name.
fn map_keycode(keycode: KeyCode) -> ReflexKeyCode {
    ReflexKeyCode::new(format!("{keycode:?}"))
}

/// (Internal) Maps a `winit::event::MouseButton` to the input core's button.
fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(id) => MouseButton::Other(id),
    }
}
