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

//! The input core.
//!
//! Data flows one way through this module:
//!
//! 1. Platform adapters produce [`RawInput`] samples (directly or through the
//!    [`InputQueue`]).
//! 2. The [`InputSystem`] routes each sample to a device, which writes a leaf
//!    of the [`ValueGraph`].
//! 3. The graph propagates the change depth-first into every virtual value,
//!    axis and vector that watches the leaf before the write returns.
//! 4. Consumers read the settled values by name through the [`InputMap`] or
//!    by raw code through the [`InputSystem`].

pub mod device;
mod graph;
mod map;
mod queue;
mod system;
mod value;

pub use self::device::{
    DeviceKind, Gamepad, GamepadAxis, GamepadButton, InputDevice, InputSource, KeyCode, Keyboard,
    Mouse, MouseAxis, MouseButton, MAX_GAMEPADS,
};
pub use self::graph::{NodeKind, SubscriptionId, ValueGraph, ValueId, VectorId};
pub use self::map::{InputMap, Polarity};
pub use self::queue::{InputQueue, RawInput};
pub use self::system::{ButtonState, CursorPlatform, InputSystem};
pub use self::value::{
    ChordResolution, ValueEvent, ValueEventKind, ValueState, VectorEvent, DEFAULT_DEADZONE,
};
