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

//! # Reflex Infra
//!
//! Concrete platform backends for `reflex-core`.
//!
//! - [`platform`] translates `winit` window and device events into raw input
//!   samples and exposes the window cursor to the input system.
//! - [`gamepad`] polls controllers through `gilrs` and assigns them to slots.

#![warn(missing_docs)]

#[cfg(feature = "gamepad")]
pub mod gamepad;
#[cfg(feature = "platform")]
pub mod platform;

#[cfg(feature = "gamepad")]
pub use gamepad::GilrsGamepads;
#[cfg(feature = "platform")]
pub use platform::{
    input::{translate_device_event, translate_winit_input, translate_winit_text},
    window::{WinitCursor, WinitWindowBuilder},
};
