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

//! # Reflex Core
//!
//! Backend-agnostic input core. Physical devices write raw samples into an
//! arena-backed value graph, virtual values and axes aggregate those samples,
//! and the [`InputSystem`] answers frame-accurate queries on the settled state.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod input;
pub mod math;

pub use config::{InputBindings, InputConfig};
pub use error::{InputError, Result};
pub use input::{InputMap, InputSystem, ValueGraph, ValueId, VectorId};
pub use math::Vec2;
