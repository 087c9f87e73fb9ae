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

//! The scalar input cell and the policies used to combine several of them.

use serde::{Deserialize, Serialize};

use super::graph::{ValueId, VectorId};
use crate::error::{InputError, Result};
use crate::math::Vec2;

/// The deadzone assigned to every new value.
pub const DEFAULT_DEADZONE: f32 = 0.15;

/// The state of a single input value.
///
/// A value is *down* above `1 - deadzone` and *up* below `deadzone`. Between
/// the two thresholds it is neither. With a deadzone below `0.5` it can never
/// be both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueState {
    /// The value written by the most recent effective update.
    pub current: f32,
    /// The value held before the most recent effective update.
    pub previous: f32,
    /// Width of the noise band at both ends of the `[0, 1]` range.
    pub deadzone: f32,
    /// Frame on which the value last changed.
    pub last_updated_frame: u64,
}

impl Default for ValueState {
    fn default() -> Self {
        Self {
            current: 0.0,
            previous: 0.0,
            deadzone: DEFAULT_DEADZONE,
            last_updated_frame: 0,
        }
    }
}

/// The digital transition produced by an effective update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    Pressed,
    Released,
    None,
}

impl ValueState {
    /// Creates a zeroed state with the given deadzone.
    pub fn with_deadzone(deadzone: f32) -> Self {
        Self {
            deadzone,
            ..Self::default()
        }
    }

    /// Returns `true` if the current value is past the upper threshold.
    #[inline]
    pub fn is_down(&self) -> bool {
        self.current > 1.0 - self.deadzone
    }

    /// Returns `true` if the current value is below the lower threshold.
    #[inline]
    pub fn is_up(&self) -> bool {
        self.current < self.deadzone
    }

    /// Same as [`is_down`](Self::is_down), evaluated on the previous value.
    #[inline]
    pub fn was_down(&self) -> bool {
        self.previous > 1.0 - self.deadzone
    }

    /// Same as [`is_up`](Self::is_up), evaluated on the previous value.
    #[inline]
    pub fn was_up(&self) -> bool {
        self.previous < self.deadzone
    }

    /// Returns `true` if the value crossed into the down state on `frame`.
    pub fn was_just_pressed(&self, frame: u64) -> bool {
        self.last_updated_frame == frame && self.is_down() && !self.was_down()
    }

    /// Returns `true` if the value crossed into the up state on `frame`.
    pub fn was_just_released(&self, frame: u64) -> bool {
        self.last_updated_frame == frame && self.is_up() && !self.was_up()
    }

    /// Writes `value`, stamping the change with `frame`.
    ///
    /// Returns `None` when `value` is exactly equal to the current value.
    pub(crate) fn apply(&mut self, value: f32, frame: u64) -> Option<Transition> {
        if value == self.current {
            return None;
        }
        self.previous = self.current;
        self.current = value;
        self.last_updated_frame = frame;

        let transition = if self.is_down() && !self.was_down() {
            Transition::Pressed
        } else if self.is_up() && !self.was_up() {
            Transition::Released
        } else {
            Transition::None
        };
        Some(transition)
    }
}

/// Policy used by a virtual value to combine the values it watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum ChordResolution {
    /// The largest signed value wins.
    #[default]
    Max,
    /// The smallest signed value wins.
    Min,
    /// The value with the largest magnitude wins and keeps its sign.
    MaxAbs,
    /// The value with the smallest magnitude wins and keeps its sign.
    MinAbs,
}

impl ChordResolution {
    /// Combines `values` according to this policy.
    ///
    /// For the magnitude policies ties keep the earliest contributor.
    ///
    /// # Errors
    /// Returns [`InputError::EmptyChord`] if `values` is empty.
    pub fn resolve(self, values: &[f32]) -> Result<f32> {
        let (&first, rest) = values.split_first().ok_or(InputError::EmptyChord)?;
        let resolved = rest.iter().fold(first, |best, &v| match self {
            ChordResolution::Max => best.max(v),
            ChordResolution::Min => best.min(v),
            ChordResolution::MaxAbs => {
                if v.abs() > best.abs() {
                    v
                } else {
                    best
                }
            }
            ChordResolution::MinAbs => {
                if v.abs() < best.abs() {
                    v
                } else {
                    best
                }
            }
        });
        Ok(resolved)
    }
}

/// What happened to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueEventKind {
    /// The value changed.
    Changed,
    /// The value crossed into the down state.
    Pressed,
    /// The value crossed into the up state.
    Released,
}

/// A notification delivered to value subscribers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueEvent {
    /// The node that changed.
    pub node: ValueId,
    /// The kind of notification.
    pub kind: ValueEventKind,
    /// The value before the change.
    pub previous: f32,
    /// The value after the change.
    pub current: f32,
    /// The frame on which the change happened.
    pub frame: u64,
}

/// A notification delivered to vector subscribers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorEvent {
    /// The vector that changed.
    pub node: VectorId,
    /// The vector before the change.
    pub previous: Vec2,
    /// The vector after the change.
    pub current: Vec2,
    /// The frame on which the change happened.
    pub frame: u64,
}
