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

//! Raw input samples and the queue that carries them to the update thread.
//!
//! Platform backends may poll hardware on any thread, but the value graph is
//! only ever mutated on the thread that owns the [`InputSystem`]. Producers
//! push [`RawInput`] samples through a cloned sender; the owner drains the
//! queue once per frame with [`InputSystem::pump`].
//!
//! [`InputSystem`]: super::InputSystem
//! [`InputSystem::pump`]: super::InputSystem::pump

use super::device::{GamepadAxis, GamepadButton, KeyCode, MouseButton};
use crate::math::Vec2;

/// A backend-agnostic input sample.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// A keyboard key changed state.
    Key {
        /// The physical key.
        code: KeyCode,
        /// `true` on press, `false` on release.
        pressed: bool,
    },
    /// A character was typed.
    Character(char),
    /// A mouse button changed state.
    MouseButton {
        /// The button.
        button: MouseButton,
        /// `true` on press, `false` on release.
        pressed: bool,
    },
    /// The cursor moved to a new window position.
    CursorMoved {
        /// The new position, in physical pixels.
        position: Vec2,
    },
    /// Unaccelerated device motion, independent of the cursor.
    MouseMotion {
        /// The motion since the previous sample.
        delta: Vec2,
    },
    /// The wheel was scrolled.
    Scroll {
        /// The wheel travel, in lines.
        delta: Vec2,
    },
    /// A controller took a gamepad slot.
    GamepadConnected {
        /// The slot.
        pad: u8,
    },
    /// A controller left its gamepad slot.
    GamepadDisconnected {
        /// The slot.
        pad: u8,
    },
    /// A gamepad button changed.
    GamepadButton {
        /// The slot.
        pad: u8,
        /// The button.
        button: GamepadButton,
        /// The pressure, `0.0..=1.0`.
        value: f32,
    },
    /// A gamepad analog channel moved.
    GamepadAxis {
        /// The slot.
        pad: u8,
        /// The channel.
        axis: GamepadAxis,
        /// The raw position.
        value: f32,
    },
    /// The window gained or lost focus.
    Focus(bool),
}

/// An unbounded multi-producer queue of [`RawInput`] samples.
#[derive(Debug)]
pub struct InputQueue {
    sender: flume::Sender<RawInput>,
    receiver: flume::Receiver<RawInput>,
}

impl InputQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("Input sample queue initialized.");
        Self { sender, receiver }
    }

    /// Enqueues a sample from the owning thread.
    pub fn push(&self, sample: RawInput) {
        if let Err(e) = self.sender.send(sample) {
            log::error!("Failed to queue input sample: {e}. Receiver likely disconnected.");
        }
    }

    /// Returns a sender that other threads can use to enqueue samples.
    pub fn sender(&self) -> flume::Sender<RawInput> {
        self.sender.clone()
    }

    /// Takes every sample queued so far, oldest first, without blocking.
    pub fn drain(&self) -> Vec<RawInput> {
        self.receiver.try_iter().collect()
    }

    /// Number of samples waiting.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if no sample is waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn key(name: &str, pressed: bool) -> RawInput {
        RawInput::Key {
            code: KeyCode::from(name),
            pressed,
        }
    }

    #[test]
    fn test_drain_preserves_order() {
        let queue = InputQueue::new();
        queue.push(key("KeyA", true));
        queue.push(RawInput::Character('a'));
        queue.push(key("KeyA", false));
        assert_eq!(queue.len(), 3);

        let samples = queue.drain();
        assert_eq!(
            samples,
            vec![key("KeyA", true), RawInput::Character('a'), key("KeyA", false)]
        );
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_samples_from_other_threads_are_drained_on_the_owner() {
        let queue = InputQueue::new();
        let handles: Vec<_> = (0..4u8)
            .map(|pad| {
                let sender = queue.sender();
                thread::spawn(move || {
                    sender
                        .send(RawInput::GamepadConnected { pad })
                        .expect("Send from thread failed");
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("Thread join failed");
        }

        let mut pads: Vec<u8> = queue
            .drain()
            .into_iter()
            .map(|sample| match sample {
                RawInput::GamepadConnected { pad } => pad,
                other => panic!("Unexpected sample: {other:?}"),
            })
            .collect();
        pads.sort_unstable();
        assert_eq!(pads, vec![0, 1, 2, 3]);
    }
}
