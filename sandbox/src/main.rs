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

//! Opens a window and logs the mapped input state every frame.
//!
//! Bindings are read from `bindings.ron` next to this crate's manifest.
//! `Tab` toggles cursor capture for camera look, `Escape` quits.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use reflex_core::input::{KeyCode, MouseButton};
use reflex_core::{InputBindings, InputSystem};
use reflex_infra::{
    translate_winit_input, translate_winit_text, GilrsGamepads, WinitCursor, WinitWindowBuilder,
};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

struct Sandbox {
    input: InputSystem,
    gamepads: GilrsGamepads,
    window: Option<Arc<Window>>,
    cursor: Option<WinitCursor>,
    last_frame: Instant,
}

impl Sandbox {
    fn new(bindings: &InputBindings) -> Result<Self> {
        let mut input = InputSystem::default();
        input.apply_bindings(bindings)?;
        let gamepads = GilrsGamepads::new();
        for sample in gamepads.initial_samples() {
            input.apply(sample);
        }
        Ok(Self {
            input,
            gamepads,
            window: None,
            cursor: None,
            last_frame: Instant::now(),
        })
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(cursor) = self.cursor.as_mut() else {
            return;
        };
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        for sample in self.gamepads.poll() {
            self.input.apply(sample);
        }
        self.input.update(dt, cursor);

        let input = &self.input;
        if input.was_key_just_pressed(&KeyCode::from("Escape")) {
            log::info!("Escape pressed, exiting...");
            event_loop.exit();
        }
        if input.was_key_just_pressed(&KeyCode::from("Tab")) {
            let capture = !input.is_mouse_captured();
            cursor.set_capture(capture);
            let center = cursor.center();
            self.input.set_recenter_anchor(center);
            self.input.set_mouse_capture(capture);
            log::info!("Mouse capture {}.", if capture { "on" } else { "off" });
        }

        let map = self.input.map();
        if map.was_just_pressed("Jump") {
            log::info!("Jump!");
        }
        if map.was_just_released("Fire") {
            log::info!("Fire released.");
        }
        if self.input.was_mouse_just_pressed(MouseButton::Right) {
            log::info!("Right click at {:?}.", self.input.cursor_position());
        }
        if let Some(c) = self.input.last_character() {
            log::debug!("Typed {c:?}.");
        }
        let movement = map.get_vector("Move");
        let look = map.get_vector("Look");
        if movement.length_squared() > 0.0 || look.length_squared() > 0.0 {
            log::debug!(
                "Frame {}: move {:?}, look {:?}, fire {:.2}",
                self.input.frame_number(),
                movement,
                look,
                map.get_value("Fire")
            );
        }

        self.input.advance_frame_number();
    }
}

impl ApplicationHandler for Sandbox {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        match WinitWindowBuilder::new()
            .with_title("Reflex Sandbox")
            .build(event_loop)
        {
            Ok(window) => {
                self.cursor = Some(WinitCursor::new(window.clone()));
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.handle_event(&event);
        }
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Shutdown requested, exiting event loop...");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {
                if let Some(sample) = translate_winit_input(&event) {
                    self.input.apply(sample);
                }
                if let Some(sample) = translate_winit_text(&event) {
                    self.input.apply(sample);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("bindings.ron");
    let bindings = InputBindings::load(&path)?;
    let mut sandbox = Sandbox::new(&bindings)?;

    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut sandbox)?;
    Ok(())
}
