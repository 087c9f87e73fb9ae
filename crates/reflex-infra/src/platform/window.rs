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

//! A `winit` window and the cursor services the input system needs from it.

use std::sync::Arc;

use reflex_core::input::CursorPlatform;
use reflex_core::Vec2;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::error::OsError;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{CursorGrabMode, Window};

/// A builder for the window input is read from.
pub struct WinitWindowBuilder {
    title: String,
    width: u32,
    height: u32,
}

impl WinitWindowBuilder {
    /// Creates a new `WinitWindowBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            title: "Reflex".to_string(),
            width: 1024,
            height: 768,
        }
    }

    /// Sets the title of the window to be built.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the initial inner dimensions of the window to be built.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Builds the window using the provided `winit` event loop.
    ///
    /// # Errors
    /// Returns an `OsError` if the underlying `winit` window creation fails.
    pub fn build(self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>, OsError> {
        log::info!(
            "Building window with title: '{}' and size: {}x{}",
            self.title,
            self.width,
            self.height
        );

        let window_attributes = Window::default_attributes()
            .with_title(self.title)
            .with_inner_size(LogicalSize::new(self.width, self.height))
            .with_visible(true);

        let window = event_loop.create_window(window_attributes)?;

        log::info!("Winit window created successfully (id: {:?}).", window.id());
        Ok(Arc::new(window))
    }
}

impl Default for WinitWindowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The cursor of a `winit` window.
///
/// `winit` only reports focus and cursor position through events, so the
/// owner must feed every window event to [`handle_event`](Self::handle_event)
/// before sampling.
#[derive(Debug, Clone)]
pub struct WinitCursor {
    window: Arc<Window>,
    focused: bool,
    position: Option<Vec2>,
}

impl WinitCursor {
    /// Wraps `window`. The window is assumed focused until told otherwise.
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            focused: true,
            position: None,
        }
    }

    /// The wrapped window.
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Tracks focus and cursor position from a window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Focused(focused) => self.focused = *focused,
            WindowEvent::CursorMoved { position, .. } => {
                self.position = Some(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => self.position = None,
            _ => {}
        }
    }

    /// Hides and confines the cursor for camera look, or releases it.
    pub fn set_capture(&self, capture: bool) {
        let grab = if capture {
            self.window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Locked))
        } else {
            self.window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = grab {
            log::warn!("Cursor grab not supported on this platform: {e}");
        }
        self.window.set_cursor_visible(!capture);
    }

    /// The centre of the window's inner area, in physical pixels.
    pub fn center(&self) -> Vec2 {
        let size = self.window.inner_size();
        Vec2::new(size.width as f32 * 0.5, size.height as f32 * 0.5)
    }
}

impl CursorPlatform for WinitCursor {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn cursor_position(&self) -> Option<Vec2> {
        self.position
    }

    fn set_cursor_position(&mut self, position: Vec2) {
        let target = PhysicalPosition::new(position.x as f64, position.y as f64);
        match self.window.set_cursor_position(target) {
            // Some platforms do not echo a CursorMoved for warps.
            Ok(()) => self.position = Some(position),
            Err(e) => log::debug!("Cursor warp failed: {e}"),
        }
    }
}
