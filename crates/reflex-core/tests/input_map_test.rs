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

use std::cell::RefCell;
use std::rc::Rc;
use std::thread;

use anyhow::Result;
use reflex_core::input::{
    ChordResolution, CursorPlatform, GamepadAxis, InputSource, KeyCode, MouseAxis, Polarity,
    RawInput, ValueEventKind,
};
use reflex_core::{InputBindings, InputError, InputSystem, Vec2};
use tempfile::tempdir;

fn key(name: &str) -> InputSource {
    InputSource::Key(KeyCode::from(name))
}

struct Headless;

impl CursorPlatform for Headless {
    fn is_focused(&self) -> bool {
        true
    }

    fn cursor_position(&self) -> Option<Vec2> {
        None
    }

    fn set_cursor_position(&mut self, _position: Vec2) {}
}

fn press(input: &mut InputSystem, name: &str, down: bool) {
    input.apply(RawInput::Key {
        code: KeyCode::from(name),
        pressed: down,
    });
}

#[test]
fn test_opposing_keys_cancel_on_an_axis() -> Result<()> {
    // --- 1. Setup ---
    let mut input = InputSystem::default();
    input.bind_axis("MoveX", Polarity::Positive, &key("KeyD"))?;
    input.bind_axis("MoveX", Polarity::Negative, &key("KeyA"))?;

    // --- 2. Act & Assert ---
    press(&mut input, "KeyD", true);
    assert_eq!(input.get_value("MoveX"), 1.0);

    press(&mut input, "KeyA", true);
    assert_eq!(input.get_value("MoveX"), 0.0);

    press(&mut input, "KeyD", false);
    assert_eq!(input.get_value("MoveX"), -1.0);

    press(&mut input, "KeyA", false);
    assert_eq!(input.get_value("MoveX"), 0.0);
    Ok(())
}

#[test]
fn test_chorded_value_fires_once_per_press() -> Result<()> {
    let mut input = InputSystem::default();
    let jump = input.bind_value("Jump", &key("Space"))?;
    input.bind_value(
        "Jump",
        &InputSource::GamepadAxis {
            pad: 0,
            axis: GamepadAxis::RightTrigger,
        },
    )?;

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    input
        .map_mut()
        .subscribe("Jump", move |e| sink.borrow_mut().push(e.kind))?;

    input.advance_frame_number();
    press(&mut input, "Space", true);
    assert!(input.map().was_just_pressed("Jump"));
    assert!(input.graph().is_down(jump));

    // The trigger joining in keeps the value high, so no second press.
    input.apply(RawInput::GamepadConnected { pad: 0 });
    input.apply(RawInput::GamepadAxis {
        pad: 0,
        axis: GamepadAxis::RightTrigger,
        value: 1.0,
    });
    press(&mut input, "Space", false);
    assert!(input.map().is_down("Jump"));

    input.advance_frame_number();
    assert!(!input.map().was_just_pressed("Jump"));

    assert_eq!(
        events
            .borrow()
            .iter()
            .filter(|k| **k == ValueEventKind::Pressed)
            .count(),
        1
    );
    Ok(())
}

#[test]
fn test_bindings_file_drives_a_vector() -> Result<()> {
    // --- 1. Setup: a bindings file on disk ---
    let dir = tempdir()?;
    let path = dir.path().join("bindings.ron");
    std::fs::write(
        &path,
        r#"(
            values: [(name: "Aim", mode: MaxAbs, sources: [Input(MouseAxis(DeltaX)), Input(GamepadAxis(pad: 0, axis: RightStickX))])],
            axes: [
                (name: "MoveX", positive: [Input(Key("KeyD"))], negative: [Input(Key("KeyA"))]),
                (name: "MoveY", positive: [Input(Key("KeyW"))], negative: [Input(Key("KeyS"))]),
            ],
            vectors: [(name: "Move", x: "MoveX", y: "MoveY")],
        )"#,
    )?;

    // --- 2. Load and apply ---
    let bindings = InputBindings::load(&path)?;
    assert_eq!(bindings.values[0].mode, ChordResolution::MaxAbs);
    let mut input = InputSystem::default();
    input.apply_bindings(&bindings)?;

    // --- 3. Drive it ---
    press(&mut input, "KeyD", true);
    press(&mut input, "KeyS", true);
    assert_eq!(input.map().get_vector("Move"), Vec2::new(1.0, -1.0));
    assert_eq!(input.map().get_vector2("MoveX", "MoveY")?, Vec2::new(1.0, -1.0));
    assert_eq!(
        input.map().get_vector2("MoveX", "Strafe"),
        Err(InputError::UnknownAxis("Strafe".into()))
    );
    assert_eq!(input.map().get_vector2_or_zero("Nope", "MoveY"), Vec2::ZERO);
    Ok(())
}

#[test]
fn test_signed_analog_sources_reach_a_bound_axis() -> Result<()> {
    // --- 1. Setup: look and move axes over signed analog sources ---
    let bindings = InputBindings::from_ron_str(
        r#"(
            axes: [
                (name: "LookX", mode: MaxAbs, positive: [Input(MouseAxis(DeltaX))]),
                (
                    name: "MoveX",
                    mode: MaxAbs,
                    positive: [Input(Key("KeyD")), Input(GamepadAxis(pad: 0, axis: LeftStickX))],
                    negative: [Input(Key("KeyA"))],
                ),
            ],
        )"#,
    )?;
    let mut input = InputSystem::default();
    input.apply_bindings(&bindings)?;

    // --- 2. Mouse moving left ---
    input.apply(RawInput::MouseMotion {
        delta: Vec2::new(-20.0, -10.0),
    });
    input.update(0.016, &mut Headless);
    assert_eq!(input.get_value("LookX"), -20.0);

    // --- 3. Stick pushed fully left ---
    input.apply(RawInput::GamepadConnected { pad: 0 });
    input.apply(RawInput::GamepadAxis {
        pad: 0,
        axis: GamepadAxis::LeftStickX,
        value: -1.0,
    });
    assert!((input.get_value("MoveX") + 1.0).abs() < 1e-5);

    // The key takes over once the stick is released.
    press(&mut input, "KeyD", true);
    input.apply(RawInput::GamepadAxis {
        pad: 0,
        axis: GamepadAxis::LeftStickX,
        value: 0.0,
    });
    assert_eq!(input.get_value("MoveX"), 1.0);
    Ok(())
}

#[test]
fn test_missing_bindings_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    let err = InputBindings::load(dir.path().join("absent.ron")).unwrap_err();
    assert!(matches!(err, InputError::Config(_)));
}

#[test]
fn test_samples_from_another_thread_apply_on_pump() -> Result<()> {
    let mut input = InputSystem::default();
    let scroll = input.source_value(&InputSource::MouseAxis(MouseAxis::ScrollY))?;
    let sender = input.input_sender();

    let producer = thread::spawn(move || {
        for _ in 0..3 {
            sender
                .send(RawInput::Scroll {
                    delta: Vec2::new(0.0, 1.0),
                })
                .unwrap();
        }
        sender
            .send(RawInput::Key {
                code: KeyCode::from("KeyE"),
                pressed: true,
            })
            .unwrap();
    });
    producer.join().unwrap();

    assert_eq!(input.pump(), 4);
    assert_eq!(input.scroll_amount(), Vec2::new(0.0, 3.0));
    assert!(input.was_key_just_pressed(&KeyCode::from("KeyE")));

    // Scroll reaches the graph on the next device update.
    input.update(0.016, &mut Headless);
    assert_eq!(input.graph().value(scroll), Some(3.0));

    input.advance_frame_number();
    assert_eq!(input.scroll_amount(), Vec2::ZERO);
    Ok(())
}
