//! Keyboard/mouse state polled once per frame.
//!
//! winit delivers key transitions as events; the frame loop wants "is W held"
//! and "was Enter pressed since last frame". Keys are tracked in a held set and
//! the two toggles are edge-triggered against the previous frame's state.

use std::collections::HashSet;

use corelib::{Camera, Movement};
use winit::event::{ElementState, MouseScrollDelta};
use winit::keyboard::KeyCode;

/// Pixels of trackpad scroll equivalent to one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

const MOVEMENT_KEYS: [(KeyCode, Movement); 4] = [
    (KeyCode::KeyW, Movement::Forward),
    (KeyCode::KeyS, Movement::Backward),
    (KeyCode::KeyA, Movement::Left),
    (KeyCode::KeyD, Movement::Right),
];

/// On/off switch flipped on the rising edge of its key.
#[derive(Clone, Copy, Debug, Default)]
pub struct Toggle {
    on: bool,
    was_down: bool,
}

impl Toggle {
    /// Feed the key's current state; returns `true` when the switch flipped.
    pub fn poll(&mut self, down: bool) -> bool {
        let flipped = down && !self.was_down;
        if flipped {
            self.on = !self.on;
        }
        self.was_down = down;
        flipped
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.on
    }
}

/// What the frame loop must act on after [`InputState::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameActions {
    pub quit: bool,
    /// `Some(wireframe)` when the polygon mode changed this frame.
    pub wireframe: Option<bool>,
}

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<KeyCode>,
    mouse_delta: (f64, f64),
    scroll: f64,
    wireframe: Toggle,
    fps_mode: Toggle,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.held.insert(key);
            }
            ElementState::Released => {
                self.held.remove(&key);
            }
        }
    }

    /// Raw pointer motion (device units, y down).
    pub fn on_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, y) => y as f64,
            MouseScrollDelta::PixelDelta(p) => p.y / PIXELS_PER_LINE,
        };
    }

    /// Focus lost: nothing stays held.
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    #[inline]
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    #[inline]
    pub fn fps_mode(&self) -> bool {
        self.fps_mode.is_on()
    }

    #[inline]
    pub fn wireframe(&self) -> bool {
        self.wireframe.is_on()
    }

    /// Apply one frame of input to `camera`: toggles first, then movement,
    /// then the accumulated look and zoom deltas.
    pub fn update(&mut self, camera: &mut Camera, dt: f32) -> FrameActions {
        let mut actions = FrameActions {
            quit: self.is_held(KeyCode::Escape),
            wireframe: None,
        };

        let enter = self.is_held(KeyCode::Enter) || self.is_held(KeyCode::NumpadEnter);
        if self.wireframe.poll(enter) {
            actions.wireframe = Some(self.wireframe.is_on());
        }

        if self.fps_mode.poll(self.is_held(KeyCode::KeyE)) {
            if self.fps_mode.is_on() {
                log::info!("FPS mode enabled");
                camera.snap_to_ground();
            } else {
                log::info!("Free-fly mode enabled");
            }
        }

        for (key, movement) in MOVEMENT_KEYS {
            if !self.is_held(key) {
                continue;
            }
            if self.fps_mode.is_on() {
                camera.process_fps_movement(movement, dt);
            } else {
                camera.process_movement(movement, dt);
            }
        }

        let (dx, dy) = std::mem::take(&mut self.mouse_delta);
        if dx != 0.0 || dy != 0.0 {
            // Screen y grows downwards; pitch grows upwards.
            camera.process_mouse_movement(dx as f32, -dy as f32, true);
        }

        let scroll = std::mem::take(&mut self.scroll);
        if scroll != 0.0 {
            camera.process_mouse_scroll(scroll as f32);
        }

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::{Vec3, vec3};

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn toggle_flips_once_per_press() {
        let mut input = InputState::new();
        let mut cam = Camera::new(Vec3::ZERO);

        input.on_key(KeyCode::Enter, ElementState::Pressed);
        let first = input.update(&mut cam, DT);
        assert_eq!(first.wireframe, Some(true));
        for _ in 0..30 {
            assert_eq!(input.update(&mut cam, DT).wireframe, None);
        }
        assert!(input.wireframe());

        input.on_key(KeyCode::Enter, ElementState::Released);
        assert_eq!(input.update(&mut cam, DT).wireframe, None);
        input.on_key(KeyCode::Enter, ElementState::Pressed);
        assert_eq!(input.update(&mut cam, DT).wireframe, Some(false));
    }

    #[test]
    fn enabling_fps_mode_snaps_to_ground() {
        let mut input = InputState::new();
        let mut cam = Camera::new(vec3(0.0, 5.0, 3.0));

        input.on_key(KeyCode::KeyE, ElementState::Pressed);
        input.update(&mut cam, DT);
        assert!(input.fps_mode());
        assert_eq!(cam.position.y, corelib::camera::GROUND_HEIGHT);

        input.on_key(KeyCode::KeyE, ElementState::Released);
        input.update(&mut cam, DT);
        input.on_key(KeyCode::KeyE, ElementState::Pressed);
        input.update(&mut cam, DT);
        assert!(!input.fps_mode());
    }

    #[test]
    fn held_key_moves_every_frame() {
        let mut input = InputState::new();
        let mut cam = Camera::new(Vec3::ZERO);
        input.on_key(KeyCode::KeyW, ElementState::Pressed);
        input.update(&mut cam, 0.5);
        input.update(&mut cam, 0.5);
        assert!((cam.position - Vec3::NEG_Z * cam.movement_speed).length() < 1e-4);

        input.on_key(KeyCode::KeyW, ElementState::Released);
        let before = cam.position;
        input.update(&mut cam, 0.5);
        assert_eq!(cam.position, before);
    }

    #[test]
    fn mouse_up_pitches_up_and_is_consumed() {
        let mut input = InputState::new();
        let mut cam = Camera::new(Vec3::ZERO);
        input.on_mouse_motion(0.0, -10.0);
        input.update(&mut cam, DT);
        assert!(cam.pitch() > 0.0);

        let pitch = cam.pitch();
        input.update(&mut cam, DT);
        assert_eq!(cam.pitch(), pitch);
    }

    #[test]
    fn scroll_lines_zoom_in() {
        let mut input = InputState::new();
        let mut cam = Camera::new(Vec3::ZERO);
        input.on_scroll(MouseScrollDelta::LineDelta(0.0, 2.0));
        input.update(&mut cam, DT);
        assert!((cam.zoom() - 43.0).abs() < 1e-5);
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputState::new();
        let mut cam = Camera::default();
        assert!(!input.update(&mut cam, DT).quit);
        input.on_key(KeyCode::Escape, ElementState::Pressed);
        assert!(input.update(&mut cam, DT).quit);
    }
}
