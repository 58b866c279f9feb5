use crate::{Mat4, Vec3};

/// Default yaw in degrees: looking down -Z.
pub const YAW: f32 = -90.0;
pub const PITCH: f32 = 0.0;
pub const SPEED: f32 = 5.0;
pub const SENSITIVITY: f32 = 0.1;
/// Default vertical field of view in degrees.
pub const ZOOM: f32 = 45.0;

pub const PITCH_LIMIT: f32 = 89.0;
pub const ZOOM_MIN: f32 = 1.0;
pub const ZOOM_MAX: f32 = 45.0;
/// Eye height enforced by grounded (FPS) movement.
pub const GROUND_HEIGHT: f32 = 1.0;

/// Keyboard-driven movement directions, relative to the view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// First-person camera driven by yaw/pitch Euler angles (right-handed).
///
/// `front`, `right` and `up` are never set directly: they are recomputed from
/// yaw, pitch and `world_up` whenever the orientation changes.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    zoom: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    /// Camera at `position` with the default orientation (yaw -90°, pitch 0°).
    pub fn new(position: Vec3) -> Self {
        Self::with_orientation(position, Vec3::Y, YAW, PITCH)
    }

    pub fn with_orientation(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch,
            movement_speed: SPEED,
            mouse_sensitivity: SENSITIVITY,
            zoom: ZOOM,
            z_near: 0.1,
            z_far: 100.0,
        };
        camera.update_vectors();
        camera
    }

    #[inline]
    pub fn front(&self) -> Vec3 {
        self.front
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.right
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    #[inline]
    pub fn world_up(&self) -> Vec3 {
        self.world_up
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    #[inline]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Look-at transform from `position` towards `position + front`.
    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection with depth in [0, 1], as wgpu expects.
    #[inline]
    pub fn proj(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.zoom.to_radians(),
            aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    #[inline]
    pub fn proj_view(&self, aspect: f32) -> Mat4 {
        self.proj(aspect) * self.view()
    }

    /// Free-fly translation along the view basis.
    pub fn process_movement(&mut self, direction: Movement, dt: f32) {
        self.translate(direction, dt);
        log::trace!(
            "camera X: {:.3} | Y: {:.3} | Z: {:.3}",
            self.position.x,
            self.position.y,
            self.position.z
        );
    }

    /// Grounded translation: like [`Camera::process_movement`] but the eye
    /// height is pinned to [`GROUND_HEIGHT`] afterwards.
    pub fn process_fps_movement(&mut self, direction: Movement, dt: f32) {
        self.translate(direction, dt);
        self.snap_to_ground();
        log::trace!(
            "camera (fps) X: {:.3} | Y: {:.3} | Z: {:.3}",
            self.position.x,
            self.position.y,
            self.position.z
        );
    }

    pub fn snap_to_ground(&mut self) {
        self.position.y = GROUND_HEIGHT;
    }

    /// Integrate raw pointer deltas (already y-inverted by the caller).
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32, constrain_pitch: bool) {
        self.yaw += dx * self.mouse_sensitivity;
        self.pitch += dy * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    /// Scrolling up narrows the field of view.
    pub fn process_mouse_scroll(&mut self, dy: f32) {
        self.zoom = (self.zoom - dy).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    fn translate(&mut self, direction: Movement, dt: f32) {
        let velocity = self.movement_speed * dt;
        match direction {
            Movement::Forward => self.position += self.front * velocity,
            Movement::Backward => self.position -= self.front * velocity,
            Movement::Left => self.position -= self.right * velocity,
            Movement::Right => self.position += self.right * velocity,
        }
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let direction = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
        self.front = direction.normalize();
        // Looking straight along world_up (only reachable unconstrained) keeps the old basis.
        self.right = self.front.cross(self.world_up).try_normalize().unwrap_or(self.right);
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    const EPS: f32 = 1e-4;

    fn assert_orthonormal(cam: &Camera) {
        assert!((cam.front().length() - 1.0).abs() < EPS);
        assert!((cam.right().length() - 1.0).abs() < EPS);
        assert!((cam.up().length() - 1.0).abs() < EPS);
        assert!(cam.front().dot(cam.right()).abs() < EPS);
        assert!(cam.front().dot(cam.up()).abs() < EPS);
        assert!(cam.right().dot(cam.up()).abs() < EPS);
        // right-handed: right x up == -front (camera looks down its local -Z)
        assert!((cam.right().cross(cam.up()) + cam.front()).length() < 1e-4);
    }

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let cam = Camera::new(Vec3::ZERO);
        assert!((cam.front() - Vec3::NEG_Z).length() < EPS);
        assert!((cam.right() - Vec3::X).length() < EPS);
        assert!((cam.up() - Vec3::Y).length() < EPS);
    }

    #[test]
    fn basis_stays_orthonormal_across_orientations() {
        for yaw in (-720..=720).step_by(37) {
            for pitch in (-89..=89).step_by(7) {
                let cam =
                    Camera::with_orientation(Vec3::ZERO, Vec3::Y, yaw as f32, pitch as f32);
                assert_orthonormal(&cam);
            }
        }
    }

    #[test]
    fn pitch_is_pinned_at_limits() {
        let mut cam = Camera::default();
        cam.process_mouse_movement(0.0, 5_000.0, true);
        assert_eq!(cam.pitch(), PITCH_LIMIT);
        cam.process_mouse_movement(0.0, -50_000.0, true);
        assert_eq!(cam.pitch(), -PITCH_LIMIT);
        assert_orthonormal(&cam);
    }

    #[test]
    fn unconstrained_pitch_may_exceed_limit() {
        let mut cam = Camera::default();
        cam.process_mouse_movement(0.0, 1_000.0, false);
        assert!(cam.pitch() > PITCH_LIMIT);
        assert!(cam.front().is_finite() && cam.right().is_finite() && cam.up().is_finite());
    }

    #[test]
    fn mouse_deltas_are_scaled_by_sensitivity() {
        let mut cam = Camera::default();
        cam.process_mouse_movement(10.0, 20.0, true);
        assert!((cam.yaw() - (YAW + 1.0)).abs() < EPS);
        assert!((cam.pitch() - 2.0).abs() < EPS);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = Camera::default();
        for _ in 0..100 {
            cam.process_mouse_scroll(3.0);
        }
        assert_eq!(cam.zoom(), ZOOM_MIN);
        cam.process_mouse_scroll(-1_000.0);
        assert_eq!(cam.zoom(), ZOOM_MAX);
        cam.process_mouse_scroll(2.5);
        assert!((cam.zoom() - 42.5).abs() < EPS);
    }

    #[test]
    fn fps_movement_keeps_ground_height() {
        let mut cam = Camera::with_orientation(vec3(0.0, 4.0, 3.0), Vec3::Y, -60.0, 35.0);
        let moves = [
            Movement::Forward,
            Movement::Left,
            Movement::Backward,
            Movement::Right,
            Movement::Forward,
        ];
        for (i, m) in moves.iter().enumerate() {
            cam.process_fps_movement(*m, 0.1 * (i + 1) as f32);
            assert_eq!(cam.position.y, GROUND_HEIGHT);
        }
    }

    #[test]
    fn free_fly_movement_follows_front() {
        let mut cam = Camera::with_orientation(Vec3::ZERO, Vec3::Y, -90.0, 45.0);
        cam.process_movement(Movement::Forward, 1.0);
        assert!(cam.position.y > 3.0);
        assert!((cam.position - cam.front() * SPEED).length() < 1e-4);
    }

    #[test]
    fn strafing_moves_along_right() {
        let mut cam = Camera::new(Vec3::ZERO);
        cam.process_movement(Movement::Right, 0.5);
        assert!((cam.position - Vec3::X * SPEED * 0.5).length() < EPS);
        cam.process_movement(Movement::Left, 0.5);
        assert!(cam.position.length() < EPS);
    }

    #[test]
    fn view_matrix_maps_front_to_negative_z() {
        let cam = Camera::with_orientation(vec3(1.0, 2.0, 3.0), Vec3::Y, 30.0, -20.0);
        let ahead = cam.view().transform_point3(cam.position + cam.front());
        assert!((ahead - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn camera_pv_is_finite() {
        let cam = Camera::new(vec3(0.0, 1.0, 3.0));
        let a = cam.proj_view(16.0 / 9.0).to_cols_array();
        assert!(a.iter().all(|f| f.is_finite()));
    }
}
