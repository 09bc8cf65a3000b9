use glam::{Vec2, vec2};

/// Default half-FOV ratio: `|plane| = 0.66 · |dir|` ≈ 66° horizontal.
pub const DEFAULT_PLANE_RATIO: f32 = 0.66;

/// Invalid camera parameters.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CameraError {
    /// Pitch is a horizon-shift *ratio* and must stay within [-1, 1].
    #[error("pitch {0} outside [-1, 1]")]
    PitchOutOfRange(f32),
}

/// Player view-point in world space.
///
/// * `dir` is the forward unit vector on the grid plane; `plane` spans half
///   the view, perpendicular to `dir`, so that screen column `x` maps to
///   the ray `dir + plane * (2x/w - 1)`.
/// * `pitch` is a *fake* vertical look: a horizon-shift ratio in [-1, 1],
///   scaled by the renderer to a quarter of the screen height.
/// * `z` is a vertical eye offset in screen units used for crouch/jump
///   (negative = crouched); the engine has no true third axis.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub pos: Vec2,
    pub dir: Vec2,
    pub plane: Vec2,
    pub z: f32,
    pitch: f32,
}

impl Camera {
    /// Camera at `pos` looking along `dir` with the default ≈66° FOV.
    pub fn new(pos: Vec2, dir: Vec2) -> Self {
        let dir = dir.normalize_or(vec2(1.0, 0.0));
        Self {
            pos,
            dir,
            plane: vec2(dir.y, -dir.x) * DEFAULT_PLANE_RATIO,
            z: 0.0,
            pitch: 0.0,
        }
    }

    /// Camera with an explicit horizontal FOV (radians).
    pub fn with_fov(pos: Vec2, dir: Vec2, fov: f32) -> Self {
        let mut cam = Self::new(pos, dir);
        cam.set_fov(fov);
        cam
    }

    /// Re-derive `plane` from `dir` for a horizontal FOV in radians.
    pub fn set_fov(&mut self, fov: f32) {
        let ratio = (fov * 0.5).tan();
        self.plane = vec2(self.dir.y, -self.dir.x) * self.dir.length() * ratio;
    }

    /// Horizon shift ratio, always in [-1, 1].
    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Set the pitch ratio; values outside [-1, 1] are rejected.
    pub fn set_pitch(&mut self, pitch: f32) -> Result<(), CameraError> {
        if !(-1.0..=1.0).contains(&pitch) {
            return Err(CameraError::PitchOutOfRange(pitch));
        }
        self.pitch = pitch;
        Ok(())
    }

    /// Nudge the pitch ratio, saturating at the [-1, 1] bounds.
    pub fn add_pitch(&mut self, delta: f32) {
        self.pitch = (self.pitch + delta).clamp(-1.0, 1.0);
    }

    /// Rotate the view (positive = counter-clockwise in grid space).
    ///
    /// `dir` and `plane` rotate together so the FOV basis stays rigid.
    pub fn rotate(&mut self, angle: f32) {
        let (s, c) = angle.sin_cos();
        let rot = |v: Vec2| vec2(v.x * c - v.y * s, v.x * s + v.y * c);
        self.dir = rot(self.dir);
        self.plane = rot(self.plane);
    }

    /// Ray through screen column `x` of `width`.
    #[inline]
    pub fn ray(&self, x: usize, width: usize) -> Vec2 {
        let camera_x = 2.0 * x as f32 / width as f32 - 1.0;
        self.dir + self.plane * camera_x
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_and_plane_are_perpendicular() {
        let cam = Camera::new(vec2(2.5, 2.5), vec2(-1.0, 0.0));
        assert!(cam.dir.dot(cam.plane).abs() < 1e-6);
        assert!((cam.plane.length() - DEFAULT_PLANE_RATIO).abs() < 1e-6);
        // lodev convention: dir=(-1,0) pairs with plane=(0,0.66)
        assert!((cam.plane - vec2(0.0, 0.66)).length() < 1e-6);
    }

    #[test]
    fn rotate_preserves_norms_over_many_frames() {
        let mut cam = Camera::new(Vec2::ZERO, vec2(1.0, 0.0));
        let theta = 0.173;
        for _ in 0..10_000 {
            cam.rotate(theta);
            cam.rotate(-theta);
        }
        assert!((cam.dir.length() - 1.0).abs() < 1e-4);
        assert!((cam.plane.length() - DEFAULT_PLANE_RATIO).abs() < 1e-4);
        assert!(cam.dir.dot(cam.plane).abs() < 1e-4);
    }

    #[test]
    fn center_ray_is_dir() {
        let cam = Camera::new(Vec2::ZERO, vec2(0.0, 1.0));
        let ray = cam.ray(32, 64);
        assert!((ray - cam.dir).length() < 1e-6);
        // leftmost column leans to dir - plane
        let left = cam.ray(0, 64);
        assert!((left - (cam.dir - cam.plane)).length() < 1e-6);
    }

    #[test]
    fn pitch_validation_and_clamp() {
        let mut cam = Camera::new(Vec2::ZERO, vec2(1.0, 0.0));
        assert!(cam.set_pitch(0.5).is_ok());
        assert_eq!(
            cam.set_pitch(1.5),
            Err(CameraError::PitchOutOfRange(1.5))
        );
        assert_eq!(cam.pitch(), 0.5);

        cam.add_pitch(2.0);
        assert_eq!(cam.pitch(), 1.0);
        cam.add_pitch(-5.0);
        assert_eq!(cam.pitch(), -1.0);
    }
}
