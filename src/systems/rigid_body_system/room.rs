use cgmath::{InnerSpace, Vector3};

use crate::domain::config::RoomConfig;

/// Render targets outside this aspect range get the nearest clamped room.
const MIN_ASPECT: f32 = 0.5;
const MAX_ASPECT: f32 = 3.0;

/// Static half-space; points with `normal · p >= offset` are inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    /// Unit normal pointing into the room.
    pub normal: Vector3<f32>,
    pub offset: f32,
}

impl Plane {
    fn new(normal: Vector3<f32>, offset: f32) -> Self {
        Self {
            normal: normal.normalize(),
            offset,
        }
    }

    /// Positive when `p` is behind the plane (outside the room).
    #[inline]
    pub fn depth(&self, p: Vector3<f32>) -> f32 {
        self.offset - self.normal.dot(p)
    }
}

/// Floor at y = 0, four walls and a ceiling.
#[derive(Clone, Debug, PartialEq)]
pub struct Room {
    pub half_width: f32,
    pub half_depth: f32,
    pub height: f32,
    pub planes: [Plane; 6],
}

impl Room {
    /// Width follows the render target's aspect ratio.
    pub fn new(width: u32, height: u32, config: &RoomConfig) -> Self {
        let aspect = if width > 0 && height > 0 {
            (width as f32 / height as f32).clamp(MIN_ASPECT, MAX_ASPECT)
        } else {
            1.0
        };
        let half_width = config.base_half_width * aspect;
        let half_depth = config.half_depth;
        let h = config.height;

        let planes = [
            Plane::new(Vector3::new(0.0, 1.0, 0.0), 0.0),
            Plane::new(Vector3::new(1.0, 0.0, 0.0), -half_width),
            Plane::new(Vector3::new(-1.0, 0.0, 0.0), -half_width),
            Plane::new(Vector3::new(0.0, 0.0, 1.0), -half_depth),
            Plane::new(Vector3::new(0.0, 0.0, -1.0), -half_depth),
            Plane::new(Vector3::new(0.0, -1.0, 0.0), -h),
        ];
        Self {
            half_width,
            half_depth,
            height: h,
            planes,
        }
    }

    pub fn floor(&self) -> &Plane {
        &self.planes[0]
    }

    pub fn contains(&self, p: Vector3<f32>) -> bool {
        self.planes.iter().all(|pl| pl.depth(p) <= 0.0)
    }
}
