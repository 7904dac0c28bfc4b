use serde::{Deserialize, Serialize};

// ── Positions ───────────────────────────────────────────────────────

/// Integer coordinate of one voxel cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// World-space center of the cell.
    pub fn center(self) -> Vec3 {
        Vec3 {
            x: self.x as f64 + 0.5,
            y: self.y as f64 + 0.5,
            z: self.z as f64 + 0.5,
        }
    }

    /// Cell containing a world-space point.
    pub fn containing(p: Vec3) -> Self {
        Self {
            x: p.x.floor() as i32,
            y: p.y.floor() as i32,
            z: p.z.floor() as i32,
        }
    }
}

impl std::fmt::Display for CellPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(self, other: Vec3) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

// ── Look angles ─────────────────────────────────────────────────────

/// Yaw/pitch (degrees) that aim an eye at a world-space point.
///
/// Yaw 0 faces +z, positive yaw turns toward -x; pitch is negative looking
/// up. Matches the host's orientation convention.
pub fn look_angles(eye: Vec3, target: Vec3) -> (f64, f64) {
    let dx = target.x - eye.x;
    let dy = target.y - eye.y;
    let dz = target.z - eye.z;

    let horizontal = (dx * dx + dz * dz).sqrt();
    let pitch = -dy.atan2(horizontal).to_degrees();
    let yaw = (-dx).atan2(dz).to_degrees();
    (yaw, pitch)
}

/// Normalize an angle into (-180, 180].
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    }
    if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Shortest signed delta from `current` to `target`, in (-180, 180].
#[inline]
pub fn angle_difference(current: f64, target: f64) -> f64 {
    normalize_angle(target - current)
}

/// Angular separation in degrees between two view directions.
///
/// Both orientations become unit vectors; the clamped dot product guards
/// acos against floating-point drift just outside [-1, 1].
pub fn angular_distance(yaw1: f64, pitch1: f64, yaw2: f64, pitch2: f64) -> f64 {
    let (y1, p1) = (yaw1.to_radians(), pitch1.to_radians());
    let (y2, p2) = (yaw2.to_radians(), pitch2.to_radians());

    let x1 = p1.cos() * y1.sin();
    let v1 = p1.sin();
    let z1 = p1.cos() * y1.cos();

    let x2 = p2.cos() * y2.sin();
    let v2 = p2.sin();
    let z2 = p2.cos() * y2.cos();

    let dot = (x1 * x2 + v1 * v2 + z1 * z2).clamp(-1.0, 1.0);
    dot.acos().to_degrees()
}

// ── Easing ──────────────────────────────────────────────────────────

/// Cubic smoothstep s(t) = t²(3 - 2t) on [0, 1].
#[inline]
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
