//! Rotation helpers on top of `glam`.
//!
//! Trackers report orientation as unit quaternions. The panel shows them as
//! three Euler components, decomposed with the y-up convention used by the
//! tracker subsystem: `[x, y, z]` = `[pitch, yaw, roll]` in radians.

pub use glam::{Quat, Vec3};

/// Radians → degrees multiplier.
pub const RAD_TO_DEG: f32 = 180.0 / std::f32::consts::PI;

/// Degrees → radians multiplier.
pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

/// Threshold (as a fraction of the squared norm) past which the decomposition
/// is treated as gimbal-locked at a pole.
const POLE_THRESHOLD: f32 = 0.499;

/// Decompose a quaternion into `[x, y, z]` Euler angles (radians).
///
/// Works on non-normalized input: the squared norm is used as a correction
/// factor. Near the poles (`xy + zw` close to ±½ of the norm) the x component
/// collapses to zero and the whole heading is carried by y.
pub fn to_angles(q: Quat) -> [f32; 3] {
    let (x, y, z, w) = (q.x, q.y, q.z, q.w);
    let sqw = w * w;
    let sqx = x * x;
    let sqy = y * y;
    let sqz = z * z;
    let unit = sqx + sqy + sqz + sqw;
    let test = x * y + z * w;

    if test > POLE_THRESHOLD * unit {
        [0.0, 2.0 * x.atan2(w), std::f32::consts::FRAC_PI_2]
    } else if test < -POLE_THRESHOLD * unit {
        [0.0, -2.0 * x.atan2(w), -std::f32::consts::FRAC_PI_2]
    } else {
        let yaw = (2.0 * y * w - 2.0 * x * z).atan2(sqx - sqy - sqz + sqw);
        let roll = (2.0 * test / unit).clamp(-1.0, 1.0).asin();
        let pitch = (2.0 * x * w - 2.0 * y * z).atan2(-sqx + sqy - sqz + sqw);
        [pitch, yaw, roll]
    }
}

/// Same as [`to_angles`], converted to degrees.
pub fn to_degrees(q: Quat) -> [f32; 3] {
    to_angles(q).map(|a| a * RAD_TO_DEG)
}

/// Quaternion for a pure rotation of `yaw_deg` degrees about the vertical axis.
pub fn yaw_rotation(yaw_deg: f32) -> Quat {
    Quat::from_rotation_y(yaw_deg * DEG_TO_RAD)
}

/// True when `a` and `b` describe the same orientation within `epsilon`.
///
/// `q` and `-q` are the same rotation, so the sign of the dot product is
/// ignored.
pub fn same_rotation(a: Quat, b: Quat, epsilon: f32) -> bool {
    (1.0 - a.dot(b).abs()) <= epsilon
}
