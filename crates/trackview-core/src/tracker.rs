//! Tracker abstraction consumed by the panel.
//!
//! Every device (or computed pose) implements the [`Tracker`] trait, which
//! provides static metadata via [`TrackerInfo`] and pull-style, non-blocking
//! reads of its current state. Optional readings default to `None` so a
//! tracker only implements what its hardware actually reports.

use serde::Serialize;

use crate::body::TrackerPosition;
use crate::math::{Quat, Vec3};

/// Concrete tracker variant, used for grouping and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TrackerKind {
    /// Inertial measurement unit (body-worn sensor).
    Imu,
    /// Head-mounted display.
    Hmd,
    /// Pose computed from other trackers.
    Computed,
    /// Anything else, identified by its type name.
    Other(&'static str),
}

impl TrackerKind {
    /// Sort priority for display. Lower sorts first.
    pub fn sort_key(self) -> u32 {
        match self {
            Self::Imu => 0,
            Self::Hmd => 100,
            Self::Computed => 200,
            Self::Other(_) => 1000,
        }
    }

    /// Group header title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Imu => "IMU",
            Self::Hmd => "HMD",
            Self::Computed => "Computed",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Connection/health status reported by a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TrackerStatus {
    #[default]
    Disconnected,
    Ok,
    Busy,
    Error,
    Occluded,
}

impl TrackerStatus {
    /// Upper-case status name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "DISCONNECTED",
            Self::Ok => "OK",
            Self::Busy => "BUSY",
            Self::Error => "ERROR",
            Self::Occluded => "OCCLUDED",
        }
    }
}

impl std::fmt::Display for TrackerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static metadata about a tracker.
///
/// The flags are declared once by the tracker implementation and never change
/// over its lifetime. The panel snapshots them into a
/// [`Capabilities`](crate::capability::Capabilities) record at registration.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerInfo {
    /// Descriptive name shown in the panel header (e.g. `"IMU 3 (udp://...)"`).
    pub name: String,
    /// Concrete variant.
    pub kind: TrackerKind,
    /// Whether the tracker reports a meaningful rotation.
    pub has_rotation: bool,
    /// Whether the tracker reports a meaningful position.
    pub has_position: bool,
    /// Whether [`Tracker::battery`] is backed by real data.
    pub has_battery: bool,
    /// Whether [`Tracker::tps`] is backed by real data.
    pub has_tps: bool,
    /// Whether the user may assign a body designation to this tracker.
    pub user_editable: bool,
}

impl TrackerInfo {
    /// Metadata with every optional capability switched off.
    pub fn new(name: impl Into<String>, kind: TrackerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            has_rotation: false,
            has_position: false,
            has_battery: false,
            has_tps: false,
            user_editable: false,
        }
    }

    /// Metadata for a typical body-worn IMU: rotation, battery, tick rate,
    /// user-editable.
    pub fn imu(name: impl Into<String>) -> Self {
        Self {
            has_rotation: true,
            has_battery: true,
            has_tps: true,
            user_editable: true,
            ..Self::new(name, TrackerKind::Imu)
        }
    }
}

/// Battery reading. `0.0` in either field means "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BatteryReading {
    /// Charge level in percent (0–100).
    pub level: f32,
    /// Cell voltage in volts.
    pub voltage: f32,
}

/// IMU-specific readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuReadings {
    /// Round-trip latency in milliseconds.
    pub ping: i32,
    /// Signal strength in dBm, `-1` when unavailable.
    pub signal_strength: i32,
    /// Sensor fusion calibration status.
    pub calibration_status: i32,
    /// Magnetometer calibration status.
    pub mag_calibration_status: i32,
    /// Magnetometer accuracy in radians.
    pub magnetometer_accuracy: f32,
    /// Chip temperature in °C. Exactly `0.0` means no reading received.
    pub temperature: f32,
    /// Fused orientation as reported by the sensor.
    pub rot_quaternion: Quat,
    /// Orientation derived from the magnetometer alone.
    pub rot_mag_quaternion: Quat,
    /// Correction applied on top of the fused orientation.
    pub correction: Quat,
    /// Rotation adjustment applied by the sensor.
    pub rot_adjust: Quat,
    /// How the sensor is mounted on the body.
    pub mounting_rotation: Quat,
}

impl Default for ImuReadings {
    fn default() -> Self {
        Self {
            ping: 0,
            signal_strength: -1,
            calibration_status: 0,
            mag_calibration_status: 0,
            magnetometer_accuracy: 0.0,
            temperature: 0.0,
            rot_quaternion: Quat::IDENTITY,
            rot_mag_quaternion: Quat::IDENTITY,
            correction: Quat::IDENTITY,
            rot_adjust: Quat::IDENTITY,
            mounting_rotation: Quat::IDENTITY,
        }
    }
}

/// Trait every tracker must implement.
///
/// All reads are snapshot reads that must not block. Implementations shared
/// with producer threads use interior mutability for per-field atomicity.
pub trait Tracker: Send + Sync {
    /// Tracker metadata.
    fn info(&self) -> &TrackerInfo;

    /// Current orientation as a unit quaternion.
    fn rotation(&self) -> Quat;

    /// Current position.
    fn position(&self) -> Vec3;

    /// Current status.
    fn status(&self) -> TrackerStatus;

    /// Battery reading, for trackers that declare `has_battery`.
    fn battery(&self) -> Option<BatteryReading> {
        None
    }

    /// Ticks (packets) per second, for trackers that declare `has_tps`.
    fn tps(&self) -> Option<f32> {
        None
    }

    /// IMU readings, for trackers of kind [`TrackerKind::Imu`].
    fn imu(&self) -> Option<ImuReadings> {
        None
    }

    /// Current body designation, if one was assigned.
    fn body_position(&self) -> Option<TrackerPosition> {
        None
    }

    /// Assign a body designation. Ignored by trackers that are not editable.
    fn set_body_position(&self, _position: TrackerPosition) {}

    /// Change the mounting rotation. Ignored by non-IMU trackers.
    fn set_mounting_rotation(&self, _rotation: Quat) {}

    /// Convenience: name from info.
    fn name(&self) -> &str {
        &self.info().name
    }
}
