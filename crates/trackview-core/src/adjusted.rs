//! Reference-adjusted wrapper tracker.
//!
//! Wraps exactly one inner tracker and applies three correction transforms to
//! its rotation. The fixes live on the wrapper only: unwrapping the tracker
//! yields the raw inner device, which knows nothing about them.

use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::body::TrackerPosition;
use crate::math::{Quat, Vec3};
use crate::tracker::{BatteryReading, ImuReadings, Tracker, TrackerInfo, TrackerStatus};

/// The three correction quaternions stored on a wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdjustmentFixes {
    /// Compensates for how the tracker is attached to the body.
    pub attachment: Quat,
    /// Aligns the tracker's heading with the reference heading.
    pub yaw: Quat,
    /// Compensates for gyroscope drift.
    pub gyro: Quat,
}

impl Default for AdjustmentFixes {
    fn default() -> Self {
        Self {
            attachment: Quat::IDENTITY,
            yaw: Quat::IDENTITY,
            gyro: Quat::IDENTITY,
        }
    }
}

impl AdjustmentFixes {
    /// Apply the fixes to a raw rotation: `yaw * (gyro * raw * attachment)`.
    pub fn apply(&self, raw: Quat) -> Quat {
        self.yaw * (self.gyro * raw * self.attachment)
    }
}

/// A tracker whose rotation is corrected against a reference.
pub struct ReferenceAdjusted {
    inner: Arc<dyn Tracker>,
    fixes: RwLock<AdjustmentFixes>,
}

impl ReferenceAdjusted {
    /// Wrap `inner` with identity fixes.
    pub fn new(inner: Arc<dyn Tracker>) -> Self {
        Self::with_fixes(inner, AdjustmentFixes::default())
    }

    /// Wrap `inner` with the given fixes.
    pub fn with_fixes(inner: Arc<dyn Tracker>, fixes: AdjustmentFixes) -> Self {
        Self {
            inner,
            fixes: RwLock::new(fixes),
        }
    }

    /// The wrapped tracker.
    pub fn inner(&self) -> &Arc<dyn Tracker> {
        &self.inner
    }

    /// Current fixes.
    pub fn fixes(&self) -> AdjustmentFixes {
        match self.fixes.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Replace the fixes (called by the device subsystem after a reset).
    pub fn set_fixes(&self, fixes: AdjustmentFixes) {
        match self.fixes.write() {
            Ok(mut guard) => *guard = fixes,
            Err(poisoned) => *poisoned.into_inner() = fixes,
        }
    }
}

impl Tracker for ReferenceAdjusted {
    fn info(&self) -> &TrackerInfo {
        self.inner.info()
    }

    fn rotation(&self) -> Quat {
        self.fixes().apply(self.inner.rotation())
    }

    fn position(&self) -> Vec3 {
        self.inner.position()
    }

    fn status(&self) -> TrackerStatus {
        self.inner.status()
    }

    fn battery(&self) -> Option<BatteryReading> {
        self.inner.battery()
    }

    fn tps(&self) -> Option<f32> {
        self.inner.tps()
    }

    fn imu(&self) -> Option<ImuReadings> {
        self.inner.imu()
    }

    fn body_position(&self) -> Option<TrackerPosition> {
        self.inner.body_position()
    }

    fn set_body_position(&self, position: TrackerPosition) {
        self.inner.set_body_position(position);
    }

    fn set_mounting_rotation(&self, rotation: Quat) {
        self.inner.set_mounting_rotation(rotation);
    }
}
