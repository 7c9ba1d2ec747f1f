//! Capability discovery for possibly-wrapped trackers.
//!
//! A [`TrackerHandle`] is either a bare tracker or a reference-adjusted
//! wrapper around one. Device capabilities (IMU, battery, tick rate, signal)
//! are always read from the tracker after unwrapping exactly one level; the
//! wrapper's own data (its fixes, the adjusted flag, editability) is read from
//! the handle as given.

use std::sync::Arc;

use serde::Serialize;

use crate::adjusted::{AdjustmentFixes, ReferenceAdjusted};
use crate::tracker::{Tracker, TrackerKind};

/// Non-owning reference to a tracker, tagged by whether it is wrapped.
#[derive(Clone)]
pub enum TrackerHandle {
    /// A tracker used as-is.
    Bare(Arc<dyn Tracker>),
    /// A reference-adjusted wrapper around an inner tracker.
    Adjusted(Arc<ReferenceAdjusted>),
}

impl TrackerHandle {
    /// Wrap a bare tracker.
    pub fn bare(tracker: Arc<dyn Tracker>) -> Self {
        Self::Bare(tracker)
    }

    /// Wrap a reference-adjusted tracker.
    pub fn adjusted(tracker: Arc<ReferenceAdjusted>) -> Self {
        Self::Adjusted(tracker)
    }

    /// The tracker as registered (the wrapper, if any).
    pub fn tracker(&self) -> &dyn Tracker {
        match self {
            Self::Bare(t) => t.as_ref(),
            Self::Adjusted(t) => t.as_ref() as &dyn Tracker,
        }
    }

    /// The tracker after unwrapping exactly one level.
    pub fn unwrap_once(&self) -> &dyn Tracker {
        match self {
            Self::Bare(t) => t.as_ref(),
            Self::Adjusted(t) => t.inner().as_ref(),
        }
    }

    /// Whether this handle is a reference-adjusted wrapper.
    pub fn is_reference_adjusted(&self) -> bool {
        matches!(self, Self::Adjusted(_))
    }

    /// The wrapper's fixes. `None` for bare trackers.
    pub fn fixes(&self) -> Option<AdjustmentFixes> {
        match self {
            Self::Bare(_) => None,
            Self::Adjusted(t) => Some(t.fixes()),
        }
    }

    /// Compute the capability record for this handle.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::of(self)
    }
}

impl std::fmt::Debug for TrackerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = if self.is_reference_adjusted() {
            "Adjusted"
        } else {
            "Bare"
        };
        f.debug_tuple(variant).field(&self.tracker().name()).finish()
    }
}

/// Capability record computed once per tracker at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Concrete variant of the unwrapped tracker.
    pub kind: TrackerKind,
    pub has_position: bool,
    pub has_rotation: bool,
    pub has_battery: bool,
    pub has_tps: bool,
    pub has_signal: bool,
    pub is_imu: bool,
    /// Evaluated on the original handle.
    pub reference_adjusted: bool,
    /// Evaluated on the original handle.
    pub user_editable: bool,
}

impl Capabilities {
    /// Derive capabilities from a handle.
    pub fn of(handle: &TrackerHandle) -> Self {
        let real = handle.unwrap_once().info();
        let original = handle.tracker().info();
        let is_imu = real.kind == TrackerKind::Imu;
        Self {
            kind: real.kind,
            has_position: real.has_position,
            has_rotation: real.has_rotation,
            has_battery: real.has_battery,
            has_tps: real.has_tps,
            has_signal: is_imu,
            is_imu,
            reference_adjusted: handle.is_reference_adjusted(),
            user_editable: original.user_editable,
        }
    }

    /// Display ordering key of the unwrapped variant.
    pub fn sort_key(&self) -> u32 {
        self.kind.sort_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Quat, Vec3};
    use crate::tracker::{TrackerInfo, TrackerStatus};

    struct Mock {
        info: TrackerInfo,
    }

    impl Tracker for Mock {
        fn info(&self) -> &TrackerInfo {
            &self.info
        }
        fn rotation(&self) -> Quat {
            Quat::IDENTITY
        }
        fn position(&self) -> Vec3 {
            Vec3::ZERO
        }
        fn status(&self) -> TrackerStatus {
            TrackerStatus::Ok
        }
    }

    fn imu() -> Arc<dyn Tracker> {
        Arc::new(Mock {
            info: TrackerInfo::imu("imu"),
        })
    }

    #[test]
    fn bare_imu_capabilities() {
        let caps = TrackerHandle::bare(imu()).capabilities();
        assert!(caps.is_imu);
        assert!(caps.has_signal);
        assert!(caps.has_battery);
        assert!(caps.has_tps);
        assert!(caps.user_editable);
        assert!(!caps.reference_adjusted);
        assert_eq!(caps.sort_key(), 0);
    }

    #[test]
    fn adjusted_wrapper_unwraps_one_level() {
        let wrapper = Arc::new(ReferenceAdjusted::new(imu()));
        let handle = TrackerHandle::adjusted(wrapper);
        let caps = handle.capabilities();
        assert!(caps.is_imu);
        assert!(caps.reference_adjusted);
        assert_eq!(caps.kind, TrackerKind::Imu);
        assert!(handle.fixes().is_some());
    }

    #[test]
    fn unwrap_is_not_recursive() {
        // A wrapper around a wrapper: only the outer level is removed.
        let inner: Arc<dyn Tracker> = Arc::new(ReferenceAdjusted::new(imu()));
        let outer = Arc::new(ReferenceAdjusted::new(Arc::clone(&inner)));
        let handle = TrackerHandle::adjusted(outer);
        assert!(std::ptr::addr_eq(handle.unwrap_once(), inner.as_ref()));
    }

    #[test]
    fn bare_handle_has_no_fixes() {
        let handle = TrackerHandle::bare(imu());
        assert!(handle.fixes().is_none());
        assert!(!handle.is_reference_adjusted());
    }

    #[test]
    fn non_imu_has_no_signal() {
        let hmd: Arc<dyn Tracker> = Arc::new(Mock {
            info: TrackerInfo {
                has_rotation: true,
                has_position: true,
                ..TrackerInfo::new("hmd", crate::tracker::TrackerKind::Hmd)
            },
        });
        let caps = TrackerHandle::bare(hmd).capabilities();
        assert!(!caps.is_imu);
        assert!(!caps.has_signal);
        assert!(caps.has_position);
        assert!(!caps.user_editable);
        assert_eq!(caps.sort_key(), 100);
    }
}
