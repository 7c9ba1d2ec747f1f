//! Recomputation of panel values from live tracker readings.
//!
//! Only fields present in the panel's manifest are computed. Selector and
//! name fields are set when the panel is built and never refreshed.

use crate::capability::TrackerHandle;
use crate::format::{
    format_angles, format_angles_compact, format_battery, format_calibration,
    format_mag_accuracy, format_ping, format_position, format_signal, format_status,
    format_temperature, format_tps,
};
use crate::manifest::{Field, PanelState};

const IMU_FIELDS: [Field; 9] = [
    Field::Ping,
    Field::Signal,
    Field::Quaternion,
    Field::RawMag,
    Field::Temperature,
    Field::Calibration,
    Field::MagAccuracy,
    Field::Correction,
    Field::RotAdjust,
];

/// Refresh every present field of `panel` from `handle`.
///
/// Returns the number of fields whose text changed. A reading that comes back
/// `None` leaves the previous text in place.
pub fn refresh_panel(handle: &TrackerHandle, panel: &mut PanelState) -> usize {
    let tracker = handle.tracker();
    let real = handle.unwrap_once();
    let fields: Vec<Field> = panel.manifest().fields().collect();

    let imu = if IMU_FIELDS.iter().any(|f| fields.contains(f)) {
        real.imu()
    } else {
        None
    };
    let fixes = handle.fixes();

    let mut changed = 0;
    for field in fields {
        let text = match field {
            Field::Name | Field::Designation | Field::Mounting => None,
            Field::Status => Some(format_status(tracker.status())),
            Field::Rotation => Some(format_angles(tracker.rotation())),
            Field::Raw => Some(format_angles(real.rotation())),
            Field::Position => {
                let p = tracker.position();
                Some(format_position(p.x, p.y, p.z))
            }
            Field::Tps => real.tps().map(format_tps),
            Field::Battery => real
                .battery()
                .map(|b| format_battery(b.level, b.voltage)),
            Field::Ping => imu.map(|r| format_ping(r.ping)),
            Field::Signal => imu.map(|r| format_signal(r.signal_strength)),
            Field::Quaternion => imu.map(|r| format_angles_compact(r.rot_quaternion)),
            Field::RawMag => imu.map(|r| format_angles_compact(r.rot_mag_quaternion)),
            Field::Temperature => imu.map(|r| format_temperature(r.temperature)),
            Field::Calibration => {
                imu.map(|r| format_calibration(r.calibration_status, r.mag_calibration_status))
            }
            Field::MagAccuracy => imu.map(|r| format_mag_accuracy(r.magnetometer_accuracy)),
            Field::Correction => imu.map(|r| format_angles_compact(r.correction)),
            Field::RotAdjust => imu.map(|r| format_angles_compact(r.rot_adjust)),
            Field::AttachmentFix => fixes.map(|f| format_angles_compact(f.attachment)),
            Field::YawFix => fixes.map(|f| format_angles_compact(f.yaw)),
            Field::GyroFix => fixes.map(|f| format_angles_compact(f.gyro)),
        };
        if let Some(text) = text
            && panel.set(field, text)
        {
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::adjusted::{AdjustmentFixes, ReferenceAdjusted};
    use crate::manifest::build_manifest;
    use crate::math::{Quat, Vec3, yaw_rotation};
    use crate::tracker::{
        BatteryReading, ImuReadings, Tracker, TrackerInfo, TrackerKind, TrackerStatus,
    };

    struct MockImu {
        info: TrackerInfo,
        rotation: Mutex<Quat>,
        readings: Mutex<Option<ImuReadings>>,
    }

    impl MockImu {
        fn new(readings: ImuReadings) -> Arc<Self> {
            Arc::new(Self {
                info: TrackerInfo::imu("IMU 1"),
                rotation: Mutex::new(yaw_rotation(90.0)),
                readings: Mutex::new(Some(readings)),
            })
        }
    }

    impl Tracker for MockImu {
        fn info(&self) -> &TrackerInfo {
            &self.info
        }
        fn rotation(&self) -> Quat {
            *self.rotation.lock().unwrap()
        }
        fn position(&self) -> Vec3 {
            Vec3::ZERO
        }
        fn status(&self) -> TrackerStatus {
            TrackerStatus::Ok
        }
        fn battery(&self) -> Option<BatteryReading> {
            Some(BatteryReading {
                level: 80.0,
                voltage: 3.7,
            })
        }
        fn tps(&self) -> Option<f32> {
            Some(100.0)
        }
        fn imu(&self) -> Option<ImuReadings> {
            *self.readings.lock().unwrap()
        }
    }

    fn readings() -> ImuReadings {
        ImuReadings {
            ping: 7,
            signal_strength: -40,
            temperature: 36.6,
            calibration_status: 3,
            mag_calibration_status: 1,
            ..ImuReadings::default()
        }
    }

    fn panel_for(handle: &TrackerHandle, debug: bool) -> PanelState {
        PanelState::new(build_manifest(&handle.capabilities(), debug))
    }

    #[test]
    fn refreshes_imu_fields() {
        let handle = TrackerHandle::bare(MockImu::new(readings()));
        let mut panel = panel_for(&handle, false);
        let changed = refresh_panel(&handle, &mut panel);

        assert_eq!(changed, 7);
        assert_eq!(panel.value(Field::Ping), Some("7"));
        assert_eq!(panel.value(Field::Signal), Some("100% (-40 dBm)"));
        assert_eq!(panel.value(Field::Tps), Some("100"));
        assert_eq!(panel.value(Field::Status), Some("ok    "));
        assert_eq!(panel.value(Field::Battery), Some("80% (3.7V)"));
        assert_eq!(panel.value(Field::Rotation), Some("   0   90    0 "));
        assert_eq!(panel.value(Field::Raw), Some("   0   90    0 "));
    }

    #[test]
    fn debug_imu_fields() {
        let handle = TrackerHandle::bare(MockImu::new(readings()));
        let mut panel = panel_for(&handle, true);
        refresh_panel(&handle, &mut panel);

        assert_eq!(panel.value(Field::Temperature), Some("36.6∘C"));
        assert_eq!(panel.value(Field::Calibration), Some("3 / 1"));
        assert_eq!(panel.value(Field::MagAccuracy), Some("0°"));
        assert_eq!(panel.value(Field::Quaternion), Some("0 0 0"));
        assert_eq!(panel.value(Field::AttachmentFix), None);
    }

    #[test]
    fn second_refresh_without_change_reports_nothing() {
        let handle = TrackerHandle::bare(MockImu::new(readings()));
        let mut panel = panel_for(&handle, true);
        refresh_panel(&handle, &mut panel);
        assert_eq!(refresh_panel(&handle, &mut panel), 0);
    }

    #[test]
    fn missing_readings_keep_previous_text() {
        let imu = MockImu::new(readings());
        let handle = TrackerHandle::bare(imu.clone());
        let mut panel = panel_for(&handle, false);
        refresh_panel(&handle, &mut panel);

        *imu.readings.lock().unwrap() = None;
        refresh_panel(&handle, &mut panel);
        assert_eq!(panel.value(Field::Ping), Some("7"));
    }

    #[test]
    fn adjusted_rotation_differs_from_raw() {
        let imu = MockImu::new(readings());
        let wrapper = Arc::new(ReferenceAdjusted::with_fixes(
            imu,
            AdjustmentFixes {
                yaw: yaw_rotation(-90.0),
                ..AdjustmentFixes::default()
            },
        ));
        let handle = TrackerHandle::adjusted(wrapper);
        let mut panel = panel_for(&handle, true);
        refresh_panel(&handle, &mut panel);

        assert_eq!(panel.value(Field::Rotation), Some("   0    0    0 "));
        assert_eq!(panel.value(Field::Raw), Some("   0   90    0 "));
        assert_eq!(panel.value(Field::YawFix), Some("0 -90 0"));
        assert_eq!(panel.value(Field::AttachmentFix), Some("0 0 0"));
        assert_eq!(panel.value(Field::GyroFix), Some("0 0 0"));
        // IMU readings come through the unwrapped tracker.
        assert_eq!(panel.value(Field::Ping), Some("7"));
    }

    #[test]
    fn position_only_when_declared() {
        struct Hmd {
            info: TrackerInfo,
        }
        impl Tracker for Hmd {
            fn info(&self) -> &TrackerInfo {
                &self.info
            }
            fn rotation(&self) -> Quat {
                Quat::IDENTITY
            }
            fn position(&self) -> Vec3 {
                Vec3::new(0.0, 1.7, -0.25)
            }
            fn status(&self) -> TrackerStatus {
                TrackerStatus::Occluded
            }
        }
        let handle = TrackerHandle::bare(Arc::new(Hmd {
            info: TrackerInfo {
                has_rotation: true,
                has_position: true,
                ..TrackerInfo::new("HMD", TrackerKind::Hmd)
            },
        }));
        let mut panel = panel_for(&handle, false);
        refresh_panel(&handle, &mut panel);
        assert_eq!(panel.value(Field::Position), Some("     0    1.7   -0.3"));
        assert_eq!(panel.value(Field::Status), Some("occluded "));
        assert_eq!(panel.value(Field::Ping), None);
    }
}
