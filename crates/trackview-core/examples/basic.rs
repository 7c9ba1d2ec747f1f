//! Basic panel example.
//!
//! Registers one plain IMU, one reference-adjusted IMU and a head-mounted
//! display, refreshes once and prints the grouped panel as text.
//!
//! Run: `cargo run --example basic`

use std::sync::Arc;

use trackview_core::{
    AdjustmentFixes, BatteryReading, ImuReadings, MemoryConfigStore, NullSurface, PanelConfig,
    PanelModel, PanelRow, Quat, ReferenceAdjusted, Tracker, TrackerHandle, TrackerInfo,
    TrackerKind, TrackerStatus, Vec3,
};

struct DemoImu {
    info: TrackerInfo,
    heading: f32,
}

impl Tracker for DemoImu {
    fn info(&self) -> &TrackerInfo {
        &self.info
    }
    fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.heading.to_radians())
    }
    fn position(&self) -> Vec3 {
        Vec3::ZERO
    }
    fn status(&self) -> TrackerStatus {
        TrackerStatus::Ok
    }
    fn battery(&self) -> Option<BatteryReading> {
        Some(BatteryReading {
            level: 76.0,
            voltage: 3.81,
        })
    }
    fn tps(&self) -> Option<f32> {
        Some(100.0)
    }
    fn imu(&self) -> Option<ImuReadings> {
        Some(ImuReadings {
            ping: 6,
            signal_strength: -58,
            temperature: 31.2,
            ..ImuReadings::default()
        })
    }
}

struct DemoHmd {
    info: TrackerInfo,
}

impl Tracker for DemoHmd {
    fn info(&self) -> &TrackerInfo {
        &self.info
    }
    fn rotation(&self) -> Quat {
        Quat::IDENTITY
    }
    fn position(&self) -> Vec3 {
        Vec3::new(0.0, 1.72, 0.1)
    }
    fn status(&self) -> TrackerStatus {
        TrackerStatus::Ok
    }
}

fn main() {
    let config = PanelConfig {
        debug: true,
        ..PanelConfig::default()
    };
    let mut model = PanelModel::new(config, Box::new(MemoryConfigStore::new()));
    let tx = model.sender();

    tx.new_tracker_added(TrackerHandle::bare(Arc::new(DemoHmd {
        info: TrackerInfo {
            has_rotation: true,
            has_position: true,
            ..TrackerInfo::new("HMD", TrackerKind::Hmd)
        },
    })));
    tx.new_tracker_added(TrackerHandle::bare(Arc::new(DemoImu {
        info: TrackerInfo::imu("IMU 0"),
        heading: 30.0,
    })));

    // The adjusted IMU cancels its own heading with a yaw fix.
    let inner = Arc::new(DemoImu {
        info: TrackerInfo::imu("IMU 1"),
        heading: 90.0,
    });
    let fixes = AdjustmentFixes {
        yaw: Quat::from_rotation_y((-90f32).to_radians()),
        ..AdjustmentFixes::default()
    };
    tx.new_tracker_added(TrackerHandle::adjusted(Arc::new(
        ReferenceAdjusted::with_fixes(inner, fixes),
    )));

    model.scheduler().tick();
    model.process_pending(&mut NullSurface);

    let registry = model.registry();
    for row in registry.rows() {
        match row {
            PanelRow::Header { title, .. } => println!("== {title} =="),
            PanelRow::Tracker(id) => {
                let Some(entry) = registry.get(id) else {
                    continue;
                };
                for (slot, value) in entry.panel.iter() {
                    println!(
                        "  [{},{}] {:<12}{}",
                        slot.row,
                        slot.col,
                        slot.field.label(),
                        value
                    );
                }
            }
        }
    }
}
