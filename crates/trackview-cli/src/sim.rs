//! Simulated trackers for the terminal front-end.
//!
//! A producer thread perturbs every tracker with random jitter at a fixed
//! interval, the way a device subsystem would push samples. Readings live
//! behind per-tracker mutexes so the panel always sees a consistent sample.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;
use rand::Rng;
use trackview_core::{
    AdjustmentFixes, BatteryReading, ImuReadings, Quat, ReferenceAdjusted, Tracker,
    TrackerHandle, TrackerInfo, TrackerKind, TrackerPosition, TrackerStatus, Vec3,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ---------------------------------------------------------------------------
// Simulated IMU
// ---------------------------------------------------------------------------

struct ImuState {
    heading: f32,
    pitch: f32,
    readings: ImuReadings,
    battery: BatteryReading,
    tps: f32,
    status: TrackerStatus,
    body: Option<TrackerPosition>,
}

pub struct SimImu {
    info: TrackerInfo,
    state: Mutex<ImuState>,
}

impl SimImu {
    pub fn new(name: String, rng: &mut impl Rng) -> Self {
        let readings = ImuReadings {
            ping: rng.random_range(2..12),
            signal_strength: rng.random_range(-80..-45),
            calibration_status: 3,
            mag_calibration_status: rng.random_range(0..4),
            magnetometer_accuracy: rng.random_range(0.01..0.2),
            // Some boards never report a temperature.
            temperature: if rng.random_bool(0.75) {
                rng.random_range(28.0..38.0)
            } else {
                0.0
            },
            ..ImuReadings::default()
        };
        Self {
            info: TrackerInfo::imu(name),
            state: Mutex::new(ImuState {
                heading: rng.random_range(-180.0..180.0),
                pitch: 0.0,
                readings,
                battery: BatteryReading {
                    level: rng.random_range(40.0..100.0),
                    voltage: rng.random_range(3.6..4.2),
                },
                tps: 100.0,
                status: TrackerStatus::Ok,
                body: None,
            }),
        }
    }

    fn step(&self, rng: &mut impl Rng) {
        let mut s = lock(&self.state);
        s.heading = wrap_degrees(s.heading + rng.random_range(-4.0..4.0));
        s.pitch = (s.pitch + rng.random_range(-2.0..2.0)).clamp(-60.0, 60.0);
        let rotation = Quat::from_rotation_y(s.heading.to_radians())
            * Quat::from_rotation_x(s.pitch.to_radians());

        let r = &mut s.readings;
        r.rot_quaternion = rotation;
        r.rot_mag_quaternion = rotation * Quat::from_rotation_y(rng.random_range(-0.05..0.05));
        r.correction = Quat::from_rotation_y(rng.random_range(-0.02..0.02));
        r.ping = (r.ping + rng.random_range(-1..=1)).clamp(1, 40);
        // Occasionally the radio drops its signal reading entirely.
        r.signal_strength = if rng.random_bool(0.02) {
            -1
        } else {
            rng.random_range(-90..-40)
        };
        if r.temperature != 0.0 {
            r.temperature = (r.temperature + rng.random_range(-0.1..0.1)).clamp(20.0, 45.0);
        }

        s.tps = rng.random_range(95.0..101.0);
        s.battery.level = (s.battery.level - rng.random_range(0.0..0.01)).max(1.0);
        s.status = if rng.random_bool(0.01) {
            TrackerStatus::Busy
        } else {
            TrackerStatus::Ok
        };
    }
}

impl Tracker for SimImu {
    fn info(&self) -> &TrackerInfo {
        &self.info
    }

    fn rotation(&self) -> Quat {
        let s = lock(&self.state);
        s.readings.mounting_rotation * s.readings.rot_quaternion
    }

    fn position(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn status(&self) -> TrackerStatus {
        lock(&self.state).status
    }

    fn battery(&self) -> Option<BatteryReading> {
        Some(lock(&self.state).battery)
    }

    fn tps(&self) -> Option<f32> {
        Some(lock(&self.state).tps)
    }

    fn imu(&self) -> Option<ImuReadings> {
        Some(lock(&self.state).readings)
    }

    fn body_position(&self) -> Option<TrackerPosition> {
        lock(&self.state).body
    }

    fn set_body_position(&self, position: TrackerPosition) {
        lock(&self.state).body = Some(position);
    }

    fn set_mounting_rotation(&self, rotation: Quat) {
        lock(&self.state).readings.mounting_rotation = rotation;
    }
}

// ---------------------------------------------------------------------------
// Simulated pose trackers (HMD, computed)
// ---------------------------------------------------------------------------

struct PoseState {
    rotation: Quat,
    position: Vec3,
    status: TrackerStatus,
}

pub struct SimPose {
    info: TrackerInfo,
    state: Mutex<PoseState>,
}

impl SimPose {
    pub fn new(name: &str, kind: TrackerKind, position: Vec3) -> Self {
        Self {
            info: TrackerInfo {
                has_rotation: true,
                has_position: true,
                ..TrackerInfo::new(name, kind)
            },
            state: Mutex::new(PoseState {
                rotation: Quat::IDENTITY,
                position,
                status: TrackerStatus::Ok,
            }),
        }
    }

    fn step(&self, rng: &mut impl Rng) {
        let mut s = lock(&self.state);
        let nudge = Quat::from_rotation_y(rng.random_range(-0.03..0.03));
        s.rotation = (nudge * s.rotation).normalize();
        s.position += Vec3::new(
            rng.random_range(-0.005..0.005),
            rng.random_range(-0.003..0.003),
            rng.random_range(-0.005..0.005),
        );
        s.status = if rng.random_bool(0.005) {
            TrackerStatus::Occluded
        } else {
            TrackerStatus::Ok
        };
    }
}

impl Tracker for SimPose {
    fn info(&self) -> &TrackerInfo {
        &self.info
    }

    fn rotation(&self) -> Quat {
        lock(&self.state).rotation
    }

    fn position(&self) -> Vec3 {
        lock(&self.state).position
    }

    fn status(&self) -> TrackerStatus {
        lock(&self.state).status
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// How many trackers of each kind to simulate.
#[derive(Debug, Clone, Copy)]
pub struct SimOptions {
    pub imus: usize,
    /// How many of the IMUs are wrapped in a reference-adjusted tracker.
    pub adjusted: usize,
}

/// The simulated device subsystem.
pub struct Simulation {
    imus: Vec<Arc<SimImu>>,
    poses: Vec<Arc<SimPose>>,
    handles: Vec<TrackerHandle>,
}

impl Simulation {
    pub fn new(opts: SimOptions, rng: &mut impl Rng) -> Self {
        let mut imus = Vec::with_capacity(opts.imus);
        let mut handles = Vec::with_capacity(opts.imus + 2);

        // Computed and HMD first so the panel has to reorder them.
        let computed = Arc::new(SimPose::new(
            "Computed waist",
            TrackerKind::Computed,
            Vec3::new(0.0, 1.0, 0.0),
        ));
        let hmd = Arc::new(SimPose::new(
            "HMD",
            TrackerKind::Hmd,
            Vec3::new(0.0, 1.7, 0.0),
        ));
        handles.push(TrackerHandle::bare(computed.clone()));
        handles.push(TrackerHandle::bare(hmd.clone()));

        for i in 0..opts.imus {
            let imu = Arc::new(SimImu::new(format!("IMU {i} (udp://10.0.0.{})", 20 + i), rng));
            let handle = if i < opts.adjusted {
                let fixes = AdjustmentFixes {
                    attachment: Quat::from_rotation_x(rng.random_range(-0.2..0.2)),
                    yaw: Quat::from_rotation_y(rng.random_range(-1.0..1.0)),
                    gyro: Quat::from_rotation_y(rng.random_range(-0.05..0.05)),
                };
                TrackerHandle::adjusted(Arc::new(ReferenceAdjusted::with_fixes(
                    imu.clone(),
                    fixes,
                )))
            } else {
                TrackerHandle::bare(imu.clone())
            };
            imus.push(imu);
            handles.push(handle);
        }

        Self {
            imus,
            poses: vec![computed, hmd],
            handles,
        }
    }

    /// Handles in announcement order.
    pub fn handles(&self) -> &[TrackerHandle] {
        &self.handles
    }

    /// Advance every tracker by one sample.
    pub fn step(&self, rng: &mut impl Rng) {
        for imu in &self.imus {
            imu.step(rng);
        }
        for pose in &self.poses {
            pose.step(rng);
        }
    }

    /// Run [`Simulation::step`] on a producer thread every `interval`.
    pub fn spawn(self: Arc<Self>, interval: Duration) -> SimDriver {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let thread = thread::spawn(move || {
            debug!("simulation started, sample every {interval:?}");
            let mut rng = rand::rng();
            while flag.load(Ordering::Relaxed) {
                self.step(&mut rng);
                thread::sleep(interval);
            }
            debug!("simulation stopped");
        });
        SimDriver {
            running,
            thread: Some(thread),
        }
    }
}

/// Handle to the producer thread. Stops it on drop.
pub struct SimDriver {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SimDriver {
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

impl Drop for SimDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn wrap_degrees(deg: f32) -> f32 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}
