//! Presentation model facade.
//!
//! [`PanelModel`] owns the registry, the debug flag and the presentation
//! queue. Its owner drains the queue with [`PanelModel::process_pending`] and
//! forwards the resulting layout/text signals to a [`RenderSurface`].

use log::{debug, info, warn};
use serde::Serialize;

use crate::body::{MountingRotation, TrackerPosition};
use crate::capability::{Capabilities, TrackerHandle};
use crate::config::{ConfigStore, PanelConfig, TrackerUpdate};
use crate::manifest::Field;
use crate::registry::{Registry, TrackerId};
use crate::scheduler::{Job, PresentationQueue, PresentationSender, RefreshScheduler};
use crate::tracker::TrackerKind;

/// Outbound signals to whatever draws the panel.
pub trait RenderSurface {
    /// Tracker set or debug flag changed: rebuild the layout from the model.
    fn layout_changed(&mut self, model: &PanelModel);

    /// Field values changed: redraw text.
    fn text_updated(&mut self, model: &PanelModel);
}

/// A surface that ignores every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn layout_changed(&mut self, _model: &PanelModel) {}
    fn text_updated(&mut self, _model: &PanelModel) {}
}

/// What a batch of jobs changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub jobs: usize,
    pub layout_changed: bool,
    pub text_updated: bool,
}

/// The live telemetry panel model.
pub struct PanelModel {
    registry: Registry,
    debug: bool,
    config: PanelConfig,
    store: Box<dyn ConfigStore>,
    queue: PresentationQueue,
    layout_generation: u64,
    text_generation: u64,
}

impl PanelModel {
    pub fn new(config: PanelConfig, store: Box<dyn ConfigStore>) -> Self {
        Self {
            registry: Registry::new(),
            debug: config.debug,
            config,
            store,
            queue: PresentationQueue::new(),
            layout_generation: 0,
            text_generation: 0,
        }
    }

    /// Sending handle for producer threads and the tracker subsystem.
    pub fn sender(&self) -> PresentationSender {
        self.queue.sender()
    }

    /// A scheduler wired to this model's queue with the configured delay.
    pub fn scheduler(&self) -> RefreshScheduler {
        RefreshScheduler::new(self.config.update_delay(), self.sender())
    }

    /// Drain queued jobs, apply them in order, then signal `surface` at most
    /// once per kind of change.
    pub fn process_pending(&mut self, surface: &mut dyn RenderSurface) -> Outcome {
        let mut outcome = Outcome::default();
        for job in self.queue.drain() {
            outcome.jobs += 1;
            match job {
                Job::Register(handle) => {
                    self.register(handle);
                    outcome.layout_changed = true;
                }
                Job::Remove(id) => {
                    outcome.layout_changed |= self.remove(id);
                }
                Job::SetDebug(debug) => {
                    outcome.layout_changed |= self.set_debug(debug);
                }
                Job::Refresh => {
                    self.refresh();
                    outcome.text_updated = true;
                }
            }
        }
        if outcome.layout_changed {
            surface.layout_changed(self);
        }
        if outcome.text_updated {
            surface.text_updated(self);
        }
        outcome
    }

    /// Register a tracker directly on the presentation context.
    pub fn register(&mut self, handle: TrackerHandle) -> TrackerId {
        let id = self.registry.register(handle, self.debug, self.store.as_ref());
        self.layout_generation += 1;
        id
    }

    /// Remove a tracker. Returns whether it was registered.
    pub fn remove(&mut self, id: TrackerId) -> bool {
        if self.registry.remove(id).is_none() {
            debug!("remove {id}: not registered");
            return false;
        }
        self.layout_generation += 1;
        true
    }

    /// Switch debug fields on or off. Every manifest is rebuilt when the flag
    /// actually changes; returns whether it did.
    pub fn set_debug(&mut self, debug: bool) -> bool {
        if self.debug == debug {
            return false;
        }
        self.debug = debug;
        info!("debug fields {}", if debug { "on" } else { "off" });
        self.registry.rebuild_panels(debug, self.store.as_ref());
        self.layout_generation += 1;
        true
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Recompute every panel's values. Returns the number of changed fields.
    pub fn refresh(&mut self) -> usize {
        let changed = self.registry.refresh_all();
        self.text_generation += 1;
        changed
    }

    /// User picked a body designation for a tracker.
    ///
    /// Rejected (returns `false`) for unknown ids and trackers without the
    /// designation selector.
    pub fn select_designation(&mut self, id: TrackerId, position: TrackerPosition) -> bool {
        let Some(entry) = self.registry.get_mut(id) else {
            warn!("designation edit for unknown tracker {id}");
            return false;
        };
        if !entry.panel.manifest().contains(Field::Designation) {
            warn!("designation edit rejected: '{}' is not editable", entry.name());
            return false;
        }
        entry.handle.tracker().set_body_position(position);
        entry
            .panel
            .set(Field::Designation, position.name().to_string());
        let name = entry.name().to_string();
        self.store
            .tracker_updated(&name, &TrackerUpdate::Designation(position));
        info!("'{name}' designated {position}");
        true
    }

    /// User picked a mounting rotation for an IMU.
    ///
    /// Rejected (returns `false`) for unknown ids and trackers without the
    /// mounting selector.
    pub fn select_mounting(&mut self, id: TrackerId, mounting: MountingRotation) -> bool {
        let Some(entry) = self.registry.get_mut(id) else {
            warn!("mounting edit for unknown tracker {id}");
            return false;
        };
        if !entry.panel.manifest().contains(Field::Mounting) {
            warn!("mounting edit rejected: '{}' has no mounting", entry.name());
            return false;
        }
        entry
            .handle
            .unwrap_once()
            .set_mounting_rotation(mounting.quaternion());
        entry.panel.set(Field::Mounting, mounting.name().to_string());
        let name = entry.name().to_string();
        self.store
            .tracker_updated(&name, &TrackerUpdate::Mounting(mounting));
        info!("'{name}' mounted {mounting}");
        true
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Bumped on every structural change.
    pub fn layout_generation(&self) -> u64 {
        self.layout_generation
    }

    /// Bumped on every refresh.
    pub fn text_generation(&self) -> u64 {
        self.text_generation
    }

    /// Serializable view of the whole model, in display order.
    pub fn snapshot(&self) -> PanelSnapshot {
        let groups = self
            .registry
            .groups()
            .iter()
            .map(|group| GroupSnapshot {
                kind: group.kind,
                title: group.title,
                trackers: group
                    .members
                    .iter()
                    .filter_map(|id| self.registry.get(*id))
                    .map(|entry| TrackerSnapshot {
                        id: entry.id,
                        name: entry.name().to_string(),
                        capabilities: entry.caps,
                        fields: entry
                            .panel
                            .iter()
                            .map(|(slot, value)| FieldSnapshot {
                                field: slot.field,
                                label: slot.field.label(),
                                row: slot.row,
                                col: slot.col,
                                value: value.to_string(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        PanelSnapshot {
            version: crate::VERSION,
            debug: self.debug,
            update_delay_ms: self.config.update_delay_ms,
            tracker_count: self.registry.len(),
            groups,
        }
    }
}

/// Serializable model export.
#[derive(Debug, Clone, Serialize)]
pub struct PanelSnapshot {
    pub version: &'static str,
    pub debug: bool,
    pub update_delay_ms: u64,
    pub tracker_count: usize,
    pub groups: Vec<GroupSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSnapshot {
    pub kind: TrackerKind,
    pub title: &'static str,
    pub trackers: Vec<TrackerSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackerSnapshot {
    pub id: TrackerId,
    pub name: String,
    pub capabilities: Capabilities,
    pub fields: Vec<FieldSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSnapshot {
    pub field: Field,
    pub label: &'static str,
    pub row: u16,
    pub col: u16,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::MemoryConfigStore;
    use crate::math::{Quat, Vec3, same_rotation};
    use crate::tracker::{ImuReadings, Tracker, TrackerInfo, TrackerStatus};

    // -----------------------------------------------------------------------
    // Mocks
    // -----------------------------------------------------------------------

    struct MockImu {
        info: TrackerInfo,
        body: Mutex<Option<TrackerPosition>>,
        mounting: Mutex<Quat>,
    }

    impl MockImu {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                info: TrackerInfo::imu(name),
                body: Mutex::new(None),
                mounting: Mutex::new(Quat::IDENTITY),
            })
        }
    }

    impl Tracker for MockImu {
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
        fn imu(&self) -> Option<ImuReadings> {
            Some(ImuReadings {
                mounting_rotation: *self.mounting.lock().unwrap(),
                ..ImuReadings::default()
            })
        }
        fn body_position(&self) -> Option<TrackerPosition> {
            *self.body.lock().unwrap()
        }
        fn set_body_position(&self, position: TrackerPosition) {
            *self.body.lock().unwrap() = Some(position);
        }
        fn set_mounting_rotation(&self, rotation: Quat) {
            *self.mounting.lock().unwrap() = rotation;
        }
    }

    struct MockHmd {
        info: TrackerInfo,
    }

    impl Tracker for MockHmd {
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

    #[derive(Default)]
    struct Recorder {
        layouts: usize,
        texts: usize,
    }

    impl RenderSurface for Recorder {
        fn layout_changed(&mut self, _model: &PanelModel) {
            self.layouts += 1;
        }
        fn text_updated(&mut self, _model: &PanelModel) {
            self.texts += 1;
        }
    }

    fn model() -> (PanelModel, Arc<MemoryConfigStore>) {
        let store = Arc::new(MemoryConfigStore::new());
        let model = PanelModel::new(PanelConfig::default(), Box::new(Arc::clone(&store)));
        (model, store)
    }

    fn hmd() -> TrackerHandle {
        TrackerHandle::bare(Arc::new(MockHmd {
            info: TrackerInfo::new("HMD", TrackerKind::Hmd),
        }))
    }

    // -----------------------------------------------------------------------
    // Job processing
    // -----------------------------------------------------------------------

    #[test]
    fn queued_jobs_signal_surface_once_per_batch() {
        let (mut model, _) = model();
        let tx = model.sender();
        tx.new_tracker_added(TrackerHandle::bare(MockImu::new("a")));
        tx.new_tracker_added(hmd());
        tx.refresh();
        tx.refresh();

        let mut surface = Recorder::default();
        let outcome = model.process_pending(&mut surface);
        assert_eq!(outcome.jobs, 4);
        assert_eq!(surface.layouts, 1);
        assert_eq!(surface.texts, 1);
        assert_eq!(model.registry().len(), 2);
    }

    #[test]
    fn empty_queue_signals_nothing() {
        let (mut model, _) = model();
        let mut surface = Recorder::default();
        assert_eq!(model.process_pending(&mut surface), Outcome::default());
        assert_eq!(surface.layouts + surface.texts, 0);
    }

    #[test]
    fn unchanged_debug_flag_is_not_a_layout_change() {
        let (mut model, _) = model();
        assert!(!model.set_debug(false));
        assert!(model.set_debug(true));
        assert!(model.debug());
        assert_eq!(model.layout_generation(), 1);
    }

    #[test]
    fn scheduler_feeds_refresh_jobs() {
        let (mut model, _) = model();
        let sched = model.scheduler();
        assert!(sched.tick_at(std::time::Duration::from_millis(0)));
        let outcome = model.process_pending(&mut NullSurface);
        assert!(outcome.text_updated);
        assert_eq!(model.text_generation(), 1);
    }

    #[test]
    fn removing_unknown_tracker_is_not_a_layout_change() {
        let (mut model, _) = model();
        let id = model.register(hmd());
        assert!(model.remove(id));
        model.sender().remove(id);
        let outcome = model.process_pending(&mut NullSurface);
        assert!(!outcome.layout_changed);
    }

    // -----------------------------------------------------------------------
    // User edits
    // -----------------------------------------------------------------------

    #[test]
    fn designation_edit_updates_tracker_panel_and_store() {
        let (mut model, store) = model();
        let imu = MockImu::new("IMU 1");
        let id = model.register(TrackerHandle::bare(imu.clone()));

        assert!(model.select_designation(id, TrackerPosition::LeftFoot));
        assert_eq!(imu.body_position(), Some(TrackerPosition::LeftFoot));
        let panel = &model.registry().get(id).unwrap().panel;
        assert_eq!(panel.designation(), Some(TrackerPosition::LeftFoot));
        assert_eq!(
            store.tracker_config("IMU 1").unwrap().designation.as_deref(),
            Some("body:left_foot")
        );
    }

    #[test]
    fn designation_survives_debug_rebuild() {
        let (mut model, _) = model();
        let id = model.register(TrackerHandle::bare(MockImu::new("IMU 1")));
        model.select_designation(id, TrackerPosition::Chest);
        model.set_debug(true);
        let panel = &model.registry().get(id).unwrap().panel;
        assert_eq!(panel.value(Field::Designation), Some("CHEST"));
    }

    #[test]
    fn mounting_edit_reaches_inner_imu() {
        let (mut model, store) = model();
        let imu = MockImu::new("IMU 1");
        let wrapper = Arc::new(crate::adjusted::ReferenceAdjusted::new(imu.clone()));
        let id = model.register(TrackerHandle::adjusted(wrapper));

        assert!(model.select_mounting(id, MountingRotation::Left));
        assert!(same_rotation(
            *imu.mounting.lock().unwrap(),
            MountingRotation::Left.quaternion(),
            1e-6
        ));
        assert_eq!(
            store.tracker_config("IMU 1").unwrap().mounting,
            Some(MountingRotation::Left)
        );

        // A rebuilt panel reads the mounting back from the device.
        model.set_debug(true);
        let panel = &model.registry().get(id).unwrap().panel;
        assert_eq!(panel.mounting(), Some(MountingRotation::Left));
    }

    #[test]
    fn edits_on_non_editable_or_unknown_trackers_are_rejected() {
        let (mut model, store) = model();
        let id = model.register(hmd());
        assert!(!model.select_designation(id, TrackerPosition::Chest));
        assert!(!model.select_mounting(id, MountingRotation::Front));
        model.remove(id);
        assert!(!model.select_designation(id, TrackerPosition::Chest));
        assert!(store.is_empty());
    }

    // -----------------------------------------------------------------------
    // Snapshot
    // -----------------------------------------------------------------------

    #[test]
    fn snapshot_follows_display_order() {
        let (mut model, _) = model();
        model.register(hmd());
        model.register(TrackerHandle::bare(MockImu::new("IMU 1")));
        model.refresh();

        let snap = model.snapshot();
        assert_eq!(snap.tracker_count, 2);
        assert_eq!(snap.groups[0].title, "IMU");
        assert_eq!(snap.groups[1].title, "HMD");
        let imu = &snap.groups[0].trackers[0];
        assert_eq!(imu.name, "IMU 1");
        assert!(imu.fields.iter().any(|f| f.field == Field::Signal && f.value == "N/A"));

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["groups"][1]["trackers"][0]["name"], "HMD");
    }
}
