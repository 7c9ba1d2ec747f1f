//! Live tracker collection with deterministic display ordering.
//!
//! Entries are kept in registration order. [`Registry::rebuild`] derives the
//! display order from it: a stable sort by the unwrapped variant's sort key,
//! then consecutive runs of the same variant collected into groups. Rebuilding
//! without a membership change yields the same sequence.

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::capability::{Capabilities, TrackerHandle};
use crate::config::ConfigStore;
use crate::manifest::PanelState;
use crate::refresh::refresh_panel;
use crate::tracker::TrackerKind;

/// Identifier of a registry entry. Never reused by the same registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TrackerId(u64);

impl TrackerId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TrackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered tracker with its capability record and panel.
#[derive(Debug)]
pub struct TrackerEntry {
    pub id: TrackerId,
    pub handle: TrackerHandle,
    pub caps: Capabilities,
    pub panel: PanelState,
}

impl TrackerEntry {
    /// Descriptive name of the tracker as registered.
    pub fn name(&self) -> &str {
        self.handle.tracker().name()
    }
}

/// Consecutive trackers of the same unwrapped variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerGroup {
    pub kind: TrackerKind,
    pub title: &'static str,
    pub members: Vec<TrackerId>,
}

/// One row of the flattened display sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PanelRow {
    Header { kind: TrackerKind, title: &'static str },
    Tracker(TrackerId),
}

/// Registry of trackers and their panels.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<TrackerEntry>,
    groups: Vec<TrackerGroup>,
    next_id: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tracker and rebuild the ordering.
    ///
    /// Capabilities are computed once here; the panel is built from them, the
    /// debug flag and the tracker's stored configuration.
    pub fn register(
        &mut self,
        handle: TrackerHandle,
        debug: bool,
        store: &dyn ConfigStore,
    ) -> TrackerId {
        let id = TrackerId(self.next_id);
        self.next_id += 1;

        let caps = handle.capabilities();
        let stored = store.tracker_config(handle.tracker().name());
        let panel = PanelState::build(&handle, &caps, debug, stored.as_ref());
        debug!(
            "register {id} '{}' kind={} adjusted={} fields={}",
            handle.tracker().name(),
            caps.kind,
            caps.reference_adjusted,
            panel.manifest().len()
        );

        self.entries.push(TrackerEntry {
            id,
            handle,
            caps,
            panel,
        });
        self.rebuild();
        id
    }

    /// Remove a tracker and its panel. Returns the removed handle.
    pub fn remove(&mut self, id: TrackerId) -> Option<TrackerHandle> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        let entry = self.entries.remove(idx);
        debug!("remove {id} '{}'", entry.name());
        self.rebuild();
        Some(entry.handle)
    }

    /// Recompute the grouped display order from registration order.
    pub fn rebuild(&mut self) -> &[TrackerGroup] {
        let mut ordered: Vec<&TrackerEntry> = self.entries.iter().collect();
        // `sort_by_key` is stable: equal keys keep registration order.
        ordered.sort_by_key(|e| e.caps.sort_key());

        let mut groups: Vec<TrackerGroup> = Vec::new();
        for entry in ordered {
            match groups.last_mut() {
                Some(group) if group.kind == entry.caps.kind => group.members.push(entry.id),
                _ => groups.push(TrackerGroup {
                    kind: entry.caps.kind,
                    title: entry.caps.kind.title(),
                    members: vec![entry.id],
                }),
            }
        }

        debug!(
            "rebuild: {} trackers in {} groups",
            self.entries.len(),
            groups.len()
        );
        self.groups = groups;
        &self.groups
    }

    /// Rebuild every panel for a new debug flag. Field values start over.
    pub fn rebuild_panels(&mut self, debug: bool, store: &dyn ConfigStore) {
        for entry in &mut self.entries {
            let stored = store.tracker_config(entry.handle.tracker().name());
            entry.panel = PanelState::build(&entry.handle, &entry.caps, debug, stored.as_ref());
        }
        self.rebuild();
    }

    /// Recompute the values of every panel. Returns the number of changed fields.
    pub fn refresh_all(&mut self) -> usize {
        self.entries
            .iter_mut()
            .map(|e| refresh_panel(&e.handle, &mut e.panel))
            .sum()
    }

    /// Two-level grouped view, in display order.
    pub fn groups(&self) -> &[TrackerGroup] {
        &self.groups
    }

    /// Flattened `Header | Tracker` sequence, in display order.
    pub fn rows(&self) -> Vec<PanelRow> {
        let mut rows = Vec::with_capacity(self.entries.len() + self.groups.len());
        for group in &self.groups {
            rows.push(PanelRow::Header {
                kind: group.kind,
                title: group.title,
            });
            rows.extend(group.members.iter().copied().map(PanelRow::Tracker));
        }
        rows
    }

    /// Entries in display order.
    pub fn ordered(&self) -> impl Iterator<Item = &TrackerEntry> + '_ {
        self.groups
            .iter()
            .flat_map(|g| g.members.iter())
            .filter_map(|id| self.get(*id))
    }

    pub fn get(&self, id: TrackerId) -> Option<&TrackerEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: TrackerId) -> Option<&mut TrackerEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackerEntry> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adjusted::ReferenceAdjusted;
    use crate::config::MemoryConfigStore;
    use crate::manifest::Field;
    use crate::math::{Quat, Vec3};
    use crate::tracker::{Tracker, TrackerInfo, TrackerStatus};

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

    fn mock(name: &str, kind: TrackerKind) -> Arc<dyn Tracker> {
        let info = match kind {
            TrackerKind::Imu => TrackerInfo::imu(name),
            _ => TrackerInfo::new(name, kind),
        };
        Arc::new(Mock { info })
    }

    fn bare(name: &str, kind: TrackerKind) -> TrackerHandle {
        TrackerHandle::bare(mock(name, kind))
    }

    fn names(reg: &Registry) -> Vec<String> {
        reg.ordered().map(|e| e.name().to_string()).collect()
    }

    // -----------------------------------------------------------------------
    // Ordering
    // -----------------------------------------------------------------------

    #[test]
    fn sorts_by_kind_and_keeps_registration_order() {
        let store = MemoryConfigStore::new();
        let mut reg = Registry::new();
        reg.register(bare("computed", TrackerKind::Computed), false, &store);
        reg.register(bare("imu-a", TrackerKind::Imu), false, &store);
        reg.register(bare("hmd", TrackerKind::Hmd), false, &store);
        reg.register(bare("imu-b", TrackerKind::Imu), false, &store);

        assert_eq!(names(&reg), vec!["imu-a", "imu-b", "hmd", "computed"]);
        let titles: Vec<&str> = reg.groups().iter().map(|g| g.title).collect();
        assert_eq!(titles, vec!["IMU", "HMD", "Computed"]);
    }

    #[test]
    fn rows_interleave_headers() {
        let store = MemoryConfigStore::new();
        let mut reg = Registry::new();
        let hmd = reg.register(bare("hmd", TrackerKind::Hmd), false, &store);
        let imu = reg.register(bare("imu", TrackerKind::Imu), false, &store);

        assert_eq!(
            reg.rows(),
            vec![
                PanelRow::Header {
                    kind: TrackerKind::Imu,
                    title: "IMU"
                },
                PanelRow::Tracker(imu),
                PanelRow::Header {
                    kind: TrackerKind::Hmd,
                    title: "HMD"
                },
                PanelRow::Tracker(hmd),
            ]
        );
    }

    #[test]
    fn rebuild_is_idempotent() {
        let store = MemoryConfigStore::new();
        let mut reg = Registry::new();
        for (name, kind) in [
            ("c", TrackerKind::Computed),
            ("i1", TrackerKind::Imu),
            ("h", TrackerKind::Hmd),
            ("i2", TrackerKind::Imu),
        ] {
            reg.register(bare(name, kind), false, &store);
        }
        let first = reg.rows();
        reg.rebuild();
        assert_eq!(reg.rows(), first);
    }

    #[test]
    fn adjusted_wrapper_groups_with_its_inner_kind() {
        let store = MemoryConfigStore::new();
        let mut reg = Registry::new();
        reg.register(bare("hmd", TrackerKind::Hmd), false, &store);
        let wrapper = Arc::new(ReferenceAdjusted::new(mock("imu", TrackerKind::Imu)));
        reg.register(TrackerHandle::adjusted(wrapper), false, &store);

        assert_eq!(reg.groups()[0].kind, TrackerKind::Imu);
        assert_eq!(names(&reg), vec!["imu", "hmd"]);
    }

    #[test]
    fn unseen_variants_get_their_own_groups() {
        let store = MemoryConfigStore::new();
        let mut reg = Registry::new();
        reg.register(bare("v1", TrackerKind::Other("Virtual")), false, &store);
        reg.register(bare("s1", TrackerKind::Other("Skeleton")), false, &store);
        reg.register(bare("v2", TrackerKind::Other("Virtual")), false, &store);

        // Same sort key: registration order decides, and runs split groups.
        let titles: Vec<&str> = reg.groups().iter().map(|g| g.title).collect();
        assert_eq!(titles, vec!["Virtual", "Skeleton", "Virtual"]);
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    #[test]
    fn remove_drops_entry_and_empty_group() {
        let store = MemoryConfigStore::new();
        let mut reg = Registry::new();
        let imu = reg.register(bare("imu", TrackerKind::Imu), false, &store);
        reg.register(bare("hmd", TrackerKind::Hmd), false, &store);

        assert!(reg.remove(imu).is_some());
        assert!(reg.remove(imu).is_none());
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.groups().len(), 1);
        assert_eq!(reg.groups()[0].kind, TrackerKind::Hmd);
    }

    #[test]
    fn ids_are_not_reused() {
        let store = MemoryConfigStore::new();
        let mut reg = Registry::new();
        let a = reg.register(bare("a", TrackerKind::Imu), false, &store);
        reg.remove(a);
        let b = reg.register(bare("b", TrackerKind::Imu), false, &store);
        assert_ne!(a, b);
    }

    // -----------------------------------------------------------------------
    // Panels
    // -----------------------------------------------------------------------

    #[test]
    fn rebuild_panels_follows_debug_flag() {
        let store = MemoryConfigStore::new();
        let mut reg = Registry::new();
        let id = reg.register(bare("imu", TrackerKind::Imu), false, &store);
        assert!(!reg.get(id).unwrap().panel.manifest().contains(Field::RawMag));

        reg.rebuild_panels(true, &store);
        assert!(reg.get(id).unwrap().panel.manifest().contains(Field::RawMag));
    }

    #[test]
    fn stored_designation_seeds_selector() {
        let store = MemoryConfigStore::new();
        store.insert(
            "imu",
            crate::config::TrackerConfig {
                designation: Some("body:waist".into()),
                mounting: None,
            },
        );
        let mut reg = Registry::new();
        let id = reg.register(bare("imu", TrackerKind::Imu), false, &store);
        let panel = &reg.get(id).unwrap().panel;
        assert_eq!(panel.value(Field::Designation), Some("WAIST"));
        assert_eq!(panel.value(Field::Mounting), Some("BACK"));
        assert_eq!(panel.value(Field::Name), Some("imu"));
    }

    #[test]
    fn missing_designation_falls_back_to_first_position() {
        let store = MemoryConfigStore::new();
        let mut reg = Registry::new();
        let id = reg.register(bare("imu", TrackerKind::Imu), false, &store);
        assert_eq!(
            reg.get(id).unwrap().panel.value(Field::Designation),
            Some("HMD")
        );
    }
}
