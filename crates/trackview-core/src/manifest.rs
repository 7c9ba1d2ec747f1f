//! Field-presence manifests and per-tracker panel state.
//!
//! [`build_manifest`] decides, from a tracker's [`Capabilities`] and the debug
//! flag, which display fields apply and where they sit in the two-column
//! label/value grid. A manifest is never patched: any structural change builds
//! a new one and a fresh [`PanelState`] replaces the old.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::body::{MountingRotation, TrackerPosition};
use crate::capability::{Capabilities, TrackerHandle};
use crate::config::TrackerConfig;

/// A display field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Field {
    Name,
    Designation,
    Mounting,
    Ping,
    Signal,
    Tps,
    Status,
    Battery,
    Rotation,
    Raw,
    Position,
    Quaternion,
    RawMag,
    Temperature,
    Calibration,
    MagAccuracy,
    Correction,
    RotAdjust,
    AttachmentFix,
    YawFix,
    GyroFix,
}

impl Field {
    /// Label shown in front of the value. Empty for the name and selectors.
    pub fn label(self) -> &'static str {
        match self {
            Self::Name | Self::Designation | Self::Mounting => "",
            Self::Ping => "Ping:",
            Self::Signal => "Signal:",
            Self::Tps => "TPS:",
            Self::Status => "Status:",
            Self::Battery => "Battery:",
            Self::Rotation => "Rotation:",
            Self::Raw => "Raw:",
            Self::Position => "Position:",
            Self::Quaternion => "Quat:",
            Self::RawMag => "Raw mag:",
            Self::Temperature => "Temp:",
            Self::Calibration => "Cal:",
            Self::MagAccuracy => "Mag acc:",
            Self::Correction => "Correction:",
            Self::RotAdjust => "Rot adj:",
            Self::AttachmentFix => "Att fix:",
            Self::YawFix => "Yaw fix:",
            Self::GyroFix => "Gyro fix:",
        }
    }

    /// Whether the field is one of the two user-editable selectors.
    pub fn is_selector(self) -> bool {
        matches!(self, Self::Designation | Self::Mounting)
    }
}

/// A present field and its grid position.
///
/// `col` is the label column; the value sits in `col + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSlot {
    pub field: Field,
    pub row: u16,
    pub col: u16,
}

/// Ordered set of fields applicable to one tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    slots: Vec<FieldSlot>,
}

impl Manifest {
    /// Whether `field` is present.
    pub fn contains(&self, field: Field) -> bool {
        self.slots.iter().any(|s| s.field == field)
    }

    /// Slot of `field`, if present.
    pub fn slot(&self, field: Field) -> Option<FieldSlot> {
        self.slots.iter().copied().find(|s| s.field == field)
    }

    /// All slots in build order.
    pub fn slots(&self) -> &[FieldSlot] {
        &self.slots
    }

    /// Present fields in build order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.slots.iter().map(|s| s.field)
    }

    /// Number of present fields.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no field is present.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of grid rows occupied.
    pub fn row_count(&self) -> u16 {
        self.slots.iter().map(|s| s.row + 1).max().unwrap_or(0)
    }

    fn push(&mut self, field: Field, row: u16, col: u16) {
        self.slots.push(FieldSlot { field, row, col });
    }
}

/// Compute the manifest for a tracker.
///
/// Rows for ping/signal, tick rate, status, rotation and the debug quaternion
/// advance even when their fields are absent, so the same tracker kind always
/// produces the same grid shape.
pub fn build_manifest(caps: &Capabilities, debug: bool) -> Manifest {
    let mut m = Manifest::default();
    let mut row = 0;

    m.push(Field::Name, row, 0);
    row += 1;

    if caps.user_editable {
        m.push(Field::Designation, row, 0);
        if caps.is_imu {
            m.push(Field::Mounting, row, 2);
        }
        row += 1;
    }

    if caps.is_imu {
        m.push(Field::Ping, row, 0);
        m.push(Field::Signal, row, 2);
    }
    row += 1;

    if caps.has_tps {
        m.push(Field::Tps, row, 0);
    }
    row += 1;

    m.push(Field::Status, row, 0);
    if caps.has_battery {
        m.push(Field::Battery, row, 2);
    }
    row += 1;

    let mut col = 0;
    if caps.has_rotation {
        m.push(Field::Rotation, row, col);
        col += 2;
    }
    m.push(Field::Raw, row, col);
    row += 1;

    if caps.has_position {
        m.push(Field::Position, row, 0);
        row += 1;
    }

    let imu_debug = debug && caps.is_imu;
    if imu_debug {
        m.push(Field::Quaternion, row, 2);
    }
    row += 1;

    if imu_debug {
        m.push(Field::RawMag, row, 0);
        m.push(Field::Temperature, row, 2);
        row += 1;
        m.push(Field::Calibration, row, 0);
        m.push(Field::MagAccuracy, row, 2);
        row += 1;
        m.push(Field::Correction, row, 0);
        m.push(Field::RotAdjust, row, 2);
        row += 1;
    }

    if debug && caps.reference_adjusted {
        m.push(Field::AttachmentFix, row, 0);
        m.push(Field::YawFix, row, 2);
        row += 1;
        m.push(Field::GyroFix, row, 0);
    }

    m
}

/// Manifest plus the last-rendered text of each present field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelState {
    manifest: Manifest,
    values: BTreeMap<Field, String>,
}

impl PanelState {
    /// Panel with every present field set to the empty string.
    pub fn new(manifest: Manifest) -> Self {
        let values = manifest.fields().map(|f| (f, String::new())).collect();
        Self { manifest, values }
    }

    /// Build a panel for `handle`, seeding the name and selector values.
    ///
    /// The designation selector falls back to the first position when nothing
    /// is stored; the mounting selector falls back to `BACK` when the IMU's
    /// mounting quaternion matches no known mounting.
    pub fn build(
        handle: &TrackerHandle,
        caps: &Capabilities,
        debug: bool,
        stored: Option<&TrackerConfig>,
    ) -> Self {
        let mut panel = Self::new(build_manifest(caps, debug));
        panel.set(Field::Name, handle.tracker().name().to_string());

        if panel.manifest.contains(Field::Designation) {
            let position = stored
                .and_then(|cfg| cfg.designation.as_deref())
                .and_then(TrackerPosition::from_designation)
                .unwrap_or_default();
            panel.set(Field::Designation, position.name().to_string());
        }

        if panel.manifest.contains(Field::Mounting) {
            let mounting = handle
                .unwrap_once()
                .imu()
                .and_then(|imu| MountingRotation::from_quaternion(imu.mounting_rotation))
                .unwrap_or_default();
            panel.set(Field::Mounting, mounting.name().to_string());
        }

        panel
    }

    /// The panel's manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Current text of `field`, if present.
    pub fn value(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Replace the text of a present field. Returns whether the text changed;
    /// fields outside the manifest are ignored.
    pub fn set(&mut self, field: Field, text: String) -> bool {
        match self.values.get_mut(&field) {
            Some(slot) if *slot != text => {
                *slot = text;
                true
            }
            _ => false,
        }
    }

    /// Present fields with their text, in build order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldSlot, &str)> + '_ {
        self.manifest
            .slots()
            .iter()
            .map(|s| (*s, self.value(s.field).unwrap_or("")))
    }

    /// Selected designation, if the selector is present.
    pub fn designation(&self) -> Option<TrackerPosition> {
        self.value(Field::Designation)
            .and_then(TrackerPosition::from_name)
    }

    /// Selected mounting, if the selector is present.
    pub fn mounting(&self) -> Option<MountingRotation> {
        self.value(Field::Mounting).and_then(MountingRotation::from_name)
    }
}
