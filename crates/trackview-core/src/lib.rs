//! # trackview-core
//!
//! Presentation model for a live telemetry panel over heterogeneous motion
//! trackers.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use trackview_core::{MemoryConfigStore, NullSurface, PanelConfig, PanelModel, TrackerHandle};
//! # use trackview_core::{Quat, Vec3, Tracker, TrackerInfo, TrackerStatus};
//! # struct Imu(TrackerInfo);
//! # impl Tracker for Imu {
//! #     fn info(&self) -> &TrackerInfo { &self.0 }
//! #     fn rotation(&self) -> Quat { Quat::IDENTITY }
//! #     fn position(&self) -> Vec3 { Vec3::ZERO }
//! #     fn status(&self) -> TrackerStatus { TrackerStatus::Ok }
//! # }
//!
//! let mut model = PanelModel::new(PanelConfig::default(), Box::new(MemoryConfigStore::new()));
//! let scheduler = model.scheduler();
//!
//! // Producer side: any thread may announce trackers and tick the scheduler.
//! let tx = model.sender();
//! tx.new_tracker_added(TrackerHandle::bare(Arc::new(Imu(TrackerInfo::imu("IMU 0")))));
//! scheduler.tick();
//!
//! // Presentation side: apply queued work and redraw.
//! model.process_pending(&mut NullSurface);
//! for row in model.registry().rows() {
//!     println!("{row:?}");
//! }
//! ```
//!
//! ## Architecture
//!
//! Tracker → [`TrackerHandle`] → [`Capabilities`] → [`Manifest`] →
//! refresh (formatters) → [`RenderSurface`]
//!
//! Capabilities are computed once per tracker at registration, unwrapping a
//! reference-adjusted wrapper exactly one level. The manifest is a pure
//! function of the capabilities and the debug flag. The [`RefreshScheduler`]
//! throttles recomputation and queues it onto the presentation context.

pub mod adjusted;
pub mod body;
pub mod capability;
pub mod config;
pub mod format;
pub mod manifest;
pub mod math;
pub mod panel;
pub mod refresh;
pub mod registry;
pub mod scheduler;
pub mod tracker;

pub use adjusted::{AdjustmentFixes, ReferenceAdjusted};
pub use body::{MountingRotation, TrackerPosition};
pub use capability::{Capabilities, TrackerHandle};
pub use config::{ConfigStore, MemoryConfigStore, PanelConfig, TrackerConfig, TrackerUpdate};
pub use manifest::{Field, FieldSlot, Manifest, PanelState, build_manifest};
pub use math::{Quat, Vec3};
pub use panel::{NullSurface, Outcome, PanelModel, PanelSnapshot, RenderSurface};
pub use registry::{PanelRow, Registry, TrackerEntry, TrackerGroup, TrackerId};
pub use scheduler::{Job, PresentationQueue, PresentationSender, RefreshScheduler};
pub use tracker::{
    BatteryReading, ImuReadings, Tracker, TrackerInfo, TrackerKind, TrackerStatus,
};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
