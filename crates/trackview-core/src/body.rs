//! Body designations and mounting rotations offered by the editable selectors.

use serde::{Deserialize, Serialize};

use crate::math::{Quat, same_rotation, yaw_rotation};

/// Where on the body a tracker is worn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackerPosition {
    Hmd,
    Chest,
    Waist,
    Hip,
    LeftLeg,
    RightLeg,
    LeftAnkle,
    RightAnkle,
    LeftFoot,
    RightFoot,
    LeftController,
    RightController,
}

impl TrackerPosition {
    /// Every position, in selector order. The first one is the fallback.
    pub const ALL: [Self; 12] = [
        Self::Hmd,
        Self::Chest,
        Self::Waist,
        Self::Hip,
        Self::LeftLeg,
        Self::RightLeg,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftFoot,
        Self::RightFoot,
        Self::LeftController,
        Self::RightController,
    ];

    /// Selector label.
    pub fn name(self) -> &'static str {
        match self {
            Self::Hmd => "HMD",
            Self::Chest => "CHEST",
            Self::Waist => "WAIST",
            Self::Hip => "HIP",
            Self::LeftLeg => "LEFT_LEG",
            Self::RightLeg => "RIGHT_LEG",
            Self::LeftAnkle => "LEFT_ANKLE",
            Self::RightAnkle => "RIGHT_ANKLE",
            Self::LeftFoot => "LEFT_FOOT",
            Self::RightFoot => "RIGHT_FOOT",
            Self::LeftController => "LEFT_CONTROLLER",
            Self::RightController => "RIGHT_CONTROLLER",
        }
    }

    /// Designation string persisted by the configuration subsystem.
    pub fn designation(self) -> &'static str {
        match self {
            Self::Hmd => "HMD",
            Self::Chest => "body:chest",
            Self::Waist => "body:waist",
            Self::Hip => "body:hip",
            Self::LeftLeg => "body:left_leg",
            Self::RightLeg => "body:right_leg",
            Self::LeftAnkle => "body:left_ankle",
            Self::RightAnkle => "body:right_ankle",
            Self::LeftFoot => "body:left_foot",
            Self::RightFoot => "body:right_foot",
            Self::LeftController => "body:left_controller",
            Self::RightController => "body:right_controller",
        }
    }

    /// Look up a position by its persisted designation.
    pub fn from_designation(designation: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.designation().eq_ignore_ascii_case(designation))
    }

    /// Look up a position by its selector label.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Next position in selector order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl Default for TrackerPosition {
    fn default() -> Self {
        Self::ALL[0]
    }
}

impl std::fmt::Display for TrackerPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How an IMU is strapped on, as a yaw offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MountingRotation {
    Front,
    Left,
    #[default]
    Back,
    Right,
}

/// Tolerance for matching a stored mounting quaternion.
const MOUNTING_EPSILON: f32 = 1e-4;

impl MountingRotation {
    /// Every mounting, in selector order.
    pub const ALL: [Self; 4] = [Self::Front, Self::Left, Self::Back, Self::Right];

    /// Selector label.
    pub fn name(self) -> &'static str {
        match self {
            Self::Front => "FRONT",
            Self::Left => "LEFT",
            Self::Back => "BACK",
            Self::Right => "RIGHT",
        }
    }

    /// Yaw offset in degrees.
    pub fn yaw_degrees(self) -> f32 {
        match self {
            Self::Front => 180.0,
            Self::Left => 90.0,
            Self::Back => 0.0,
            Self::Right => -90.0,
        }
    }

    /// Mounting as a rotation about the vertical axis.
    pub fn quaternion(self) -> Quat {
        yaw_rotation(self.yaw_degrees())
    }

    /// Find the mounting that matches `q`, if any.
    pub fn from_quaternion(q: Quat) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| same_rotation(m.quaternion(), q, MOUNTING_EPSILON))
    }

    /// Look up a mounting by its selector label.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Next mounting in selector order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for MountingRotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn designation_lookup_round_trips_every_position() {
        for p in TrackerPosition::ALL {
            assert_eq!(TrackerPosition::from_designation(p.designation()), Some(p));
            assert_eq!(TrackerPosition::from_name(p.name()), Some(p));
        }
    }

    #[test]
    fn designation_lookup_is_case_insensitive() {
        assert_eq!(
            TrackerPosition::from_designation("BODY:Chest"),
            Some(TrackerPosition::Chest)
        );
        assert_eq!(TrackerPosition::from_designation("body:tail"), None);
    }

    #[test]
    fn default_position_is_first() {
        assert_eq!(TrackerPosition::default(), TrackerPosition::ALL[0]);
    }

    #[test]
    fn position_next_wraps() {
        assert_eq!(TrackerPosition::Hmd.next(), TrackerPosition::Chest);
        assert_eq!(TrackerPosition::RightController.next(), TrackerPosition::Hmd);
    }

    #[test]
    fn mounting_quaternion_lookup() {
        for m in MountingRotation::ALL {
            assert_eq!(MountingRotation::from_quaternion(m.quaternion()), Some(m));
        }
        assert_eq!(MountingRotation::from_quaternion(yaw_rotation(45.0)), None);
    }

    #[test]
    fn mounting_defaults_to_back() {
        assert_eq!(MountingRotation::default(), MountingRotation::Back);
        assert_eq!(MountingRotation::Back.quaternion(), Quat::IDENTITY);
    }

    #[test]
    fn mounting_next_wraps() {
        assert_eq!(MountingRotation::Right.next(), MountingRotation::Front);
    }
}
