//! Canonical joint enumeration
//!
//! Closed set of body joints recorded per pose frame. Tracking-subsystem
//! joint names are resolved through a static lookup; unrecognized names
//! are dropped rather than recorded under a synthetic key.

use crate::project::schema::JointPosition;

/// Canonical joints, keyed by a stable numeric index on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum JointIndex {
    Hips = 0,

    LeftHand,
    RightHand,

    LeftFoot,
    RightFoot,

    LeftKnee,
    RightKnee,

    LeftShoulder,
    RightShoulder,

    Head,
}

impl JointIndex {
    pub const ALL: [JointIndex; 10] = [
        JointIndex::Hips,
        JointIndex::LeftHand,
        JointIndex::RightHand,
        JointIndex::LeftFoot,
        JointIndex::RightFoot,
        JointIndex::LeftKnee,
        JointIndex::RightKnee,
        JointIndex::LeftShoulder,
        JointIndex::RightShoulder,
        JointIndex::Head,
    ];

    /// Resolve a tracking-subsystem joint name to its canonical joint.
    pub fn from_tracking_name(name: &str) -> Option<JointIndex> {
        match name {
            "hips_joint" => Some(JointIndex::Hips),

            "left_hand_joint" => Some(JointIndex::LeftHand),
            "right_hand_joint" => Some(JointIndex::RightHand),

            "left_foot_joint" => Some(JointIndex::LeftFoot),
            "right_foot_joint" => Some(JointIndex::RightFoot),

            "left_leg_joint" => Some(JointIndex::LeftKnee),
            "right_leg_joint" => Some(JointIndex::RightKnee),

            "left_shoulder_1_joint" => Some(JointIndex::LeftShoulder),
            "right_shoulder_1_joint" => Some(JointIndex::RightShoulder),

            "head_joint" => Some(JointIndex::Head),

            _ => None,
        }
    }

    /// On-disk numeric index.
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Optional world-to-wall coordinate calibration.
///
/// Captured once per session (a raycast against a vertical plane in the
/// original capture flow) and applied uniformly to every world-space joint.
/// Sessions without calibration record wall joints equal to world joints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallCalibration {
    /// Wall origin in world-tracking-frame coordinates, meters
    pub origin: [f32; 3],
}

impl WallCalibration {
    /// Project a world-space position into wall coordinates.
    pub fn to_wall(&self, world: JointPosition) -> JointPosition {
        JointPosition {
            x: world.x - self.origin[0],
            y: world.y - self.origin[1],
            z: world.z - self.origin[2],
        }
    }
}
