//! Rotation angle option

use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};

/// Clockwise rotation applied to the selected pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum RotationAngle {
    /// 90 degrees clockwise
    Clockwise90,
    /// 180 degrees
    Rotate180,
    /// 270 degrees clockwise (90 degrees counter-clockwise)
    Clockwise270,
}

impl RotationAngle {
    /// Create from degrees. Negative values count counter-clockwise, so
    /// `-90` is the same as `270`.
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        match degrees.rem_euclid(360) {
            90 => Ok(RotationAngle::Clockwise90),
            180 => Ok(RotationAngle::Rotate180),
            270 => Ok(RotationAngle::Clockwise270),
            _ => Err(DeskError::InvalidOption(format!(
                "Invalid rotation angle: {degrees} (must be 90, 180 or 270)"
            ))),
        }
    }

    pub fn to_degrees(self) -> i32 {
        match self {
            RotationAngle::Clockwise90 => 90,
            RotationAngle::Rotate180 => 180,
            RotationAngle::Clockwise270 => 270,
        }
    }
}

impl TryFrom<i32> for RotationAngle {
    type Error = DeskError;

    fn try_from(degrees: i32) -> Result<Self> {
        Self::from_degrees(degrees)
    }
}

impl From<RotationAngle> for i32 {
    fn from(angle: RotationAngle) -> i32 {
        angle.to_degrees()
    }
}

impl std::str::FromStr for RotationAngle {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        let degrees = s
            .trim()
            .trim_end_matches('°')
            .parse::<i32>()
            .map_err(|_| DeskError::InvalidOption(format!("Invalid rotation angle: {s}")))?;
        Self::from_degrees(degrees)
    }
}
