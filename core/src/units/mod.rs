use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length unit of imported model coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    Micrometer,
    Millimeter,
    Centimeter,
    Meter,
    Inch,
    Mil,
}

impl LengthUnit {
    /// Factor taking a coordinate in this unit to meters, the value the
    /// mesher expects in `Mesh.ScalingFactor`.
    pub fn scaling_factor(&self) -> f64 {
        match self {
            Self::Micrometer => 1e-6,
            Self::Millimeter => 1e-3,
            Self::Centimeter => 1e-2,
            Self::Meter => 1.0,
            Self::Inch => 0.0254,
            Self::Mil => 0.0254e-3,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Micrometer => write!(f, "um"),
            Self::Millimeter => write!(f, "mm"),
            Self::Centimeter => write!(f, "cm"),
            Self::Meter => write!(f, "m"),
            Self::Inch => write!(f, "in"),
            Self::Mil => write!(f, "mil"),
        }
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "um" | "micrometer" => Ok(Self::Micrometer),
            "mm" | "millimeter" => Ok(Self::Millimeter),
            "cm" | "centimeter" => Ok(Self::Centimeter),
            "m" | "meter" => Ok(Self::Meter),
            "in" | "inch" => Ok(Self::Inch),
            "mil" => Ok(Self::Mil),
            other => Err(format!("unknown length unit '{}'", other)),
        }
    }
}
