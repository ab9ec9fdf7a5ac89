use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

use mpi_config::Transferable;

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Int32,
    Int64,
    Float32,
}

impl DType {
    pub const ALL: [DType; 3] = [DType::Int32, DType::Int64, DType::Float32];

    /// Width of one element in bytes
    #[inline(always)]
    pub const fn size(&self) -> usize {
        match self {
            DType::Int32 => 4,
            DType::Int64 => 8,
            DType::Float32 => 4,
        }
    }

    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Float32 => "float32",
        }
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int32" => Ok(DType::Int32),
            "int64" => Ok(DType::Int64),
            "float32" => Ok(DType::Float32),
            _ => Err(ConfigError::UnknownDType(s.to_string())),
        }
    }
}

/// A payload element.
///
/// `from_index` maps a global payload index onto the element type. Integers wrap and floats
/// round to nearest; the verifier applies the same mapping to its expected values.
pub trait Element: Transferable + PartialEq + Debug + Display {
    const DTYPE: DType;

    fn from_index(index: u64) -> Self;
}

impl Element for i32 {
    const DTYPE: DType = DType::Int32;

    #[inline(always)]
    fn from_index(index: u64) -> Self {
        index as i32
    }
}

impl Element for i64 {
    const DTYPE: DType = DType::Int64;

    #[inline(always)]
    fn from_index(index: u64) -> Self {
        index as i64
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::Float32;

    #[inline(always)]
    fn from_index(index: u64) -> Self {
        index as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_width_matches_rust_type() {
        assert_eq!(DType::Int32.size(), std::mem::size_of::<i32>());
        assert_eq!(DType::Int64.size(), std::mem::size_of::<i64>());
        assert_eq!(DType::Float32.size(), std::mem::size_of::<f32>());
    }

    #[test]
    fn test_dtype_round_trips_through_str() {
        for dtype in DType::ALL {
            assert_eq!(dtype.to_string().parse::<DType>().unwrap(), dtype);
        }
        assert!(matches!(
            "float16".parse::<DType>(),
            Err(ConfigError::UnknownDType(s)) if s == "float16"
        ));
    }

    #[test]
    fn test_from_index() {
        assert_eq!(i32::from_index(7), 7);
        assert_eq!(i64::from_index(1 << 40), 1 << 40);
        assert_eq!(f32::from_index(12), 12.0);
        // wraps like a two's complement truncation
        assert_eq!(i32::from_index(1 << 32), 0);
    }
}
