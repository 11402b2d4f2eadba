use std::fmt::Debug;
use std::ops::AddAssign;

use approx::AbsDiffEq;
use num_traits::Float;

/// Defines the possible data types for tensor elements.
///
/// The engine is scalar-only and closed over the floating-point types below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit floating-point type.
    F32,
    /// 64-bit floating-point type.
    F64,
}

/// Element type of a scalar tensor.
///
/// Combining tensors of two different element types is rejected at compile
/// time: every operation is generic over a single `T: Element`.
pub trait Element:
    Float + AddAssign + AbsDiffEq<Epsilon = Self> + Debug + Copy + Send + Sync + 'static
{
    /// The runtime tag matching this element type.
    const DTYPE: DType;

    /// Bit pattern used as the constant-cache key.
    ///
    /// Keying by bits gives value-equality semantics for every finite value
    /// and keeps the cache idempotent even for NaN literals.
    fn cache_key(self) -> u64;
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    fn cache_key(self) -> u64 {
        u64::from(self.to_bits())
    }
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;

    fn cache_key(self) -> u64 {
        self.to_bits()
    }
}
