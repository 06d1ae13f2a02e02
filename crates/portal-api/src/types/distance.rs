use std::{cmp::Ordering, fmt, ops::Deref};

use alloy_primitives::U256;

/// Distance between two points of the 256-bit keyspace.
#[derive(Copy, Clone, PartialEq, Eq, Default, PartialOrd, Ord, Debug)]
pub struct Distance(U256);

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}..", self.big_endian_u32())
    }
}

impl Distance {
    pub const MAX: Self = Self(U256::MAX);
    pub const ZERO: Self = Self(U256::ZERO);

    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(U256::from_be_bytes(bytes))
    }

    /// Big-endian form, the order in which distances are compared byte by byte.
    pub fn big_endian(&self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    /// The 4 most significant bytes.
    pub fn big_endian_u32(&self) -> u32 {
        let mut be_bytes = [0u8; 4];
        be_bytes.copy_from_slice(&self.big_endian()[..4]);
        u32::from_be_bytes(be_bytes)
    }
}

impl From<U256> for Distance {
    fn from(value: U256) -> Self {
        Distance(value)
    }
}

impl Deref for Distance {
    type Target = U256;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A distance function over the keyspace.
pub trait Metric {
    fn distance(x: &[u8; 32], y: &[u8; 32]) -> Distance;
}

/// The Kademlia XOR metric.
pub struct XorMetric;

impl Metric for XorMetric {
    fn distance(x: &[u8; 32], y: &[u8; 32]) -> Distance {
        let mut z = [0u8; 32];
        for (out, (a, b)) in z.iter_mut().zip(x.iter().zip(y.iter())) {
            *out = a ^ b;
        }
        Distance::from_be_bytes(z)
    }
}

/// Byte-wise XOR of two identifiers of possibly different length.
///
/// The shorter input is zero-padded on the left, so the result is as long as the longer input.
pub fn xor_bytes(a: &[u8], b: &[u8]) -> Vec<u8> {
    let len = a.len().max(b.len());
    let a_offset = len - a.len();
    let b_offset = len - b.len();
    (0..len)
        .map(|i| {
            let x = i.checked_sub(a_offset).map_or(0, |i| a[i]);
            let y = i.checked_sub(b_offset).map_or(0, |i| b[i]);
            x ^ y
        })
        .collect()
}

/// Compares two distances as unsigned big-endian integers.
///
/// Inputs of different length are compared as if the shorter one was zero-padded on the left.
pub fn compare_distance(a: &[u8], b: &[u8]) -> Ordering {
    let len = a.len().max(b.len());
    let a_offset = len - a.len();
    let b_offset = len - b.len();
    for i in 0..len {
        let x = i.checked_sub(a_offset).map_or(0, |i| a[i]);
        let y = i.checked_sub(b_offset).map_or(0, |i| b[i]);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            ordering => return ordering,
        }
    }
    Ordering::Equal
}
