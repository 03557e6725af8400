//! Memory addresses.
//!
//! A [`MemoryAddress`] is a 64-bit value rendered as a normalized hex string:
//! `0x` prefix, uppercase digits, no leading zeros. `0x0` is the null address.
//! Equality is by numeric value, so `0x00ff` and `0XFF` are the same address.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum number of hex digits in an address
const MAX_HEX_DIGITS: usize = 16;

/// Normalized memory address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemoryAddress(u64);

impl MemoryAddress {
    /// The canonical null address (`0x0`)
    pub const NULL: MemoryAddress = MemoryAddress(0);

    /// Create from a raw value
    #[must_use]
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Parse from a `0x`-prefixed hex string
    ///
    /// # Errors
    ///
    /// Returns error if the prefix is missing, the digits are not hex, or the
    /// value does not fit in 64 bits
    pub fn parse(s: &str) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidAddress {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| invalid("must start with 0x"))?;

        if digits.is_empty() {
            return Err(invalid("no hex digits"));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("contains non-hex characters"));
        }

        let significant = digits.trim_start_matches('0');
        if significant.len() > MAX_HEX_DIGITS {
            return Err(invalid("does not fit in 64 bits"));
        }
        if significant.is_empty() {
            return Ok(Self::NULL);
        }

        u64::from_str_radix(significant, 16)
            .map(Self)
            .map_err(|e| invalid(&e.to_string()))
    }

    /// Get raw value
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Check for the null address
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Address `bytes` above this one, saturating at the top of the space
    #[must_use]
    pub const fn offset(&self, bytes: u64) -> Self {
        Self(self.0.saturating_add(bytes))
    }
}

impl Default for MemoryAddress {
    fn default() -> Self {
        Self::NULL
    }
}

impl std::fmt::Display for MemoryAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

impl FromStr for MemoryAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MemoryAddress {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MemoryAddress> for String {
    fn from(addr: MemoryAddress) -> Self {
        addr.to_string()
    }
}

impl From<u64> for MemoryAddress {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
