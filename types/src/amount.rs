//! Amount helpers.
//!
//! Amounts are fixed-point integers (u128) to avoid floating-point errors.
//! The smallest unit is 1 raw; one whole token is [`UNIT`] raw.

/// Raw units per whole token.
pub const UNIT: u128 = 1_000_000;

/// Basis-point denominator (10_000 bps = 100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Convert whole tokens to raw units.
pub const fn tokens(whole: u128) -> u128 {
    whole * UNIT
}

/// `floor(amount * bps / 10_000)` with overflow checking.
pub fn apply_bps(amount: u128, bps: u32) -> Option<u128> {
    amount
        .checked_mul(bps as u128)
        .map(|scaled| scaled / BPS_DENOMINATOR)
}

/// Serde adapter storing a u128 amount as u64.
///
/// Text formats such as TOML have no 128-bit integers. Configured amounts
/// stay far below `u64::MAX` raw, so larger values are rejected.
pub mod as_u64 {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        let narrow = u64::try_from(*value)
            .map_err(|_| ser::Error::custom(format!("amount {value} exceeds u64")))?;
        serializer.serialize_u64(narrow)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let value = u64::deserialize(deserializer).map_err(de::Error::custom)?;
        Ok(value as u128)
    }
}
