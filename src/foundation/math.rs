use std::cmp::Ordering;

/// `num / den` rounded to the nearest integer, ties to even.
///
/// Both playback and export addressing go through this so they agree bit for bit.
pub(crate) fn div_round_half_even(num: u128, den: u128) -> u128 {
    debug_assert!(den > 0);
    let q = num / den;
    let r = num % den;
    match r.cmp(&(den - r)) {
        Ordering::Less => q,
        Ordering::Greater => q + 1,
        Ordering::Equal => q + (q & 1),
    }
}

/// `f64` rounding with the same tie rule as [`div_round_half_even`].
pub(crate) fn round_half_even_f64(v: f64) -> f64 {
    v.round_ties_even()
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
