use crate::foundation::math::div_round_half_even;

/// Map a playback timestamp to the byte offset of the first row shown at that time.
///
/// ```text
/// block        = width * color_bytes
/// total_blocks = ceil(total_bytes / block)
/// offset       = round(timestamp_ms * total_blocks / duration_ms) * block
/// ```
///
/// `timestamp_ms` is expected in `[0, duration_ms]`. At `timestamp_ms == duration_ms` the result
/// is `total_blocks * block`, which may lie past the end of the buffer; frame synthesis pads
/// those reads with zeros. Timestamps far past the end saturate at `u64::MAX`, which is still
/// past the buffer. A zero `duration_ms` or block size addresses offset 0.
pub fn compute_address(
    timestamp_ms: u64,
    total_bytes: u64,
    duration_ms: u64,
    width: u32,
    color_bytes: usize,
) -> u64 {
    let block = u128::from(width) * color_bytes as u128;
    if duration_ms == 0 || block == 0 {
        return 0;
    }
    let total_blocks = u128::from(total_bytes).div_ceil(block);
    let block_offset = div_round_half_even(
        u128::from(timestamp_ms) * total_blocks,
        u128::from(duration_ms),
    );
    u64::try_from(block_offset.saturating_mul(block)).unwrap_or(u64::MAX)
}
