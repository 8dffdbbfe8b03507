/// Default group size: the most a single queue send call accepts.
pub const PARTITION_SIZE: usize = crate::event::MAX_BATCH_SIZE;

/// Splits `items` into consecutive groups of `size`; only the last may be
/// shorter. Empty input yields no groups.
///
/// # Panics
///
/// If `size` is zero.
pub fn partition<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    assert!(size > 0, "partition size must be positive");
    items.chunks(size).map(<[T]>::to_vec).collect()
}
