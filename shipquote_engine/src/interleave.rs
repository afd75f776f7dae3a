//! Interleaver: merges the two categories into one display order.
//!
//! Service-point quotes are emitted in order and, after every `ratio`-th of
//! them, the next home-delivery quote is slotted in. Home-delivery quotes left
//! over once the service points run out are appended in order. With the
//! default ratio of 2 this yields `sp0 sp1 hd0 sp2 sp3 hd1 hd2 ...`.

/// Merge two ordered lists, taking one `home` item after every `ratio` `service_points` items.
///
/// The result always contains every input item exactly once. A `ratio` of 0
/// is treated as 1.
pub fn interleave<T: Clone>(service_points: &[T], home: &[T], ratio: usize) -> Vec<T> {
    let ratio = ratio.max(1);
    let mut merged = Vec::with_capacity(service_points.len() + home.len());
    let mut next_home = 0;

    for (index, item) in service_points.iter().enumerate() {
        merged.push(item.clone());
        if (index + 1) % ratio == 0 {
            if let Some(slot) = home.get(index / ratio) {
                merged.push(slot.clone());
                next_home = index / ratio + 1;
            }
        }
    }
    merged.extend(home.iter().skip(next_home).cloned());
    merged
}
