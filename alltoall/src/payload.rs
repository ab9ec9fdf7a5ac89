use crate::{ChunkLayout, Element};

/// Build the payload of `rank`.
///
/// Element `o` is `rank * total_elems + o`, so the payloads of different ranks are disjoint,
/// strictly increasing ranges and chunk `d` is the slice destined for rank `d`.
pub fn generate_payload<T: Element>(rank: usize, layout: &ChunkLayout) -> Vec<T> {
    let total = layout.total_elems() as u64;
    let base = rank as u64 * total;
    (base..base + total).map(T::from_index).collect()
}

/// Payload index that should sit at `offset` of `rank`'s output after a correct exchange.
///
/// The element came from rank `offset / elements_per_chunk`, which sent chunk `rank` of its
/// payload.
#[inline]
pub fn expected_output_index(rank: usize, offset: usize, layout: &ChunkLayout) -> u64 {
    debug_assert!(offset < layout.total_elems());
    let src = offset / layout.elements_per_chunk;
    let j = offset % layout.elements_per_chunk;
    (src * layout.total_elems() + rank * layout.elements_per_chunk + j) as u64
}
