//! Room-pairing strategies that decide which rooms get corridors.
//!
//! A topology takes the ordered room list and yields index pairs to
//! connect. Routing, door choice, and failure handling all live with
//! the caller; these stay pure so they are trivial to test.

/// Index of a room within a generator's room list.
pub type RoomId = u32;

/// Chain: each room connects to the next in list order.
pub fn linear_pairs(room_count: u32) -> Vec<(RoomId, RoomId)> {
    (1..room_count).map(|id| (id - 1, id)).collect()
}

/// Chain plus a closing corridor from the last room back to the first.
///
/// With fewer than three rooms the wrap edge would duplicate (or
/// self-connect) an existing pair, so it is skipped.
pub fn looping_pairs(room_count: u32) -> Vec<(RoomId, RoomId)> {
    let mut pairs = linear_pairs(room_count);
    if room_count >= 3 {
        pairs.push((room_count - 1, 0));
    }
    pairs
}

/// Hub-and-spoke: every other room connects to `central`.
pub fn star_pairs(room_count: u32, central: RoomId) -> Vec<(RoomId, RoomId)> {
    (0..room_count)
        .filter(|&id| id != central)
        .map(|id| (central, id))
        .collect()
}
