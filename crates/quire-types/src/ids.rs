//! Block identifiers.
//!
//! Block ids are plain strings on the wire so that documents produced by any
//! adapter can be loaded. Ids minted by quire itself are UUIDv7 text
//! (time-ordered, globally unique).

/// Mint a fresh block id.
pub fn new_block_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
