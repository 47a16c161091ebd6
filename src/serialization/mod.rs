//! Binary persistence for recorded statistics.
//!
//! Layout (all integers little-endian, no header or checksum):
//!
//! ```text
//! u64 total | u64 block | u64 episode_count
//! per episode: u64 action_count | action_count x u32 opcode | u64 start_ms | u64 end_ms
//! ```
//!
//! Reading checks every count against the remaining bytes and rejects
//! trailing data, so truncated or foreign files surface as [`PersistError`].

mod stat_file;

pub use stat_file::{
    PersistError,
    encode_statistic,
    parse_statistic_bytes,
    write_statistic_to_path,
    read_statistic_from_path,
};
