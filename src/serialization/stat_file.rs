use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

use crate::action::Action;
use crate::episode::Episode;
use crate::statistic::Statistic;

/// Width of `total`, `block`, `episode_count` and `action_count`.
const COUNT_SIZE: usize = 8;
/// Two timestamps close every episode record.
const STAMPS_SIZE: usize = 16;
const HEADER_SIZE: usize = 3 * COUNT_SIZE;
/// Smallest possible episode record: no actions.
const MIN_EPISODE_SIZE: usize = COUNT_SIZE + STAMPS_SIZE;

#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("file truncated at byte {offset}")]
    Truncated { offset: usize },
    #[error("malformed statistic file: {0}")]
    Malformed(&'static str),
    #[error("{0} trailing bytes after the last episode")]
    TrailingBytes(usize),
}

#[inline]
fn read_u32_le(bytes: &[u8]) -> Option<u32> {
    let b: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    Some(u32::from_le_bytes(b))
}

#[inline]
fn read_u64_le(bytes: &[u8]) -> Option<u64> {
    let b: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
    Some(u64::from_le_bytes(b))
}

/// Encode a statistic: header counts, then each episode's actions and timestamps.
///
/// All integers are little-endian; counts are 64-bit, opcodes 32-bit. An
/// episode that is still open is written with its end equal to its start.
pub fn encode_statistic(stat: &Statistic) -> Vec<u8> {
    let payload_len: usize = stat
        .episodes()
        .iter()
        .map(|ep| MIN_EPISODE_SIZE + ep.len() * Action::WIRE_SIZE)
        .sum();
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload_len);

    buf.extend_from_slice(&(stat.total() as u64).to_le_bytes());
    buf.extend_from_slice(&(stat.block() as u64).to_le_bytes());
    buf.extend_from_slice(&(stat.len() as u64).to_le_bytes());

    for episode in stat.episodes() {
        buf.extend_from_slice(&(episode.len() as u64).to_le_bytes());
        for action in episode.actions() {
            buf.extend_from_slice(&action.code().to_le_bytes());
        }
        let start = episode.start_ms();
        buf.extend_from_slice(&start.to_le_bytes());
        buf.extend_from_slice(&episode.end_ms().unwrap_or(start).to_le_bytes());
    }
    buf
}

/// Decode bytes produced by [`encode_statistic`].
///
/// Every declared count is checked against the bytes that remain, so a
/// truncated or foreign file is rejected instead of misread.
pub fn parse_statistic_bytes(bytes: &[u8]) -> Result<Statistic, PersistError> {
    let mut off = 0;
    let total = read_count(bytes, &mut off)?;
    let block = read_count(bytes, &mut off)?;
    let episode_count = read_count(bytes, &mut off)?;

    let remaining = bytes.len() - off;
    if episode_count > remaining / MIN_EPISODE_SIZE {
        return Err(PersistError::Malformed("episode count exceeds file size"));
    }

    let mut episodes = Vec::with_capacity(episode_count);
    for _ in 0..episode_count {
        let action_count = read_count(bytes, &mut off)?;
        let record_len = action_count
            .checked_mul(Action::WIRE_SIZE)
            .and_then(|n| n.checked_add(STAMPS_SIZE))
            .ok_or(PersistError::Malformed("action count overflows"))?;
        if bytes.len() - off < record_len {
            return Err(PersistError::Truncated { offset: bytes.len() });
        }

        let mut actions = Vec::with_capacity(action_count);
        for _ in 0..action_count {
            let code = read_u32_le(&bytes[off..]).ok_or(PersistError::Truncated { offset: off })?;
            actions.push(Action::from_code(code));
            off += Action::WIRE_SIZE;
        }
        let start_ms = read_u64_le(&bytes[off..]).ok_or(PersistError::Truncated { offset: off })?;
        off += 8;
        let end_ms = read_u64_le(&bytes[off..]).ok_or(PersistError::Truncated { offset: off })?;
        off += 8;
        episodes.push(Episode::from_parts(actions, start_ms, end_ms));
    }

    if off != bytes.len() {
        return Err(PersistError::TrailingBytes(bytes.len() - off));
    }
    Ok(Statistic::from_parts(total, block, episodes))
}

fn read_count(bytes: &[u8], off: &mut usize) -> Result<usize, PersistError> {
    let raw = read_u64_le(&bytes[*off..]).ok_or(PersistError::Truncated { offset: *off })?;
    *off += COUNT_SIZE;
    usize::try_from(raw).map_err(|_| PersistError::Malformed("count does not fit usize"))
}

pub fn write_statistic_to_path<P: AsRef<Path>>(path: P, stat: &Statistic) -> Result<(), PersistError> {
    let path = path.as_ref();
    let data = encode_statistic(stat);
    fs::write(path, &data)?;
    info!(path = %path.display(), episodes = stat.len(), bytes = data.len(), "statistic saved");
    Ok(())
}

pub fn read_statistic_from_path<P: AsRef<Path>>(path: P) -> Result<Statistic, PersistError> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let stat = parse_statistic_bytes(&data)?;
    info!(path = %path.display(), episodes = stat.len(), "statistic loaded");
    Ok(stat)
}
