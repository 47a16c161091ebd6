//! Episode history and block reports.
//!
//! A [`Statistic`] owns every recorded [`Episode`] in chronological order and
//! recomputes scores on demand by replaying them. Reports look like
//!
//! ```text
//! 1000    avg = 273901, max = 382324, ops = 241563
//!         512     100.0%  (0.3%)
//!         1024    99.7%   (0.2%)
//!         2048    99.5%   (1.1%)
//! ```
//!
//! where `99.7%` of the games reached a 1024-tile and `0.2%` ended with
//! 1024 as their largest tile.

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::action::Action;
use crate::board::face_value;
use crate::episode::{now_millis, Episode, Turn};
use crate::error::Error;
use crate::serialization::{self, PersistError};

/// Share of a report window whose best tile is a given exponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileShare {
    pub exponent: u8,
    /// Percent of games whose best tile is at least `exponent`.
    pub reach: f64,
    /// Percent of games whose best tile is exactly `exponent`.
    pub exact: f64,
}

/// Summary metrics over a trailing window of episodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Number of episodes stored when the report was taken.
    pub index: usize,
    /// Episodes in the window.
    pub games: usize,
    pub avg: f64,
    pub max: u64,
    /// Actions per second: actions replayed over the wall-clock span from
    /// the oldest episode's start to the newest episode's end.
    pub ops: f64,
    /// Present best-tile exponents, ascending.
    pub tiles: Vec<TileShare>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}\tavg = {}, max = {}, ops = {}",
            self.index, self.avg as u64, self.max, self.ops as u64
        )?;
        for share in &self.tiles {
            writeln!(
                f,
                "\t{}\t{}%\t({}%)",
                face_value(share.exponent),
                percent(share.reach),
                percent(share.exact)
            )?;
        }
        writeln!(f)
    }
}

/// Six significant digits, trailing zeros dropped: `100`, `99.7`, `33.3333`.
fn percent(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (5 - magnitude).max(0) as usize;
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Collection of recorded episodes with a target count and a report block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistic {
    total: usize,
    block: usize,
    episodes: Vec<Episode>,
}

impl Statistic {
    /// `block == 0` reports once per `total` episodes.
    pub fn new(total: usize, block: usize) -> Self {
        let block = if block == 0 { total } else { block };
        Statistic { total, block, episodes: Vec::new() }
    }

    /// Rebuild from persisted parts. A stored `block` of 0 means `total`, as in [`Statistic::new`].
    pub fn from_parts(total: usize, block: usize, episodes: Vec<Episode>) -> Self {
        let block = if block == 0 { total } else { block };
        Statistic { total, block, episodes }
    }

    #[inline]
    pub fn total(&self) -> usize { self.total }

    #[inline]
    pub fn block(&self) -> usize { self.block }

    #[inline]
    pub fn episodes(&self) -> &[Episode] { &self.episodes }

    #[inline]
    pub fn len(&self) -> usize { self.episodes.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.episodes.is_empty() }

    #[inline]
    pub fn is_finished(&self) -> bool { self.episodes.len() >= self.total }

    pub fn open_episode(&mut self) { self.open_episode_at(now_millis()) }

    pub fn open_episode_at(&mut self, start_ms: u64) {
        self.episodes.push(Episode::open_at(start_ms));
    }

    /// Append to the current episode.
    pub fn save_action(&mut self, action: Action) -> Result<(), Error> {
        self.episodes.last_mut().ok_or(Error::NoOpenEpisode)?.push(action)
    }

    /// Close the current episode; returns a report at every block boundary.
    pub fn close_episode(&mut self) -> Result<Option<Report>, Error> {
        self.close_episode_at(now_millis())
    }

    pub fn close_episode_at(&mut self, end_ms: u64) -> Result<Option<Report>, Error> {
        let episode = self.episodes.last_mut().ok_or(Error::NoOpenEpisode)?;
        episode.close_at(end_ms)?;
        let actions = episode.len();
        debug!(index = self.episodes.len(), actions, "episode closed");
        if self.episodes.len() % self.block.max(1) == 0 {
            Ok(Some(self.show()))
        } else {
            Ok(None)
        }
    }

    /// Whose turn it is in the current episode.
    pub fn turn(&self) -> Turn {
        self.episodes.last().map_or(Turn::after(0), Episode::turn)
    }

    /// Report over the last `block` episodes.
    pub fn show(&self) -> Report { self.report(self.block.max(1)) }

    /// Report over the whole history.
    pub fn summary(&self) -> Report { self.report(self.episodes.len()) }

    /// Report over the last `window` episodes (fewer if not enough are stored).
    pub fn report(&self, window: usize) -> Report {
        let games = window.min(self.episodes.len());
        let recent = &self.episodes[self.episodes.len() - games..];
        let mut sum: u64 = 0;
        let mut max: u64 = 0;
        let mut opc: u64 = 0;
        let mut stat = [0usize; 16];
        for episode in recent {
            let replay = episode.replay();
            sum += replay.score;
            max = max.max(replay.score);
            opc += replay.actions as u64;
            stat[replay.board.max_tile() as usize] += 1;
        }

        let (avg, ops) = match (recent.first(), recent.last()) {
            (Some(oldest), Some(newest)) => {
                let end = newest.end_ms().unwrap_or(newest.start_ms());
                let elapsed = end.saturating_sub(oldest.start_ms()).max(1);
                (sum as f64 / games as f64, opc as f64 * 1000.0 / elapsed as f64)
            }
            _ => (0.0, 0.0),
        };

        let coef = if games == 0 { 0.0 } else { 100.0 / games as f64 };
        let tiles = (0..16)
            .filter(|&t| stat[t] > 0)
            .map(|t| TileShare {
                exponent: t as u8,
                reach: stat[t..].iter().sum::<usize>() as f64 * coef,
                exact: stat[t] as f64 * coef,
            })
            .collect();

        Report { index: self.episodes.len(), games, avg, max, ops, tiles }
    }

    /// Persist to `path` in the binary statistic format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistError> {
        serialization::write_statistic_to_path(path, self)
    }

    /// Load a statistic previously written with [`Statistic::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PersistError> {
        serialization::read_statistic_from_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Move;

    fn record(stat: &mut Statistic, start: u64, end: u64, actions: &[Action]) -> Option<Report> {
        stat.open_episode_at(start);
        for &action in actions {
            stat.save_action(action).unwrap();
        }
        stat.close_episode_at(end).unwrap()
    }

    /// Two 2-tiles merged into a 4: score 4, best exponent 2.
    fn merge_game() -> Vec<Action> {
        vec![Action::place(1, 0), Action::place(1, 1), Action::slide(Move::Left)]
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    #[test]
    fn block_defaults_to_total() {
        let stat = Statistic::new(10, 0);
        assert_eq!(stat.block(), 10);
        assert_eq!(Statistic::new(10, 3).block(), 3);
    }

    #[test]
    fn save_action_needs_open_episode() {
        let mut stat = Statistic::new(1, 1);
        assert_eq!(stat.save_action(Action::place(1, 0)), Err(Error::NoOpenEpisode));
        assert_eq!(stat.close_episode_at(0), Err(Error::NoOpenEpisode));
        record(&mut stat, 0, 1, &[]);
        assert_eq!(stat.save_action(Action::place(1, 0)), Err(Error::EpisodeClosed));
    }

    #[test]
    fn reports_at_block_boundaries() {
        let mut stat = Statistic::new(4, 2);
        assert!(record(&mut stat, 0, 10, &merge_game()).is_none());
        let report = record(&mut stat, 10, 20, &[Action::place(3, 0)]).expect("block report");

        assert_eq!(report.index, 2);
        assert_eq!(report.games, 2);
        assert_close(report.avg, 2.0);
        assert_eq!(report.max, 4);
        // 4 actions over 0..20 ms
        assert_close(report.ops, 200.0);
        assert_eq!(report.tiles.len(), 2);
        assert_eq!(report.tiles[0].exponent, 2);
        assert_close(report.tiles[0].reach, 100.0);
        assert_close(report.tiles[0].exact, 50.0);
        assert_eq!(report.tiles[1].exponent, 3);
        assert_close(report.tiles[1].reach, 50.0);
        assert_close(report.tiles[1].exact, 50.0);

        assert!(record(&mut stat, 100, 110, &[Action::place(1, 5)]).is_none());
        assert!(!stat.is_finished());
        record(&mut stat, 110, 120, &[]);
        assert!(stat.is_finished());
    }

    #[test]
    fn summary_keeps_block() {
        let mut stat = Statistic::new(3, 2);
        record(&mut stat, 0, 10, &merge_game());
        record(&mut stat, 10, 20, &[Action::place(3, 0)]);
        record(&mut stat, 100, 110, &[Action::place(1, 5)]);

        let summary = stat.summary();
        assert_eq!(summary.games, 3);
        assert_close(summary.avg, 4.0 / 3.0);
        assert_close(summary.ops, 5.0 * 1000.0 / 110.0);
        let exps: Vec<u8> = summary.tiles.iter().map(|s| s.exponent).collect();
        assert_eq!(exps, vec![1, 2, 3]);
        assert_close(summary.tiles[0].reach, 100.0);
        assert_close(summary.tiles[1].reach, 200.0 / 3.0);
        assert_close(summary.tiles[2].exact, 100.0 / 3.0);

        assert_eq!(stat.block(), 2);
        let show = stat.show();
        assert_eq!(show.games, 2);
        // gap between the second episode's start and the third's end
        assert_close(show.ops, 2.0 * 1000.0 / 100.0);
    }

    #[test]
    fn ops_span_is_clamped() {
        let mut stat = Statistic::new(1, 1);
        let report = record(&mut stat, 50, 50, &merge_game()).unwrap();
        assert_close(report.ops, 3000.0);
    }

    #[test]
    fn empty_report() {
        let stat = Statistic::new(5, 5);
        let report = stat.show();
        assert_eq!(report.games, 0);
        assert!(report.tiles.is_empty());
        assert_close(report.avg, 0.0);
    }

    #[test]
    fn percent_text() {
        assert_eq!(percent(100.0), "100");
        assert_eq!(percent(99.7), "99.7");
        assert_eq!(percent(0.3), "0.3");
        assert_eq!(percent(200.0 / 3.0), "66.6667");
        assert_eq!(percent(100.0 / 3.0), "33.3333");
        assert_eq!(percent(0.0), "0");
    }

    #[test]
    fn zero_block_from_parts_means_total() {
        let mut stat = Statistic::from_parts(2, 0, Vec::new());
        assert_eq!(stat.block(), 2);
        assert!(record(&mut stat, 0, 10, &merge_game()).is_none());
        let report = record(&mut stat, 10, 20, &merge_game()).expect("block report");
        assert_eq!(report.games, 2);

        let mut empty = Statistic::from_parts(0, 0, Vec::new());
        let report = record(&mut empty, 0, 1, &merge_game()).expect("report");
        assert_eq!(report.games, 1);
    }

    #[test]
    fn report_text() {
        let mut stat = Statistic::new(2, 2);
        record(&mut stat, 0, 10, &merge_game());
        let report = record(&mut stat, 10, 20, &[Action::place(3, 0)]).unwrap();
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "2\tavg = 2, max = 4, ops = 200");
        assert_eq!(lines[1], "\t4\t100%\t(50%)");
        assert_eq!(lines[2], "\t8\t50%\t(50%)");
        assert_eq!(lines[3], "");
    }
}
