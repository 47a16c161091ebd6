use crate::agent::{Player, RandomSpawner};
use crate::statistic::Statistic;

/// Knobs for a simulation session. Defaults match the command-line defaults.
///
/// - `total`: episodes to collect before stopping.
/// - `block`: report every this many episodes (0 reports once, at `total`).
/// - `seed`: seed for the tile spawner.
/// - `win_tile`: exponent at which the player stops an episode early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub total: usize,
    pub block: usize,
    pub seed: u64,
    pub win_tile: Option<u8>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { total: 1000, block: 0, seed: 0, win_tile: None }
    }
}

impl SessionConfig {
    pub fn statistic(&self) -> Statistic { Statistic::new(self.total, self.block) }

    pub fn player(&self) -> Player { Player::with_win_tile(self.win_tile) }

    pub fn spawner(&self) -> RandomSpawner { RandomSpawner::new(self.seed) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        let stat = config.statistic();
        assert_eq!(stat.total(), 1000);
        assert_eq!(stat.block(), 1000);
        assert!(stat.is_empty());
    }
}
