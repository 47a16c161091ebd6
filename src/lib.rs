//! env-2048: a simulation environment for the 2048 puzzle
//!
//! This crate provides:
//! - A packed `Board` with one slide/merge algorithm; the other directions
//!   reuse it through reflections and rotations (`board` module)
//! - `Action` opcodes covering both slides and tile placements (`action`)
//! - A greedy `Player` and a seeded `RandomSpawner` (`agent`)
//! - Episode recording with replay as the only source of scores (`episode`)
//! - Block reports over the recorded history (`statistic`)
//! - A binary save/resume format for that history (`serialization`)
//!
//! Full loop:
//! ```
//! use env_2048::agent::{Player, RandomSpawner};
//! use env_2048::game::play_episode;
//! use env_2048::statistic::Statistic;
//!
//! let mut stat = Statistic::new(2, 1);
//! let mut player = Player::new();
//! let mut spawner = RandomSpawner::new(42);
//! while !stat.is_finished() {
//!     if let Some(report) = play_episode(&mut stat, &mut player, &mut spawner).unwrap() {
//!         print!("{report}");
//!     }
//! }
//!
//! // Scores come from replaying the recorded actions.
//! let bytes = env_2048::serialization::encode_statistic(&stat);
//! let loaded = env_2048::serialization::parse_statistic_bytes(&bytes).unwrap();
//! assert_eq!(loaded.summary().max, stat.summary().max);
//! ```
//!
pub mod action;
pub mod agent;
pub mod board;
pub mod config;
pub mod episode;
pub mod error;
pub mod game;
pub mod serialization;
pub mod statistic;

pub use error::Error;
