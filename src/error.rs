/// Misuse of the episode recorder.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("episode is already closed")]
    EpisodeClosed,
    #[error("no episode is open")]
    NoOpenEpisode,
}
