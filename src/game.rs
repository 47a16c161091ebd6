use tracing::trace;

use crate::agent::Agent;
use crate::board::Board;
use crate::episode::Turn;
use crate::error::Error;
use crate::statistic::{Report, Statistic};

/// Play one episode from an empty board, recording every applied action.
///
/// Turns alternate as [`Turn::after`] dictates. The episode ends when the
/// acting agent has no action, its action is illegal, or it reports a win.
/// The live board is discarded; the outcome lives only in the recorded
/// actions. Returns the block report if this episode completed a block.
pub fn play_episode(
    stat: &mut Statistic,
    mover: &mut dyn Agent,
    placer: &mut dyn Agent,
) -> Result<Option<Report>, Error> {
    stat.open_episode();
    let mut board = Board::EMPTY;
    loop {
        let who: &mut dyn Agent = match stat.turn() {
            Turn::Mover => &mut *mover,
            Turn::Placer => &mut *placer,
        };
        let Some(action) = who.take_action(&board) else { break };
        if action.apply(&mut board).is_none() {
            break;
        }
        trace!(agent = who.name(), %action, "applied");
        stat.save_action(action)?;
        if who.check_for_win(&board) {
            break;
        }
    }
    stat.close_episode()
}
