//! Negamax with alpha-beta pruning.
//!
//! Each node copies the position it explores, so branches share nothing and
//! the only cross-thread state is the [`SearchControl`] flags.

use chess_core::{Color, Move};
use chess_engine::{apply_move, is_in_check, legal_moves, Position};

use crate::control::SearchControl;
use crate::eval::StaticEvaluator;

/// Larger than any reachable score.
pub const INFINITY: i32 = 1_000_000;
/// Base score for delivering mate. Each remaining ply of depth adds
/// [`MATE_DEPTH_BONUS`], so quicker mates score higher.
pub const MATE_SCORE: i32 = 50_000;
pub const MATE_DEPTH_BONUS: i32 = 100;
/// Magnitude of a stalemate: bad for the side ahead on material, good otherwise.
pub const STALEMATE_SCORE: i32 = 10_000;
/// Root penalty for shuffling a piece back while the opponent does the same.
pub const REPETITION_PENALTY: i32 = 30;

/// The search was stopped before it could produce a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Best root move of one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootBest {
    pub mv: Move,
    pub score: i32,
}

/// Runs fixed-depth searches and counts the nodes it visits.
pub struct Searcher<'a> {
    evaluator: &'a StaticEvaluator,
    control: &'a SearchControl,
    nodes: u64,
}

impl<'a> Searcher<'a> {
    pub fn new(evaluator: &'a StaticEvaluator, control: &'a SearchControl) -> Self {
        Searcher {
            evaluator,
            control,
            nodes: 0,
        }
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Scores every root candidate to `depth` extra plies and returns the best.
    ///
    /// `history` is the game so far, used for the shuffle penalty. `visit` is
    /// called with each candidate's index before it is searched. Returns
    /// `Ok(None)` only when `candidates` is empty.
    pub fn search_root<F>(
        &mut self,
        position: &Position,
        color: Color,
        candidates: &[Move],
        depth: u32,
        history: &[Move],
        mut visit: F,
    ) -> Result<Option<RootBest>, Cancelled>
    where
        F: FnMut(usize, &Move),
    {
        self.enter()?;

        let mut best: Option<RootBest> = None;
        let mut alpha = -INFINITY;
        for (i, mv) in candidates.iter().enumerate() {
            visit(i, mv);
            let mut score = self.score_move(position, color, mv, depth, alpha, INFINITY)?;
            if repeats_shuffle(mv, history) {
                score -= REPETITION_PENALTY;
            }
            if best.map_or(true, |b| score > b.score) {
                best = Some(RootBest { mv: *mv, score });
            }
            alpha = alpha.max(score);
        }
        Ok(best)
    }

    /// The value of the best move in `moves` for `color`, within the window.
    fn negamax(
        &mut self,
        position: &Position,
        color: Color,
        moves: &[Move],
        depth: u32,
        mut alpha: i32,
        beta: i32,
    ) -> Result<i32, Cancelled> {
        self.enter()?;

        let mut best = -INFINITY;
        for mv in moves {
            let score = self.score_move(position, color, mv, depth, alpha, beta)?;
            best = best.max(score);
            alpha = alpha.max(best);
            if alpha >= beta {
                return Ok(alpha);
            }
        }
        Ok(best)
    }

    /// Score of playing `mv`, searching `depth` more plies of replies.
    fn score_move(
        &mut self,
        position: &Position,
        color: Color,
        mv: &Move,
        depth: u32,
        alpha: i32,
        beta: i32,
    ) -> Result<i32, Cancelled> {
        let (next, _) = apply_move(position, color, mv);
        if depth == 0 {
            return Ok(self.evaluator.evaluate(&next, color));
        }

        let opponent = color.opponent();
        let replies = legal_moves(&next, opponent);
        if replies.is_empty() {
            return Ok(terminal_score(&next, color, depth));
        }
        let reply = self.negamax(&next, opponent, replies.as_slice(), depth - 1, -beta, -alpha)?;
        Ok(-reply)
    }

    #[inline]
    fn enter(&mut self) -> Result<(), Cancelled> {
        self.nodes += 1;
        if self.control.is_stopped() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Score for `mover` after its move left the opponent without replies.
pub fn terminal_score(position: &Position, mover: Color, depth: u32) -> i32 {
    let opponent = mover.opponent();
    if is_in_check(position, opponent) {
        return MATE_SCORE + depth as i32 * MATE_DEPTH_BONUS;
    }
    let lead = position.side(mover).material() - position.side(opponent).material();
    if lead > 0 {
        -STALEMATE_SCORE
    } else {
        STALEMATE_SCORE
    }
}

/// True if `candidate` takes back the mover's last move while the opponent
/// has just taken back its own, with no captures involved.
pub fn repeats_shuffle(candidate: &Move, history: &[Move]) -> bool {
    let [.., their_earlier, mine, their_last] = history else {
        return false;
    };
    candidate.reverses(mine)
        && !mine.capture
        && their_last.reverses(their_earlier)
        && !their_last.capture
        && !their_earlier.capture
}
