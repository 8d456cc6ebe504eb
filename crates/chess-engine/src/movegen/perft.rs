//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal move tree to a fixed depth;
//! the totals are compared against published reference numbers.

use chess_core::Color;

use super::legal_moves;
use crate::{apply_move, Position};

/// Number of leaf nodes `depth` plies below `position`, `color` to move.
pub fn perft(position: &Position, color: Color, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = legal_moves(position, color);
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .iter()
        .map(|m| {
            let (next, _) = apply_move(position, color, m);
            perft(&next, color.opponent(), depth - 1)
        })
        .sum()
}

/// Per-move subtotals at `depth`, sorted by coordinate notation.
pub fn perft_divide(position: &Position, color: Color, depth: u32) -> Vec<(String, u64)> {
    let mut results: Vec<(String, u64)> = legal_moves(position, color)
        .iter()
        .map(|m| {
            let (next, _) = apply_move(position, color, m);
            let nodes = perft(&next, color.opponent(), depth.saturating_sub(1));
            (m.to_coordinate(), nodes)
        })
        .collect();
    results.sort();
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 0 1";

    fn run(fen: &str, depth: u32) -> u64 {
        let (position, color) = Position::from_fen(fen).unwrap();
        perft(&position, color, depth)
    }

    #[test]
    fn start_position() {
        let position = Position::new_game();
        let expected = [1, 20, 400, 8902];
        for (depth, nodes) in expected.into_iter().enumerate() {
            assert_eq!(perft(&position, Color::White, depth as u32), nodes);
        }
    }

    #[test]
    fn start_position_depth_4() {
        assert_eq!(perft(&Position::new_game(), Color::White, 4), 197_281);
    }

    // Depth 5 is slow without optimizations.
    #[test]
    #[ignore]
    fn start_position_depth_5() {
        assert_eq!(perft(&Position::new_game(), Color::White, 5), 4_865_609);
    }

    // Castling through and out of attacked squares, pins, and en passant.
    #[test]
    fn kiwipete() {
        assert_eq!(run(KIWIPETE, 1), 48);
        assert_eq!(run(KIWIPETE, 2), 2039);
        assert_eq!(run(KIWIPETE, 3), 97_862);
    }

    // Check evasion and horizontal en-passant pins.
    #[test]
    fn position_3() {
        assert_eq!(run(POSITION_3, 1), 14);
        assert_eq!(run(POSITION_3, 2), 191);
        assert_eq!(run(POSITION_3, 3), 2812);
    }

    // Promotions and captures.
    #[test]
    fn position_4() {
        assert_eq!(run(POSITION_4, 1), 6);
        assert_eq!(run(POSITION_4, 2), 264);
        assert_eq!(run(POSITION_4, 3), 9467);
    }

    #[test]
    fn position_5() {
        assert_eq!(run(POSITION_5, 1), 44);
        assert_eq!(run(POSITION_5, 2), 1486);
        assert_eq!(run(POSITION_5, 3), 62_379);
    }

    #[test]
    fn divide_sums_to_perft() {
        let position = Position::new_game();
        let results = perft_divide(&position, Color::White, 2);
        assert_eq!(results.len(), 20);
        assert_eq!(results.iter().map(|(_, n)| n).sum::<u64>(), 400);
        assert_eq!(results[0].0, "a2a3");
    }
}
