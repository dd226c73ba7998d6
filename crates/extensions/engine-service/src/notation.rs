//! Displayed notation to UCI.

use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, Position};

use crate::error::ServiceError;

/// Replace piece figurines with SAN letters. Pawn figurines are dropped.
pub fn normalize_figurines(notation: &str) -> String {
    notation
        .trim()
        .chars()
        .filter_map(|c| match c {
            '♔' | '♚' => Some('K'),
            '♕' | '♛' => Some('Q'),
            '♖' | '♜' => Some('R'),
            '♗' | '♝' => Some('B'),
            '♘' | '♞' => Some('N'),
            '♙' | '♟' => None,
            c => Some(c),
        })
        .collect()
}

/// Replay `moves` from the standard start position and return them in UCI.
pub fn san_to_uci(moves: &[String]) -> Result<Vec<String>, ServiceError> {
    let mut pos = Chess::default();
    let mut uci = Vec::with_capacity(moves.len());

    for (index, notation) in moves.iter().enumerate() {
        let illegal = |reason: String| ServiceError::IllegalMove {
            ply: index + 1,
            notation: notation.clone(),
            reason,
        };

        let san = normalize_figurines(notation)
            .parse::<SanPlus>()
            .map_err(|e| illegal(e.to_string()))?;
        let m = san.san.to_move(&pos).map_err(|e| illegal(e.to_string()))?;

        uci.push(m.to_uci(CastlingMode::Standard).to_string());
        pos.play_unchecked(m);
    }

    Ok(uci)
}
