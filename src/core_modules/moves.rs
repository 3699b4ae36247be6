// THEORY:
// The `moves` module is the shared vocabulary between the solving engine and
// the animation engine: a move is a face, a turn amount, and (for quarter
// turns) a direction. Parsing is strict -- any token outside `[URFDLB](2|'|)?`
// is an error naming the token -- because a silently dropped move would
// desynchronize playback from the solution. Half turns carry no direction;
// 180 degrees is 180 degrees either way, and inversion maps a half turn to
// itself.

use std::fmt;

use crate::core_modules::face::FaceLetter;

/// Turn amount and direction of one move token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// A plain token: quarter turn clockwise, seen from outside the face.
    Clockwise,
    /// A `'` token: quarter turn counter-clockwise.
    CounterClockwise,
    /// A `2` token: half turn, direction irrelevant.
    Half,
}

/// One face turn of the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub face: FaceLetter,
    pub turn: Turn,
}

impl Move {
    pub fn new(face: FaceLetter, turn: Turn) -> Self {
        Self { face, turn }
    }

    /// Parses a single token of the form `[URFDLB](2|'|)?`.
    pub fn parse(token: &str) -> Result<Self, MoveParseError> {
        let err = || MoveParseError {
            token: token.to_string(),
        };
        let mut chars = token.chars();
        let face = chars.next().and_then(FaceLetter::from_char).ok_or_else(err)?;
        let turn = match chars.next() {
            None => Turn::Clockwise,
            Some('\'') => Turn::CounterClockwise,
            Some('2') => Turn::Half,
            Some(_) => return Err(err()),
        };
        if chars.next().is_some() {
            return Err(err());
        }
        Ok(Self { face, turn })
    }

    /// The move that undoes this one.
    pub fn invert(self) -> Self {
        let turn = match self.turn {
            Turn::Clockwise => Turn::CounterClockwise,
            Turn::CounterClockwise => Turn::Clockwise,
            Turn::Half => Turn::Half,
        };
        Self {
            face: self.face,
            turn,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.turn {
            Turn::Clockwise => write!(f, "{}", self.face),
            Turn::CounterClockwise => write!(f, "{}'", self.face),
            Turn::Half => write!(f, "{}2", self.face),
        }
    }
}

/// Parses a whitespace-separated move sequence.
pub fn parse_sequence(s: &str) -> Result<Vec<Move>, MoveParseError> {
    s.split_whitespace().map(Move::parse).collect()
}

/// The sequence that undoes `moves`: reversed order, each move inverted.
pub fn invert_sequence(moves: &[Move]) -> Vec<Move> {
    moves.iter().rev().map(|m| m.invert()).collect()
}

/// Renders a sequence back to the whitespace-separated wire form.
pub fn format_sequence(moves: &[Move]) -> String {
    moves
        .iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A token that does not match `[URFDLB](2|'|)?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveParseError {
    pub token: String,
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid move token: {:?}", self.token)
    }
}

impl std::error::Error for MoveParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_token_forms() {
        assert_eq!(
            Move::parse("R").unwrap(),
            Move::new(FaceLetter::R, Turn::Clockwise)
        );
        assert_eq!(
            Move::parse("U'").unwrap(),
            Move::new(FaceLetter::U, Turn::CounterClockwise)
        );
        assert_eq!(
            Move::parse("F2").unwrap(),
            Move::new(FaceLetter::F, Turn::Half)
        );
    }

    #[test]
    fn test_parse_rejects_malformed_tokens() {
        for bad in ["", "X", "R3", "R''", "R2'", "r"] {
            let err = Move::parse(bad).unwrap_err();
            assert_eq!(err.token, bad);
        }
    }

    #[test]
    fn test_inversion_rules() {
        let r = Move::parse("R").unwrap();
        let r_prime = Move::parse("R'").unwrap();
        let r2 = Move::parse("R2").unwrap();
        assert_eq!(r.invert(), r_prime);
        assert_eq!(r_prime.invert(), r);
        assert_eq!(r2.invert(), r2);
    }

    #[test]
    fn test_display_round_trips() {
        for token in ["R", "U'", "F2", "D", "L'", "B2"] {
            assert_eq!(Move::parse(token).unwrap().to_string(), token);
        }
    }

    #[test]
    fn test_sequence_parse_and_invert() {
        let moves = parse_sequence("R U' F2  D").unwrap();
        assert_eq!(moves.len(), 4);
        let inverse = invert_sequence(&moves);
        assert_eq!(format_sequence(&inverse), "D' F2 U R'");
    }

    #[test]
    fn test_sequence_parse_fails_on_first_bad_token() {
        let err = parse_sequence("R U8 F").unwrap_err();
        assert_eq!(err.token, "U8");
    }

    #[test]
    fn test_empty_sequence_parses_empty() {
        assert!(parse_sequence("  ").unwrap().is_empty());
    }
}
