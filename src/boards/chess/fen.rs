use super::{
    BLACK_KINGSIDE, BLACK_QUEENSIDE, ChessBoard, ChessPiece, PieceKind, WHITE_KINGSIDE,
    WHITE_QUEENSIDE, file_of, parse_square, rank_of, square, square_name,
};
use crate::board::Side;
use crate::error::GameError;

const CASTLING_LETTERS: [(char, u8); 4] = [
    ('K', WHITE_KINGSIDE),
    ('Q', WHITE_QUEENSIDE),
    ('k', BLACK_KINGSIDE),
    ('q', BLACK_QUEENSIDE),
];

fn fen_error(msg: impl Into<String>) -> GameError {
    GameError::Fen(msg.into())
}

impl ChessBoard {
    /// Parses a position in Forsyth-Edwards Notation. The clock fields may be omitted.
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or_else(|| fen_error("empty FEN"))?;
        let to_move = fields.next().unwrap_or("w");
        let castling = fields.next().unwrap_or("-");
        let en_passant = fields.next().unwrap_or("-");
        let halfmove = fields.next().unwrap_or("0");
        let fullmove = fields.next().unwrap_or("1");

        let to_move = match to_move {
            "w" => Side::First,
            "b" => Side::Second,
            other => return Err(fen_error(format!("bad side to move {other:?}"))),
        };
        let mut board = ChessBoard::empty(to_move);

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(fen_error(format!("expected 8 ranks, got {}", ranks.len())));
        }
        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for ch in rank_text.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(fen_error(format!("bad empty-square count {ch:?}")));
                    }
                    file = file
                        .checked_add(skip as u8)
                        .filter(|&f| f <= 8)
                        .ok_or_else(|| fen_error(format!("rank {} overflows", rank + 1)))?;
                    continue;
                }
                let piece = ChessPiece::from_symbol(ch)
                    .ok_or_else(|| fen_error(format!("unknown piece {ch:?}")))?;
                if file >= 8 {
                    return Err(fen_error(format!("rank {} overflows", rank + 1)));
                }
                board.set_piece(square(file, rank), Some(piece));
                file += 1;
            }
            if file != 8 {
                return Err(fen_error(format!("rank {} has {file} files", rank + 1)));
            }
        }

        if castling != "-" {
            for ch in castling.chars() {
                let (_, flag) = CASTLING_LETTERS
                    .iter()
                    .find(|(letter, _)| *letter == ch)
                    .ok_or_else(|| fen_error(format!("bad castling flag {ch:?}")))?;
                board.castling |= flag;
            }
        }

        if en_passant != "-" {
            let target = parse_square(en_passant)
                .ok_or_else(|| fen_error(format!("bad en-passant square {en_passant:?}")))?;
            if !board.is_valid_en_passant_target(target) {
                return Err(fen_error(format!(
                    "no pawn can be taken en passant on {en_passant}"
                )));
            }
            board.en_passant = Some(target);
        }

        board.halfmove_clock = halfmove
            .parse()
            .map_err(|_| fen_error(format!("bad halfmove clock {halfmove:?}")))?;
        board.fullmove = fullmove
            .parse()
            .map_err(|_| fen_error(format!("bad fullmove number {fullmove:?}")))?;

        for side in [Side::First, Side::Second] {
            if board.king_square(side).is_none() {
                return Err(fen_error(format!("{side:?} has no king")));
            }
        }

        Ok(board)
    }

    /// The target must sit behind an enemy pawn that just made a double push: on the
    /// sixth rank with White to move, the third with Black to move, with the pawn's
    /// origin square empty.
    fn is_valid_en_passant_target(&self, target: u8) -> bool {
        let (target_rank, pawn_rank, origin_rank) = match self.side_to_move {
            Side::First => (5, 4, 6),
            Side::Second => (2, 3, 1),
        };
        let file = file_of(target);
        let passed_pawn = ChessPiece::new(PieceKind::Pawn, self.side_to_move.opposite());

        rank_of(target) == target_rank
            && self.piece_at(target).is_none()
            && self.piece_at(square(file, origin_rank)).is_none()
            && self.piece_at(square(file, pawn_rank)) == Some(passed_pawn)
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(square(file, rank)) {
                    None => empty += 1,
                    Some(piece) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.symbol());
                    }
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Side::First => 'w',
            Side::Second => 'b',
        });

        fen.push(' ');
        let rights: String = CASTLING_LETTERS
            .iter()
            .filter(|(_, flag)| self.castling & flag != 0)
            .map(|(letter, _)| *letter)
            .collect();
        fen.push_str(if rights.is_empty() { "-" } else { &rights });

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&square_name(sq)),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove));
        fen
    }
}
