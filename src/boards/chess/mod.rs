//! Chess with castling, en-passant, promotion and the draw rules used by the game
//! (fifty-move counter and insufficient material).
//!
//! Squares are indexed `rank * 8 + file`, rank 0 being White's back rank. White is
//! `Side::First`.

mod fen;
pub mod tables;

use crate::board::{Board, GameOutcome, Score, Side};
use fastmurmur3::murmur3_x64_128;
use std::fmt;

/// Halfmove clock value at which the game is drawn.
pub const HALFMOVE_DRAW: u32 = 50;

const WHITE_KINGSIDE: u8 = 0b0001;
const WHITE_QUEENSIDE: u8 = 0b0010;
const BLACK_KINGSIDE: u8 = 0b0100;
const BLACK_QUEENSIDE: u8 = 0b1000;

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

const PROMOTIONS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

pub fn square(file: u8, rank: u8) -> u8 {
    rank * 8 + file
}

pub fn file_of(sq: u8) -> u8 {
    sq % 8
}

pub fn rank_of(sq: u8) -> u8 {
    sq / 8
}

fn offset(sq: u8, (df, dr): (i8, i8)) -> Option<u8> {
    let file = file_of(sq) as i8 + df;
    let rank = rank_of(sq) as i8 + dr;
    ((0..8).contains(&file) && (0..8).contains(&rank)).then(|| square(file as u8, rank as u8))
}

/// Parses algebraic square names such as `e4`.
pub fn parse_square(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let file = chars.next()?;
    let rank = chars.next()?;
    if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }
    Some(square(file as u8 - b'a', rank as u8 - b'1'))
}

pub fn square_name(sq: u8) -> String {
    format!("{}{}", (b'a' + file_of(sq)) as char, rank_of(sq) + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Material value in centipawns.
    pub fn value(self) -> Score {
        match self {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 300,
            PieceKind::Bishop => 300,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 0,
        }
    }

    fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    fn from_letter(letter: char) -> Option<Self> {
        Some(match letter.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessPiece {
    pub kind: PieceKind,
    pub side: Side,
}

impl ChessPiece {
    pub fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }

    /// FEN letter: upper case for White.
    pub fn symbol(self) -> char {
        match self.side {
            Side::First => self.kind.letter().to_ascii_uppercase(),
            Side::Second => self.kind.letter(),
        }
    }

    fn from_symbol(symbol: char) -> Option<Self> {
        let kind = PieceKind::from_letter(symbol)?;
        let side = if symbol.is_ascii_uppercase() {
            Side::First
        } else {
            Side::Second
        };
        Some(Self { kind, side })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Quiet,
    DoublePush,
    Capture,
    EnPassant { captured: u8 },
    Castle { rook_from: u8, rook_to: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessMove {
    pub from: u8,
    pub to: u8,
    pub kind: MoveKind,
    pub promotion: Option<PieceKind>,
}

impl ChessMove {
    fn new(from: u8, to: u8, kind: MoveKind) -> Self {
        Self {
            from,
            to,
            kind,
            promotion: None,
        }
    }

    pub fn is_capture(&self) -> bool {
        matches!(self.kind, MoveKind::Capture | MoveKind::EnPassant { .. })
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", square_name(self.from), square_name(self.to))?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

/// State `undo` needs that the move itself does not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChessUndo {
    moved: ChessPiece,
    captured: Option<ChessPiece>,
    castling: u8,
    en_passant: Option<u8>,
    halfmove_clock: u32,
    fullmove: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChessBoard {
    squares: [Option<ChessPiece>; 64],
    side_to_move: Side,
    castling: u8,
    en_passant: Option<u8>,
    halfmove_clock: u32,
    fullmove: u32,
}

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Default for ChessBoard {
    fn default() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut board = Self::empty(Side::First);
        for (file, kind) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            board.squares[square(file, 0) as usize] = Some(ChessPiece::new(*kind, Side::First));
            board.squares[square(file, 1) as usize] =
                Some(ChessPiece::new(PieceKind::Pawn, Side::First));
            board.squares[square(file, 6) as usize] =
                Some(ChessPiece::new(PieceKind::Pawn, Side::Second));
            board.squares[square(file, 7) as usize] = Some(ChessPiece::new(*kind, Side::Second));
        }
        board.castling = WHITE_KINGSIDE | WHITE_QUEENSIDE | BLACK_KINGSIDE | BLACK_QUEENSIDE;
        board
    }
}

impl ChessBoard {
    /// A board with no pieces and no castling rights.
    pub fn empty(to_move: Side) -> Self {
        Self {
            squares: [None; 64],
            side_to_move: to_move,
            castling: 0,
            en_passant: None,
            halfmove_clock: 0,
            fullmove: 1,
        }
    }

    pub fn piece_at(&self, sq: u8) -> Option<ChessPiece> {
        self.squares[sq as usize]
    }

    pub fn set_piece(&mut self, sq: u8, piece: Option<ChessPiece>) {
        self.squares[sq as usize] = piece;
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn en_passant(&self) -> Option<u8> {
        self.en_passant
    }

    /// Finds the legal move from `from` to `to`. Pawn promotions default to a queen.
    pub fn find_move(&self, from: u8, to: u8, promotion: Option<PieceKind>) -> Option<ChessMove> {
        let promotion = promotion.unwrap_or(PieceKind::Queen);
        self.legal_moves().into_iter().find(|mv| {
            mv.from == from && mv.to == to && mv.promotion.is_none_or(|kind| kind == promotion)
        })
    }

    fn pieces(&self) -> impl Iterator<Item = (u8, ChessPiece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(sq, piece)| piece.map(|p| (sq as u8, p)))
    }

    fn king_square(&self, side: Side) -> Option<u8> {
        self.pieces()
            .find(|(_, p)| p.kind == PieceKind::King && p.side == side)
            .map(|(sq, _)| sq)
    }

    pub fn is_in_check(&self, side: Side) -> bool {
        self.king_square(side)
            .is_some_and(|king| self.is_square_attacked(king, side.opposite()))
    }

    /// Whether any piece of `by` attacks `target`.
    pub fn is_square_attacked(&self, target: u8, by: Side) -> bool {
        let holds = |sq: Option<u8>, kinds: &[PieceKind]| {
            sq.and_then(|sq| self.piece_at(sq))
                .is_some_and(|p| p.side == by && kinds.contains(&p.kind))
        };

        let pawn_rank_step = match by {
            Side::First => -1,
            Side::Second => 1,
        };
        if [-1, 1]
            .iter()
            .any(|&df| holds(offset(target, (df, pawn_rank_step)), &[PieceKind::Pawn]))
        {
            return true;
        }

        if KNIGHT_OFFSETS
            .iter()
            .any(|&d| holds(offset(target, d), &[PieceKind::Knight]))
        {
            return true;
        }

        if KING_OFFSETS
            .iter()
            .any(|&d| holds(offset(target, d), &[PieceKind::King]))
        {
            return true;
        }

        let slides = |dirs: &[(i8, i8)], kinds: &[PieceKind]| {
            dirs.iter().any(|&dir| {
                let mut sq = target;
                while let Some(next) = offset(sq, dir) {
                    match self.piece_at(next) {
                        None => sq = next,
                        Some(p) => return p.side == by && kinds.contains(&p.kind),
                    }
                }
                false
            })
        };

        slides(&ROOK_DIRECTIONS, &[PieceKind::Rook, PieceKind::Queen])
            || slides(&BISHOP_DIRECTIONS, &[PieceKind::Bishop, PieceKind::Queen])
    }

    fn push_pawn_move(out: &mut Vec<ChessMove>, mv: ChessMove, promotes: bool) {
        if promotes {
            out.extend(PROMOTIONS.iter().map(|&kind| ChessMove {
                promotion: Some(kind),
                ..mv
            }));
        } else {
            out.push(mv);
        }
    }

    fn pawn_moves(&self, from: u8, side: Side, out: &mut Vec<ChessMove>) {
        let (step, start_rank, last_rank) = match side {
            Side::First => (1, 1, 7),
            Side::Second => (-1, 6, 0),
        };

        if let Some(one) = offset(from, (0, step)) {
            if self.piece_at(one).is_none() {
                let promotes = rank_of(one) == last_rank;
                Self::push_pawn_move(out, ChessMove::new(from, one, MoveKind::Quiet), promotes);
                if rank_of(from) == start_rank {
                    if let Some(two) = offset(one, (0, step)) {
                        if self.piece_at(two).is_none() {
                            out.push(ChessMove::new(from, two, MoveKind::DoublePush));
                        }
                    }
                }
            }
        }

        for df in [-1, 1] {
            let Some(to) = offset(from, (df, step)) else {
                continue;
            };
            match self.piece_at(to) {
                Some(target) if target.side != side => {
                    let promotes = rank_of(to) == last_rank;
                    Self::push_pawn_move(out, ChessMove::new(from, to, MoveKind::Capture), promotes);
                }
                None if self.en_passant == Some(to) => {
                    if let Some(captured) = offset(to, (0, -step)) {
                        out.push(ChessMove::new(from, to, MoveKind::EnPassant { captured }));
                    }
                }
                _ => {}
            }
        }
    }

    fn step_moves(&self, from: u8, side: Side, offsets: &[(i8, i8)], out: &mut Vec<ChessMove>) {
        for &d in offsets {
            let Some(to) = offset(from, d) else { continue };
            match self.piece_at(to) {
                None => out.push(ChessMove::new(from, to, MoveKind::Quiet)),
                Some(p) if p.side != side => out.push(ChessMove::new(from, to, MoveKind::Capture)),
                _ => {}
            }
        }
    }

    fn slide_moves(&self, from: u8, side: Side, dirs: &[(i8, i8)], out: &mut Vec<ChessMove>) {
        for &dir in dirs {
            let mut sq = from;
            while let Some(to) = offset(sq, dir) {
                match self.piece_at(to) {
                    None => out.push(ChessMove::new(from, to, MoveKind::Quiet)),
                    Some(p) => {
                        if p.side != side {
                            out.push(ChessMove::new(from, to, MoveKind::Capture));
                        }
                        break;
                    }
                }
                sq = to;
            }
        }
    }

    fn castling_moves(&self, side: Side, out: &mut Vec<ChessMove>) {
        let (rank, kingside, queenside) = match side {
            Side::First => (0, WHITE_KINGSIDE, WHITE_QUEENSIDE),
            Side::Second => (7, BLACK_KINGSIDE, BLACK_QUEENSIDE),
        };
        let king_from = square(4, rank);
        let own_rook = Some(ChessPiece::new(PieceKind::Rook, side));
        if self.piece_at(king_from) != Some(ChessPiece::new(PieceKind::King, side))
            || self.is_square_attacked(king_from, side.opposite())
        {
            return;
        }

        let empty = |files: &[u8]| files.iter().all(|&f| self.piece_at(square(f, rank)).is_none());
        let safe = |files: &[u8]| {
            files
                .iter()
                .all(|&f| !self.is_square_attacked(square(f, rank), side.opposite()))
        };

        if self.castling & kingside != 0
            && self.piece_at(square(7, rank)) == own_rook
            && empty(&[5, 6])
            && safe(&[5, 6])
        {
            out.push(ChessMove::new(
                king_from,
                square(6, rank),
                MoveKind::Castle {
                    rook_from: square(7, rank),
                    rook_to: square(5, rank),
                },
            ));
        }

        if self.castling & queenside != 0
            && self.piece_at(square(0, rank)) == own_rook
            && empty(&[1, 2, 3])
            && safe(&[2, 3])
        {
            out.push(ChessMove::new(
                king_from,
                square(2, rank),
                MoveKind::Castle {
                    rook_from: square(0, rank),
                    rook_to: square(3, rank),
                },
            ));
        }
    }

    fn pseudo_legal_moves(&self, side: Side) -> Vec<ChessMove> {
        let mut moves = Vec::with_capacity(48);
        for (from, piece) in self.pieces().filter(|(_, p)| p.side == side) {
            match piece.kind {
                PieceKind::Pawn => self.pawn_moves(from, side, &mut moves),
                PieceKind::Knight => self.step_moves(from, side, &KNIGHT_OFFSETS, &mut moves),
                PieceKind::Bishop => self.slide_moves(from, side, &BISHOP_DIRECTIONS, &mut moves),
                PieceKind::Rook => self.slide_moves(from, side, &ROOK_DIRECTIONS, &mut moves),
                PieceKind::Queen => {
                    self.slide_moves(from, side, &ROOK_DIRECTIONS, &mut moves);
                    self.slide_moves(from, side, &BISHOP_DIRECTIONS, &mut moves);
                }
                PieceKind::King => {
                    self.step_moves(from, side, &KING_OFFSETS, &mut moves);
                    self.castling_moves(side, &mut moves);
                }
            }
        }
        moves
    }

    /// Pseudo-legal moves that do not leave the mover's king attacked.
    fn generate_legal(&self) -> Vec<ChessMove> {
        let side = self.side_to_move;
        let mut scratch = self.clone();
        self.pseudo_legal_moves(side)
            .into_iter()
            .filter(|mv| {
                let undo = scratch.apply(mv);
                let legal = !scratch.is_in_check(side);
                scratch.undo(mv, undo);
                legal
            })
            .collect()
    }

    /// K v K, or a lone knight or bishop against a bare king.
    pub fn has_insufficient_material(&self) -> bool {
        let mut minors = 0;
        for (_, piece) in self.pieces() {
            match piece.kind {
                PieceKind::King => {}
                PieceKind::Knight | PieceKind::Bishop => minors += 1,
                _ => return false,
            }
        }
        minors <= 1
    }

    fn is_drawn_by_rule(&self) -> bool {
        self.halfmove_clock >= HALFMOVE_DRAW || self.has_insufficient_material()
    }

    fn castling_mask_for(sq: u8) -> u8 {
        match sq {
            0 => WHITE_QUEENSIDE,
            4 => WHITE_KINGSIDE | WHITE_QUEENSIDE,
            7 => WHITE_KINGSIDE,
            56 => BLACK_QUEENSIDE,
            60 => BLACK_KINGSIDE | BLACK_QUEENSIDE,
            63 => BLACK_KINGSIDE,
            _ => 0,
        }
    }

    /// Number of pieces currently attacked by the other side.
    fn attacked_pieces(&self) -> u32 {
        self.pieces()
            .filter(|&(sq, p)| self.is_square_attacked(sq, p.side.opposite()))
            .count() as u32
    }
}

impl Board for ChessBoard {
    type Move = ChessMove;
    type Undo = ChessUndo;

    fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    fn outcome(&self) -> GameOutcome {
        if self.generate_legal().is_empty() {
            return if self.is_in_check(self.side_to_move) {
                GameOutcome::Win(self.side_to_move.opposite())
            } else {
                GameOutcome::Draw
            };
        }

        if self.is_drawn_by_rule() {
            GameOutcome::Draw
        } else {
            GameOutcome::InProgress
        }
    }

    fn legal_moves(&self) -> Vec<Self::Move> {
        if self.is_drawn_by_rule() {
            return Vec::new();
        }
        self.generate_legal()
    }

    fn apply(&mut self, mv: &Self::Move) -> Self::Undo {
        let Some(moved) = self.piece_at(mv.from) else {
            panic!("BUG: no piece on {} for {mv}", square_name(mv.from));
        };
        let undo = ChessUndo {
            moved,
            captured: None,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove: self.fullmove,
        };

        let captured = match mv.kind {
            MoveKind::EnPassant { captured } => self.squares[captured as usize].take(),
            _ => self.squares[mv.to as usize].take(),
        };

        self.squares[mv.from as usize] = None;
        self.squares[mv.to as usize] = Some(match mv.promotion {
            Some(kind) => ChessPiece::new(kind, moved.side),
            None => moved,
        });

        if let MoveKind::Castle { rook_from, rook_to } = mv.kind {
            let rook = self.squares[rook_from as usize].take();
            self.squares[rook_to as usize] = rook;
        }

        self.castling &= !(Self::castling_mask_for(mv.from) | Self::castling_mask_for(mv.to));
        self.en_passant = match mv.kind {
            MoveKind::DoublePush => Some((mv.from + mv.to) / 2),
            _ => None,
        };
        if moved.kind == PieceKind::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if moved.side == Side::Second {
            self.fullmove += 1;
        }
        self.side_to_move = self.side_to_move.opposite();

        ChessUndo { captured, ..undo }
    }

    fn undo(&mut self, mv: &Self::Move, undo: Self::Undo) {
        self.side_to_move = self.side_to_move.opposite();

        if let MoveKind::Castle { rook_from, rook_to } = mv.kind {
            let rook = self.squares[rook_to as usize].take();
            self.squares[rook_from as usize] = rook;
        }

        self.squares[mv.to as usize] = None;
        self.squares[mv.from as usize] = Some(undo.moved);
        match mv.kind {
            MoveKind::EnPassant { captured } => self.squares[captured as usize] = undo.captured,
            _ => self.squares[mv.to as usize] = undo.captured,
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove = undo.fullmove;
    }

    fn evaluate(&self, side: Side) -> Option<Score> {
        Some(tables::evaluate(self.pieces(), side))
    }

    fn hash(&self) -> u128 {
        let mut bytes = [0u8; 67];
        for (byte, cell) in bytes.iter_mut().zip(&self.squares) {
            *byte = cell.map_or(b'.', |p| p.symbol() as u8);
        }
        bytes[64] = self.side_to_move as u8;
        bytes[65] = self.castling;
        bytes[66] = self.en_passant.unwrap_or(u8::MAX);
        murmur3_x64_128(&bytes, 0)
    }

    fn complexity(&self) -> u32 {
        let empty = self.squares.iter().filter(|s| s.is_none()).count() as u32;
        empty + self.attacked_pieces()
    }

    fn move_number(&self) -> u32 {
        (self.fullmove.saturating_sub(1)) * 2 + (self.side_to_move == Side::Second) as u32
    }
}

impl fmt::Display for ChessBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            for file in 0..8 {
                let ch = self.piece_at(square(file, rank)).map_or('.', ChessPiece::symbol);
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> ChessBoard {
        ChessBoard::from_fen(fen).unwrap()
    }

    fn has_move(board: &ChessBoard, from: &str, to: &str) -> bool {
        let (from, to) = (parse_square(from).unwrap(), parse_square(to).unwrap());
        board
            .legal_moves()
            .iter()
            .any(|mv| mv.from == from && mv.to == to)
    }

    fn perft(board: &mut ChessBoard, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = board.legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0;
        for mv in &moves {
            let undo = board.apply(mv);
            nodes += perft(board, depth - 1);
            board.undo(mv, undo);
        }
        nodes
    }

    #[test]
    fn start_position_perft() {
        let mut b = ChessBoard::default();
        assert_eq!(perft(&mut b, 1), 20);
        assert_eq!(perft(&mut b, 2), 400);
        assert_eq!(perft(&mut b, 3), 8902);
        assert_eq!(b, ChessBoard::default());
    }

    #[test]
    fn kiwipete_perft() {
        let mut b = board("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        assert_eq!(perft(&mut b, 1), 48);
        assert_eq!(perft(&mut b, 2), 2039);
    }

    #[test]
    fn endgame_perft_with_pins_and_en_passant() {
        let mut b = board("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
        assert_eq!(perft(&mut b, 1), 14);
        assert_eq!(perft(&mut b, 2), 191);
        assert_eq!(perft(&mut b, 3), 2812);
    }

    #[test]
    fn castling_available_with_clear_safe_path() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(has_move(&b, "e1", "g1"));
        assert!(has_move(&b, "e1", "c1"));
    }

    #[test]
    fn castling_needs_rights() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w kq - 0 1");
        assert!(!has_move(&b, "e1", "g1"));
        assert!(!has_move(&b, "e1", "c1"));
    }

    #[test]
    fn castling_needs_empty_squares() {
        let b = board("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1");
        assert!(has_move(&b, "e1", "g1"));
        assert!(!has_move(&b, "e1", "c1"));
    }

    #[test]
    fn castling_through_attacked_square_is_illegal() {
        let b = board("r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq - 0 1");
        assert!(!has_move(&b, "e1", "g1"));
        assert!(has_move(&b, "e1", "c1"));
    }

    #[test]
    fn castling_out_of_check_is_illegal() {
        let b = board("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq - 0 1");
        assert!(!has_move(&b, "e1", "g1"));
        assert!(!has_move(&b, "e1", "c1"));
    }

    #[test]
    fn castling_moves_rook_and_undo_restores_rights() {
        // arrange
        let mut b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let before = b.clone();
        let mv = b
            .find_move(parse_square("e1").unwrap(), parse_square("g1").unwrap(), None)
            .unwrap();

        // act
        let undo = b.apply(&mv);

        // assert
        assert_eq!(
            b.piece_at(parse_square("f1").unwrap()),
            Some(ChessPiece::new(PieceKind::Rook, Side::First))
        );
        assert_eq!(b.piece_at(parse_square("h1").unwrap()), None);
        assert_eq!(b.to_fen(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");
        b.undo(&mv, undo);
        assert_eq!(b, before);
    }

    #[test]
    fn rook_move_drops_one_right() {
        let mut b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let mv = b
            .find_move(parse_square("h1").unwrap(), parse_square("h5").unwrap(), None)
            .unwrap();
        b.apply(&mv);
        assert_eq!(b.to_fen(), "r3k2r/8/8/7R/8/8/8/R3K3 b Qkq - 1 1");
    }

    #[test]
    fn en_passant_removes_passed_pawn() {
        // arrange
        let mut b = board("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        let before = b.clone();
        let mv = b
            .find_move(parse_square("e5").unwrap(), parse_square("d6").unwrap(), None)
            .unwrap();

        // act
        let undo = b.apply(&mv);

        // assert
        assert_eq!(mv.kind, MoveKind::EnPassant { captured: parse_square("d5").unwrap() });
        assert_eq!(b.piece_at(parse_square("d5").unwrap()), None);
        assert_eq!(b.to_fen(), "4k3/8/3P4/8/8/8/8/4K3 b - - 0 1");
        b.undo(&mv, undo);
        assert_eq!(b, before);
    }

    #[test]
    fn double_push_sets_en_passant_target() {
        let mut b = ChessBoard::default();
        let mv = b
            .find_move(parse_square("e2").unwrap(), parse_square("e4").unwrap(), None)
            .unwrap();
        b.apply(&mv);
        assert_eq!(b.en_passant(), parse_square("e3"));
    }

    #[test]
    fn promotion_defaults_to_queen() {
        // arrange
        let mut b = board("8/P6k/8/8/8/8/8/K7 w - - 0 1");
        let a7 = parse_square("a7").unwrap();
        let a8 = parse_square("a8").unwrap();
        let promotions: Vec<_> = b.legal_moves().into_iter().filter(|m| m.from == a7).collect();

        // act
        let mv = b.find_move(a7, a8, None).unwrap();
        let undo = b.apply(&mv);

        // assert
        assert_eq!(promotions.len(), 4);
        assert_eq!(promotions[0].promotion, Some(PieceKind::Queen));
        assert_eq!(b.piece_at(a8), Some(ChessPiece::new(PieceKind::Queen, Side::First)));
        b.undo(&mv, undo);
        assert_eq!(b.piece_at(a7), Some(ChessPiece::new(PieceKind::Pawn, Side::First)));
    }

    #[test]
    fn pinned_piece_cannot_move() {
        let b = board("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1");
        let e2 = parse_square("e2").unwrap();
        assert!(b.legal_moves().iter().all(|mv| mv.from != e2));
    }

    #[test]
    fn checkmate_and_stalemate() {
        let mate = board("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(mate.outcome(), GameOutcome::Win(Side::Second));
        assert!(mate.legal_moves().is_empty());

        let stalemate = board("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert_eq!(stalemate.outcome(), GameOutcome::Draw);
    }

    #[test]
    fn draw_rules() {
        let bare_kings = board("8/8/8/4k3/8/8/8/4K3 w - - 0 1");
        let knight = board("8/8/8/4k3/8/8/8/4K1N1 w - - 0 1");
        let rook = board("8/8/8/4k3/8/8/8/4K1R1 w - - 0 1");
        let fifty = board("4k3/8/8/8/8/8/8/R3K3 w - - 50 80");

        assert_eq!(bare_kings.outcome(), GameOutcome::Draw);
        assert_eq!(knight.outcome(), GameOutcome::Draw);
        assert!(knight.legal_moves().is_empty());
        assert_eq!(rook.outcome(), GameOutcome::InProgress);
        assert_eq!(fifty.outcome(), GameOutcome::Draw);
    }

    #[test]
    fn halfmove_clock_resets_on_pawn_moves_and_captures() {
        let mut b = board("4k3/8/8/8/8/8/4P3/R3K3 w - - 12 30");
        let rook_move = b
            .find_move(parse_square("a1").unwrap(), parse_square("a5").unwrap(), None)
            .unwrap();
        b.apply(&rook_move);
        assert_eq!(b.halfmove_clock(), 13);

        let mut b = board("4k3/8/8/8/8/8/4P3/R3K3 w - - 12 30");
        let pawn_move = b
            .find_move(parse_square("e2").unwrap(), parse_square("e3").unwrap(), None)
            .unwrap();
        b.apply(&pawn_move);
        assert_eq!(b.halfmove_clock(), 0);
    }

    #[test]
    fn start_position_evaluates_even() {
        let b = ChessBoard::default();
        assert_eq!(b.evaluate(Side::First), Some(0));
        assert_eq!(b.move_number(), 0);
    }

    #[test]
    fn hash_ignores_clocks_but_not_rights() {
        // arrange
        let mut b = ChessBoard::default();
        for (from, to) in [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")] {
            let mv = b
                .find_move(parse_square(from).unwrap(), parse_square(to).unwrap(), None)
                .unwrap();
            b.apply(&mv);
        }

        // act
        let start = ChessBoard::default().hash();

        // assert
        assert_eq!(b.hash(), start);
        assert_ne!(b.to_fen(), START_FEN);
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w Kkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1",
        ] {
            assert_ne!(board(fen).hash(), start, "{fen}");
        }
        assert_ne!(
            board("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").hash(),
            board("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 1").hash()
        );
    }
}
