//! One game between the agent and an opponent

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::{
    identifiers::SessionId,
    menace::{LearningReport, MenaceEngine, MoveRecord, Outcome},
    tictactoe::{BoardState, Player},
};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    AwaitingOpponentMove,
    AwaitingAgentMove,
    Finished,
}

/// A move applied to the board, by either side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEntry {
    pub player: Player,
    pub position: usize,
    pub board_after: BoardState,
}

/// Result of finishing a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishStatus {
    /// The game was learned from by this call
    Learned(LearningReport),
    /// The game had already been learned; nothing changed
    AlreadyFinished,
    /// The game is still being played; nothing changed
    InProgress,
}

/// Read-only copy of a session for callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: SessionId,
    pub board: BoardState,
    pub turn: Player,
    pub agent_player: Player,
    pub state: SessionState,
    pub legal_moves: Vec<usize>,
    pub history: Vec<MoveEntry>,
    pub outcome: Outcome,
    pub winner: Option<Player>,
    pub learned: bool,
}

/// A game in progress or finished.
///
/// X always moves first, so the agent plays X exactly when it moves first.
#[derive(Debug)]
pub struct GameSession {
    id: SessionId,
    board: BoardState,
    agent: Player,
    turn: Player,
    history: Vec<MoveEntry>,
    trail: Vec<MoveRecord>,
    outcome: Outcome,
    learned: bool,
    rng: StdRng,
}

impl GameSession {
    pub fn new(id: SessionId, agent_plays_first: bool, rng: StdRng) -> Self {
        let agent = if agent_plays_first {
            Player::X
        } else {
            Player::O
        };
        Self {
            id,
            board: BoardState::new(),
            agent,
            turn: Player::X,
            history: Vec::new(),
            trail: Vec::new(),
            outcome: Outcome::Unresolved,
            learned: false,
            rng,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn agent_player(&self) -> Player {
        self.agent
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn history(&self) -> &[MoveEntry] {
        &self.history
    }

    /// Agent moves not yet learned from, in canonical coordinates.
    pub fn trail(&self) -> &[MoveRecord] {
        &self.trail
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_resolved()
    }

    pub fn is_learned(&self) -> bool {
        self.learned
    }

    pub fn state(&self) -> SessionState {
        if self.is_finished() {
            SessionState::Finished
        } else if self.turn == self.agent {
            SessionState::AwaitingAgentMove
        } else {
            SessionState::AwaitingOpponentMove
        }
    }

    pub fn legal_moves(&self) -> Vec<usize> {
        if self.is_finished() {
            Vec::new()
        } else {
            self.board.empty_positions()
        }
    }

    /// Play the opponent's move at `position`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidPosition`] if `position > 8`;
    /// [`crate::Error::GameOver`], [`crate::Error::WrongTurn`] or
    /// [`crate::Error::CellOccupied`] if the move is not allowed now.
    pub fn apply_opponent_move(&mut self, position: usize) -> crate::Result<()> {
        self.apply(position, self.agent.opponent())
    }

    /// Let the agent choose and play its move. Returns the position played.
    pub fn agent_move(&mut self, engine: &MenaceEngine) -> crate::Result<usize> {
        self.check_turn(self.agent)?;
        let (position, record) = engine.choose_move(&self.board, &mut self.rng)?;
        self.apply(position, self.agent)?;
        self.trail.push(record);
        Ok(position)
    }

    /// Drop the learned trail and mark the session so it is never learned again.
    pub(crate) fn mark_learned(&mut self) {
        self.trail.clear();
        self.learned = true;
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            board: self.board,
            turn: self.turn,
            agent_player: self.agent,
            state: self.state(),
            legal_moves: self.legal_moves(),
            history: self.history.clone(),
            outcome: self.outcome,
            winner: self.board.winner(),
            learned: self.learned,
        }
    }

    fn check_turn(&self, player: Player) -> crate::Result<()> {
        if self.is_finished() {
            return Err(crate::Error::GameOver);
        }
        if self.turn != player {
            return Err(crate::Error::WrongTurn {
                player: player.to_char(),
            });
        }
        Ok(())
    }

    fn apply(&mut self, position: usize, player: Player) -> crate::Result<()> {
        if position > 8 {
            return Err(crate::Error::InvalidPosition { position });
        }
        self.check_turn(player)?;

        let board = self.board.make_move(position, player)?;
        self.board = board;
        self.history.push(MoveEntry {
            player,
            position,
            board_after: board,
        });
        self.turn = player.opponent();
        self.outcome = Outcome::for_agent(&board, self.agent);

        if self.is_finished() {
            log::debug!(
                "session {} finished as {:?} on {}",
                self.id,
                self.outcome,
                board.encode()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{ErrorKind, app::EngineConfig};

    fn session(agent_plays_first: bool) -> GameSession {
        GameSession::new(
            SessionId::new(1),
            agent_plays_first,
            StdRng::seed_from_u64(3),
        )
    }

    #[test]
    fn agent_side_follows_first_mover() {
        let first = session(true);
        assert_eq!(first.agent_player(), Player::X);
        assert_eq!(first.state(), SessionState::AwaitingAgentMove);

        let second = session(false);
        assert_eq!(second.agent_player(), Player::O);
        assert_eq!(second.state(), SessionState::AwaitingOpponentMove);
        assert_eq!(second.legal_moves().len(), 9);
    }

    #[test]
    fn opponent_move_rules() {
        let mut game = session(false);
        assert_eq!(
            game.apply_opponent_move(9).unwrap_err().kind(),
            ErrorKind::Validation
        );
        game.apply_opponent_move(4).unwrap();
        assert_eq!(game.state(), SessionState::AwaitingAgentMove);
        assert!(matches!(
            game.apply_opponent_move(0),
            Err(crate::Error::WrongTurn { player: 'X' })
        ));
        assert_eq!(game.history().len(), 1);
        assert_eq!(game.history()[0].board_after.encode(), "____X____");
    }

    #[test]
    fn agent_move_plays_an_empty_cell_and_records_trail() {
        let engine = MenaceEngine::new(EngineConfig::new().with_seed(1)).unwrap();
        let mut game = engine.new_session(false);
        game.apply_opponent_move(0).unwrap();

        let position = game.agent_move(&engine).unwrap();
        assert_ne!(position, 0);
        assert_eq!(game.board().get(position).unwrap().to_char(), 'O');
        assert_eq!(game.trail().len(), 1);
        assert_eq!(game.trail()[0].state, BoardState::parse("X________").unwrap());
        assert_eq!(game.turn(), Player::X);

        let err = game.agent_move(&engine).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalMove);
    }

    #[test]
    fn occupied_cell_is_illegal() {
        let engine = MenaceEngine::new(EngineConfig::new().with_seed(2)).unwrap();
        let mut game = engine.new_session(true);
        let played = game.agent_move(&engine).unwrap();
        assert!(matches!(
            game.apply_opponent_move(played),
            Err(crate::Error::CellOccupied { .. })
        ));
    }

    #[test]
    fn game_runs_to_a_resolved_outcome() {
        let engine = MenaceEngine::new(EngineConfig::new().with_seed(9)).unwrap();
        let mut game = engine.new_session(false);
        let mut preferences = vec![0, 1, 2, 3, 4, 5, 6, 7, 8].into_iter();
        while !game.is_finished() {
            match game.state() {
                SessionState::AwaitingOpponentMove => {
                    let next = preferences
                        .by_ref()
                        .find(|p| game.board().empty_positions().contains(p))
                        .unwrap();
                    game.apply_opponent_move(next).unwrap();
                }
                SessionState::AwaitingAgentMove => {
                    game.agent_move(&engine).unwrap();
                }
                SessionState::Finished => unreachable!(),
            }
        }

        assert_eq!(game.state(), SessionState::Finished);
        assert_eq!(game.outcome(), Outcome::for_agent(game.board(), Player::O));
        assert!(game.legal_moves().is_empty());
        assert!(matches!(
            game.apply_opponent_move(8),
            Err(crate::Error::GameOver)
        ));
        let view = game.view();
        assert_eq!(view.winner, game.board().winner());
        assert_eq!(view.history.len(), game.board().occupied_count());
    }
}
