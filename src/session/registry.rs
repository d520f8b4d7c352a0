//! Live session map shared by concurrent callers

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
};

use serde::{Deserialize, Serialize};

use super::game::{FinishStatus, GameSession, SessionView};
use crate::{
    identifiers::SessionId,
    menace::MenaceEngine,
    utils::{lock, read, write},
};

type SessionHandle = Arc<Mutex<GameSession>>;

/// Result of [`SessionRegistry::respond`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnView {
    pub opponent_move: usize,
    /// `None` when the opponent's move ended the game
    pub agent_move: Option<usize>,
    pub session: SessionView,
}

/// Sessions by id, each behind its own mutex so moves in one game never wait
/// on another.
///
/// Finished sessions stay registered so a repeated finish keeps answering
/// [`FinishStatus::AlreadyFinished`]. Callers drop them with [`remove`] or
/// sweep every learned session with [`prune_learned`].
///
/// [`remove`]: SessionRegistry::remove
/// [`prune_learned`]: SessionRegistry::prune_learned
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use menace::{app::EngineConfig, menace::MenaceEngine, session::SessionRegistry};
///
/// let engine = Arc::new(MenaceEngine::new(EngineConfig::new().with_seed(3))?);
/// let registry = SessionRegistry::new(engine);
///
/// let view = registry.create_session(false);
/// let turn = registry.respond(view.id, 4)?;
/// assert_eq!(turn.session.history.len(), 2);
/// # Ok::<(), menace::Error>(())
/// ```
#[derive(Debug)]
pub struct SessionRegistry {
    engine: Arc<MenaceEngine>,
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new(engine: Arc<MenaceEngine>) -> Self {
        Self {
            engine,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &Arc<MenaceEngine> {
        &self.engine
    }

    /// Start a game. The agent plays X when it moves first, O otherwise; no
    /// move is made on creation.
    pub fn create_session(&self, agent_plays_first: bool) -> SessionView {
        let session = self.engine.new_session(agent_plays_first);
        let view = session.view();
        write(&self.sessions).insert(view.id, Arc::new(Mutex::new(session)));
        log::debug!(
            "created session {} with agent as {}",
            view.id,
            view.agent_player
        );
        view
    }

    fn handle(&self, id: SessionId) -> crate::Result<SessionHandle> {
        read(&self.sessions)
            .get(&id)
            .cloned()
            .ok_or(crate::Error::SessionNotFound { id })
    }

    pub fn get_session(&self, id: SessionId) -> crate::Result<SessionView> {
        let handle = self.handle(id)?;
        let view = lock(&handle).view();
        Ok(view)
    }

    pub fn apply_opponent_move(&self, id: SessionId, position: usize) -> crate::Result<SessionView> {
        let handle = self.handle(id)?;
        let mut session = lock(&handle);
        session.apply_opponent_move(position)?;
        Ok(session.view())
    }

    /// Let the agent move. Returns the position it played and the new view.
    pub fn agent_move(&self, id: SessionId) -> crate::Result<(usize, SessionView)> {
        let handle = self.handle(id)?;
        let mut session = lock(&handle);
        let position = session.agent_move(&self.engine)?;
        Ok((position, session.view()))
    }

    /// Apply the opponent's move and, if the game goes on, the agent's reply,
    /// under one lock so no other caller sees the board in between.
    pub fn respond(&self, id: SessionId, position: usize) -> crate::Result<TurnView> {
        let handle = self.handle(id)?;
        let mut session = lock(&handle);
        session.apply_opponent_move(position)?;
        let agent_move = if session.is_finished() {
            None
        } else {
            Some(session.agent_move(&self.engine)?)
        };
        Ok(TurnView {
            opponent_move: position,
            agent_move,
            session: session.view(),
        })
    }

    /// Learn from a finished session. Safe to call repeatedly: only the first
    /// call after the game ends changes any beads.
    pub fn finish_session(&self, id: SessionId) -> crate::Result<FinishStatus> {
        let handle = self.handle(id)?;
        let mut session = lock(&handle);
        self.engine.conclude(&mut session)
    }

    /// Views of every live session, ordered by id.
    pub fn active_sessions(&self) -> Vec<SessionView> {
        let handles: Vec<SessionHandle> = read(&self.sessions).values().cloned().collect();
        let mut views: Vec<SessionView> = handles.iter().map(|h| lock(h).view()).collect();
        views.sort_by_key(|view| view.id);
        views
    }

    /// Drop a session from the registry, returning its last view.
    pub fn remove(&self, id: SessionId) -> Option<SessionView> {
        let handle = write(&self.sessions).remove(&id)?;
        let view = lock(&handle).view();
        Some(view)
    }

    /// Drop every session whose game has been learned from. Returns how many
    /// were removed.
    pub fn prune_learned(&self) -> usize {
        let handles: Vec<(SessionId, SessionHandle)> = read(&self.sessions)
            .iter()
            .map(|(id, handle)| (*id, Arc::clone(handle)))
            .collect();
        let learned: Vec<SessionId> = handles
            .iter()
            .filter(|(_, handle)| lock(handle).is_learned())
            .map(|(id, _)| *id)
            .collect();

        let mut sessions = write(&self.sessions);
        let removed = learned
            .iter()
            .filter(|id| sessions.remove(id).is_some())
            .count();
        if removed > 0 {
            log::debug!("pruned {removed} learned sessions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        read(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
