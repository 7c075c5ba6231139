//! Generic session state machine.

use crate::error::GameResult;
use town_types::{GameInstanceId, GameInstanceModel, GamePhase, PlayerId};

/// The rules of one kind of two-phase multiplayer game.
///
/// Every method is a pure transformation: it reads the current state and
/// either returns the next state or rejects the call. Rules never mutate the
/// state they are given and never talk to the network. Notifying other
/// players is the caller's job.
pub trait GameRules {
    /// Whole game state, replaced as a unit after every successful call.
    type State: Clone + std::fmt::Debug;
    /// One player action while the game is running.
    type Move;
    /// Serializable view of the state sent to clients.
    type Model;

    fn initial_state(&self) -> Self::State;

    fn phase(state: &Self::State) -> GamePhase;

    /// Town identities currently holding a slot.
    fn players(state: &Self::State) -> Vec<PlayerId>;

    fn join(&self, state: &Self::State, player: PlayerId) -> GameResult<Self::State>;

    fn leave(&self, state: &Self::State, player: PlayerId) -> GameResult<Self::State>;

    fn start(&self, state: &Self::State, player: PlayerId) -> GameResult<Self::State>;

    fn apply_move(
        &self,
        state: &Self::State,
        player: PlayerId,
        game_move: &Self::Move,
    ) -> GameResult<Self::State>;

    /// Runs the game clock forward. Games without a clock keep the state.
    fn advance_clock(&self, state: &Self::State, _seconds: u32) -> Self::State {
        state.clone()
    }

    fn to_model(state: &Self::State) -> Self::Model;
}

/// Phase before and after a state replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub previous: GamePhase,
    pub current: GamePhase,
}

impl Transition {
    /// The game just entered `IN_PROGRESS`.
    pub fn started(&self) -> bool {
        self.previous != GamePhase::InProgress && self.current == GamePhase::InProgress
    }

    /// The game just reached `OVER`.
    pub fn ended(&self) -> bool {
        self.previous != GamePhase::Over && self.current == GamePhase::Over
    }

    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// One running game: an id, its rules and the current state value.
///
/// The state is only ever swapped through [`GameInstance::replace_state`], so
/// callers can compare the phase before and after any mutation.
#[derive(Debug)]
pub struct GameInstance<R: GameRules> {
    id: GameInstanceId,
    rules: R,
    state: R::State,
}

impl<R: GameRules> GameInstance<R> {
    pub fn new(rules: R) -> Self {
        let state = rules.initial_state();
        Self {
            id: GameInstanceId::new(),
            rules,
            state,
        }
    }

    pub fn id(&self) -> GameInstanceId {
        self.id
    }

    pub fn state(&self) -> &R::State {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        R::phase(&self.state)
    }

    pub fn players(&self) -> Vec<PlayerId> {
        R::players(&self.state)
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Swaps in a new state value and reports the phase change.
    pub fn replace_state(&mut self, next: R::State) -> Transition {
        let previous = R::phase(&self.state);
        self.state = next;
        Transition {
            previous,
            current: R::phase(&self.state),
        }
    }

    pub fn join(&mut self, player: PlayerId) -> GameResult<Transition> {
        let next = self.rules.join(&self.state, player)?;
        Ok(self.replace_state(next))
    }

    pub fn leave(&mut self, player: PlayerId) -> GameResult<Transition> {
        let next = self.rules.leave(&self.state, player)?;
        Ok(self.replace_state(next))
    }

    pub fn start(&mut self, player: PlayerId) -> GameResult<Transition> {
        let next = self.rules.start(&self.state, player)?;
        Ok(self.replace_state(next))
    }

    pub fn apply_move(&mut self, player: PlayerId, game_move: &R::Move) -> GameResult<Transition> {
        let next = self.rules.apply_move(&self.state, player, game_move)?;
        Ok(self.replace_state(next))
    }

    pub fn advance_clock(&mut self, seconds: u32) -> Transition {
        let next = self.rules.advance_clock(&self.state, seconds);
        self.replace_state(next)
    }

    pub fn to_model(&self) -> GameInstanceModel<R::Model> {
        GameInstanceModel {
            id: self.id,
            players: self.players(),
            state: R::to_model(&self.state),
        }
    }
}
