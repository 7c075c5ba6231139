//! The kitchen recipe game.
//!
//! Two players share a kitchen. Once both are ready the game hands out a
//! recipe of distinct ingredients; players pick ingredients up at stations
//! and every completed recipe scores a point until the clock runs out.

use crate::error::{GameError, GameResult};
use crate::recipe::{RandomRecipes, RecipeSource};
use crate::rules::GameRules;
use std::sync::Arc;
use town_types::{GamePhase, Ingredient, PlayerId, RecipeGameModel};

/// Tunables for a kitchen game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
    /// Initial value of the round clock, in seconds.
    pub round_seconds: u32,
    /// Number of ingredients per recipe.
    pub recipe_length: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            round_seconds: 120,
            recipe_length: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    One,
    Two,
}

/// Full state of one kitchen game.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeGameState {
    pub phase: GamePhase,
    pub player_one: Option<PlayerId>,
    pub player_two: Option<PlayerId>,
    pub player_one_ready: bool,
    pub player_two_ready: bool,
    pub current_recipe: Vec<Ingredient>,
    pub current_assembled: Vec<Ingredient>,
    pub score: u32,
    pub time_remaining: u32,
}

impl RecipeGameState {
    fn slot_of(&self, player: PlayerId) -> Option<Slot> {
        if self.player_one == Some(player) {
            Some(Slot::One)
        } else if self.player_two == Some(player) {
            Some(Slot::Two)
        } else {
            None
        }
    }

    fn both_seated(&self) -> bool {
        self.player_one.is_some() && self.player_two.is_some()
    }

    fn recipe_complete(&self) -> bool {
        self.current_recipe
            .iter()
            .all(|ingredient| self.current_assembled.contains(ingredient))
    }
}

/// One ingredient pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeMove {
    pub ingredient: Ingredient,
}

impl RecipeMove {
    /// Validates a raw game piece from the wire.
    pub fn from_piece(piece: &str) -> GameResult<Self> {
        piece
            .parse()
            .map(|ingredient| Self { ingredient })
            .map_err(|_| GameError::InvalidGamePiece)
    }
}

/// Rules of the kitchen game.
#[derive(Debug, Clone)]
pub struct RecipeGame {
    recipes: Arc<dyn RecipeSource>,
    settings: GameSettings,
}

impl RecipeGame {
    pub fn new(recipes: Arc<dyn RecipeSource>, settings: GameSettings) -> Self {
        Self { recipes, settings }
    }

    pub fn settings(&self) -> GameSettings {
        self.settings
    }
}

impl Default for RecipeGame {
    fn default() -> Self {
        Self::new(Arc::new(RandomRecipes), GameSettings::default())
    }
}

impl GameRules for RecipeGame {
    type State = RecipeGameState;
    type Move = RecipeMove;
    type Model = RecipeGameModel;

    fn initial_state(&self) -> RecipeGameState {
        RecipeGameState {
            phase: GamePhase::WaitingForPlayers,
            player_one: None,
            player_two: None,
            player_one_ready: false,
            player_two_ready: false,
            current_recipe: Vec::new(),
            current_assembled: Vec::new(),
            score: 0,
            time_remaining: self.settings.round_seconds,
        }
    }

    fn phase(state: &RecipeGameState) -> GamePhase {
        state.phase
    }

    fn players(state: &RecipeGameState) -> Vec<PlayerId> {
        state.player_one.into_iter().chain(state.player_two).collect()
    }

    fn join(&self, state: &RecipeGameState, player: PlayerId) -> GameResult<RecipeGameState> {
        if state.slot_of(player).is_some() {
            return Err(GameError::PlayerAlreadyInGame);
        }
        let mut next = state.clone();
        if next.player_one.is_none() {
            next.player_one = Some(player);
        } else if next.player_two.is_none() {
            next.player_two = Some(player);
        } else {
            return Err(GameError::GameFull);
        }
        next.phase = if next.both_seated() {
            GamePhase::WaitingToStart
        } else {
            GamePhase::WaitingForPlayers
        };
        Ok(next)
    }

    fn leave(&self, state: &RecipeGameState, player: PlayerId) -> GameResult<RecipeGameState> {
        if state.phase == GamePhase::Over {
            return Ok(state.clone());
        }
        let slot = state.slot_of(player).ok_or(GameError::PlayerNotInGame)?;
        let mut next = state.clone();
        match slot {
            Slot::One => {
                next.player_one = None;
                next.player_one_ready = false;
            }
            Slot::Two => {
                next.player_two = None;
                next.player_two_ready = false;
            }
        }
        next.phase = match state.phase {
            GamePhase::InProgress => GamePhase::Over,
            _ => GamePhase::WaitingForPlayers,
        };
        Ok(next)
    }

    fn start(&self, state: &RecipeGameState, player: PlayerId) -> GameResult<RecipeGameState> {
        if state.phase != GamePhase::WaitingToStart {
            return Err(GameError::GameNotStartable);
        }
        let slot = state.slot_of(player).ok_or(GameError::PlayerNotInGame)?;
        let mut next = state.clone();
        match slot {
            Slot::One => next.player_one_ready = true,
            Slot::Two => next.player_two_ready = true,
        }
        if next.player_one_ready && next.player_two_ready {
            next.phase = GamePhase::InProgress;
            next.current_recipe = self.recipes.next_recipe(self.settings.recipe_length);
            next.current_assembled.clear();
            next.time_remaining = self.settings.round_seconds;
        }
        Ok(next)
    }

    fn apply_move(
        &self,
        state: &RecipeGameState,
        player: PlayerId,
        game_move: &RecipeMove,
    ) -> GameResult<RecipeGameState> {
        if state.phase != GamePhase::InProgress {
            return Err(GameError::GameNotInProgress);
        }
        if state.slot_of(player).is_none() {
            return Err(GameError::PlayerNotInGame);
        }
        let ingredient = game_move.ingredient;
        // Off-recipe and repeated pickups are accepted but change nothing.
        if !state.current_recipe.contains(&ingredient)
            || state.current_assembled.contains(&ingredient)
        {
            return Ok(state.clone());
        }
        let mut next = state.clone();
        next.current_assembled.push(ingredient);
        if next.recipe_complete() {
            next.score += 1;
            next.current_recipe = self.recipes.next_recipe(self.settings.recipe_length);
            next.current_assembled.clear();
        }
        Ok(next)
    }

    fn advance_clock(&self, state: &RecipeGameState, seconds: u32) -> RecipeGameState {
        if state.phase != GamePhase::InProgress || seconds == 0 {
            return state.clone();
        }
        let mut next = state.clone();
        next.time_remaining = next.time_remaining.saturating_sub(seconds);
        if next.time_remaining == 0 {
            next.phase = GamePhase::Over;
        }
        next
    }

    fn to_model(state: &RecipeGameState) -> RecipeGameModel {
        RecipeGameModel {
            status: state.phase,
            player_one: state.player_one,
            player_two: state.player_two,
            player_one_ready: state.player_one_ready,
            player_two_ready: state.player_two_ready,
            current_recipe: state.current_recipe.clone(),
            current_assembled: state.current_assembled.clone(),
            score: state.score,
            time_remaining: state.time_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::FixedRecipes;
    use crate::rules::GameInstance;
    use Ingredient::*;

    fn scripted_game(recipes: Vec<Vec<Ingredient>>) -> GameInstance<RecipeGame> {
        GameInstance::new(RecipeGame::new(
            Arc::new(FixedRecipes::new(recipes)),
            GameSettings::default(),
        ))
    }

    fn started_game(recipes: Vec<Vec<Ingredient>>) -> (GameInstance<RecipeGame>, PlayerId, PlayerId) {
        let mut game = scripted_game(recipes);
        let (one, two) = (PlayerId::new(), PlayerId::new());
        game.join(one).unwrap();
        game.join(two).unwrap();
        game.start(one).unwrap();
        game.start(two).unwrap();
        (game, one, two)
    }

    #[test]
    fn first_join_takes_slot_one() {
        let mut game = scripted_game(vec![]);
        let player = PlayerId::new();
        let transition = game.join(player).unwrap();
        assert_eq!(game.state().player_one, Some(player));
        assert_eq!(game.state().player_two, None);
        assert_eq!(transition.current, GamePhase::WaitingForPlayers);
        assert!(!transition.changed());
    }

    #[test]
    fn two_distinct_joins_wait_to_start() {
        let mut game = scripted_game(vec![]);
        let (one, two) = (PlayerId::new(), PlayerId::new());
        game.join(one).unwrap();
        game.join(two).unwrap();
        assert_eq!(game.phase(), GamePhase::WaitingToStart);
        assert_eq!(game.state().player_two, Some(two));
        assert_eq!(game.players(), vec![one, two]);
    }

    #[test]
    fn rejoining_fails_and_keeps_state() {
        let mut game = scripted_game(vec![]);
        let player = PlayerId::new();
        game.join(player).unwrap();
        let before = game.state().clone();
        assert_eq!(game.join(player), Err(GameError::PlayerAlreadyInGame));
        assert_eq!(game.state(), &before);
    }

    #[test]
    fn third_player_finds_game_full() {
        let mut game = scripted_game(vec![]);
        game.join(PlayerId::new()).unwrap();
        game.join(PlayerId::new()).unwrap();
        assert_eq!(game.join(PlayerId::new()), Err(GameError::GameFull));
    }

    #[test]
    fn outsider_cannot_leave() {
        let mut game = scripted_game(vec![]);
        game.join(PlayerId::new()).unwrap();
        assert_eq!(game.leave(PlayerId::new()), Err(GameError::PlayerNotInGame));
    }

    #[test]
    fn leaving_before_start_retreats_to_waiting_for_players() {
        let mut game = scripted_game(vec![]);
        let (one, two) = (PlayerId::new(), PlayerId::new());
        game.join(one).unwrap();
        game.join(two).unwrap();
        game.start(one).unwrap();
        let transition = game.leave(one).unwrap();
        assert_eq!(transition.previous, GamePhase::WaitingToStart);
        assert_eq!(transition.current, GamePhase::WaitingForPlayers);
        assert_eq!(game.state().player_one, None);
        assert!(!game.state().player_one_ready);
        assert_eq!(game.state().player_two, Some(two));
    }

    #[test]
    fn freed_slot_one_is_refilled_first() {
        let mut game = scripted_game(vec![]);
        let (one, two, three) = (PlayerId::new(), PlayerId::new(), PlayerId::new());
        game.join(one).unwrap();
        game.join(two).unwrap();
        game.leave(one).unwrap();
        game.join(three).unwrap();
        assert_eq!(game.state().player_one, Some(three));
        assert_eq!(game.phase(), GamePhase::WaitingToStart);
    }

    #[test]
    fn leaving_mid_game_ends_it_from_either_slot() {
        for leaver_is_one in [true, false] {
            let (mut game, one, two) = started_game(vec![vec![Steak, Rice, Salad]]);
            let leaver = if leaver_is_one { one } else { two };
            let transition = game.leave(leaver).unwrap();
            assert!(transition.ended());
            assert_eq!(game.phase(), GamePhase::Over);
        }
    }

    #[test]
    fn leaving_a_finished_game_is_a_no_op() {
        let (mut game, one, two) = started_game(vec![vec![Steak, Rice, Salad]]);
        game.leave(one).unwrap();
        let before = game.state().clone();
        let transition = game.leave(two).unwrap();
        assert!(!transition.changed());
        assert_eq!(game.state(), &before);
        assert!(game.leave(PlayerId::new()).is_ok());
    }

    #[test]
    fn start_requires_both_players_seated() {
        let mut game = scripted_game(vec![]);
        let one = PlayerId::new();
        game.join(one).unwrap();
        assert_eq!(game.start(one), Err(GameError::GameNotStartable));
    }

    #[test]
    fn start_requires_a_seat() {
        let mut game = scripted_game(vec![]);
        game.join(PlayerId::new()).unwrap();
        game.join(PlayerId::new()).unwrap();
        assert_eq!(game.start(PlayerId::new()), Err(GameError::PlayerNotInGame));
    }

    #[test]
    fn both_ready_starts_with_a_recipe() {
        let mut game = scripted_game(vec![vec![Steak, Rice, Salad]]);
        let (one, two) = (PlayerId::new(), PlayerId::new());
        game.join(one).unwrap();
        game.join(two).unwrap();
        let first = game.start(one).unwrap();
        assert!(!first.started());
        assert!(game.state().player_one_ready);
        let second = game.start(two).unwrap();
        assert!(second.started());
        assert_eq!(game.state().current_recipe, vec![Steak, Rice, Salad]);
        assert_eq!(game.state().time_remaining, 120);
    }

    #[test]
    fn moves_need_a_running_game() {
        let mut game = scripted_game(vec![]);
        let one = PlayerId::new();
        game.join(one).unwrap();
        let pickup = RecipeMove { ingredient: Egg };
        assert_eq!(game.apply_move(one, &pickup), Err(GameError::GameNotInProgress));
    }

    #[test]
    fn moves_need_a_seat() {
        let (mut game, _, _) = started_game(vec![vec![Steak, Rice, Salad]]);
        let pickup = RecipeMove { ingredient: Steak };
        assert_eq!(
            game.apply_move(PlayerId::new(), &pickup),
            Err(GameError::PlayerNotInGame)
        );
    }

    #[test]
    fn completing_a_recipe_in_any_order_scores_once() {
        let orders = [
            [Steak, Rice, Salad],
            [Salad, Steak, Rice],
            [Rice, Salad, Steak],
        ];
        for order in orders {
            let (mut game, one, two) =
                started_game(vec![vec![Steak, Rice, Salad], vec![Egg, Milk, Fries]]);
            for (turn, ingredient) in order.into_iter().enumerate() {
                let mover = if turn % 2 == 0 { one } else { two };
                game.apply_move(mover, &RecipeMove { ingredient }).unwrap();
            }
            let state = game.state();
            assert_eq!(state.score, 1);
            assert_eq!(state.current_recipe, vec![Egg, Milk, Fries]);
            assert!(state.current_assembled.is_empty());
        }
    }

    #[test]
    fn off_recipe_pickups_change_nothing() {
        let (mut game, one, _) = started_game(vec![vec![Steak, Rice, Salad]]);
        game.apply_move(one, &RecipeMove { ingredient: Steak }).unwrap();
        let before = game.state().clone();
        game.apply_move(one, &RecipeMove { ingredient: Egg }).unwrap();
        assert_eq!(game.state(), &before);
    }

    #[test]
    fn repeated_pickups_are_not_stacked() {
        let (mut game, one, _) = started_game(vec![vec![Steak, Rice, Salad]]);
        game.apply_move(one, &RecipeMove { ingredient: Steak }).unwrap();
        game.apply_move(one, &RecipeMove { ingredient: Steak }).unwrap();
        assert_eq!(game.state().current_assembled, vec![Steak]);
        assert_eq!(game.state().score, 0);
    }

    #[test]
    fn unknown_pieces_are_rejected() {
        assert_eq!(RecipeMove::from_piece("Pizza"), Err(GameError::InvalidGamePiece));
        assert_eq!(RecipeMove::from_piece("Milk"), Ok(RecipeMove { ingredient: Milk }));
    }

    #[test]
    fn clock_runs_only_while_in_progress() {
        let mut game = scripted_game(vec![]);
        game.join(PlayerId::new()).unwrap();
        game.advance_clock(30);
        assert_eq!(game.state().time_remaining, 120);

        let (mut game, _, _) = started_game(vec![vec![Steak, Rice, Salad]]);
        let transition = game.advance_clock(30);
        assert!(!transition.changed());
        assert_eq!(game.state().time_remaining, 90);
    }

    #[test]
    fn clock_running_out_ends_the_game() {
        let (mut game, _, _) = started_game(vec![vec![Steak, Rice, Salad]]);
        let transition = game.advance_clock(500);
        assert!(transition.ended());
        assert_eq!(game.state().time_remaining, 0);
        assert_eq!(game.phase(), GamePhase::Over);
    }

    #[test]
    fn model_mirrors_state() {
        let (game, one, two) = started_game(vec![vec![Steak, Rice, Salad]]);
        let model = game.to_model();
        assert_eq!(model.id, game.id());
        assert_eq!(model.players, vec![one, two]);
        assert_eq!(model.state.status, GamePhase::InProgress);
        assert_eq!(model.state.current_recipe, vec![Steak, Rice, Salad]);
    }
}
