//! Where recipes come from.

use rand::seq::SliceRandom;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use town_types::Ingredient;

/// Supplies the next recipe a kitchen game should ask for.
pub trait RecipeSource: Send + Sync + std::fmt::Debug {
    /// Returns `length` distinct ingredients. Lengths beyond the vocabulary
    /// are clamped to its size.
    fn next_recipe(&self, length: usize) -> Vec<Ingredient>;
}

/// Samples recipes without replacement from the full ingredient vocabulary.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomRecipes;

impl RecipeSource for RandomRecipes {
    fn next_recipe(&self, length: usize) -> Vec<Ingredient> {
        let mut rng = rand::thread_rng();
        Ingredient::ALL
            .choose_multiple(&mut rng, length.min(Ingredient::ALL.len()))
            .copied()
            .collect()
    }
}

/// Hands out a scripted list of recipes, then falls back to random ones.
///
/// Useful wherever a game needs to be played deterministically.
#[derive(Debug, Default)]
pub struct FixedRecipes {
    queue: Mutex<VecDeque<Vec<Ingredient>>>,
}

impl FixedRecipes {
    pub fn new(recipes: impl IntoIterator<Item = Vec<Ingredient>>) -> Self {
        Self {
            queue: Mutex::new(recipes.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl RecipeSource for FixedRecipes {
    fn next_recipe(&self, length: usize) -> Vec<Ingredient> {
        let scripted = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        scripted.unwrap_or_else(|| RandomRecipes.next_recipe(length))
    }
}
