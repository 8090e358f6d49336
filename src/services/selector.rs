// src/services/selector.rs

use std::sync::Mutex;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    error::AppError,
    models::{
        criterion::BandCounts,
        question::{Difficulty, PublicQuestion, Question},
    },
    store::QuestionStore,
};

/// Source of the shuffle applied to each difficulty band.
pub trait RandomSource: Send + Sync {
    fn shuffle(&self, questions: &mut [Question]);
}

/// Thread-local entropy. Used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntropyRandom;

impl RandomSource for EntropyRandom {
    fn shuffle(&self, questions: &mut [Question]) {
        questions.shuffle(&mut rand::thread_rng());
    }
}

/// Deterministic shuffles from a fixed seed.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn shuffle(&self, questions: &mut [Question]) {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        questions.shuffle(&mut *rng);
    }
}

/// Draws up to `counts` questions per band from a category.
///
/// Bands are emitted easy, then medium, then hard. A band with fewer questions
/// than requested contributes all it has. Reference answers are stripped.
pub async fn select_questions(
    store: &dyn QuestionStore,
    rng: &dyn RandomSource,
    category_id: i64,
    counts: BandCounts,
) -> Result<Vec<PublicQuestion>, AppError> {
    let mut selected = Vec::new();

    for difficulty in Difficulty::ALL {
        let wanted = counts.get(difficulty);
        if wanted == 0 {
            continue;
        }

        let mut band = store.list_by_band(category_id, difficulty).await?;
        if band.len() < wanted {
            tracing::warn!(
                "Category {} has {} {} questions, {} requested",
                category_id,
                band.len(),
                difficulty,
                wanted
            );
        }

        rng.shuffle(&mut band);
        band.truncate(wanted);
        selected.extend(band.into_iter().map(PublicQuestion::from));
    }

    Ok(selected)
}
