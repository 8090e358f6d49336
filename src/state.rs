use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    services::{
        evaluator::Evaluator, finishing::FinishLocks, judge::ScoringJudge,
        selector::RandomSource,
    },
    store::{CandidateStore, CriteriaStore, QuestionStore, SessionStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub criteria: Arc<dyn CriteriaStore>,
    pub questions: Arc<dyn QuestionStore>,
    pub candidates: Arc<dyn CandidateStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub rng: Arc<dyn RandomSource>,
    pub evaluator: Evaluator,
    pub finishing: FinishLocks,
}

impl AppState {
    /// Builds state where one object serves every store contract.
    pub fn new<S>(
        config: Config,
        store: Arc<S>,
        judge: Arc<dyn ScoringJudge>,
        rng: Arc<dyn RandomSource>,
    ) -> Self
    where
        S: CriteriaStore + QuestionStore + CandidateStore + SessionStore + 'static,
    {
        let evaluator = Evaluator::new(store.clone(), store.clone(), judge);

        Self {
            config,
            criteria: store.clone(),
            questions: store.clone(),
            candidates: store.clone(),
            sessions: store,
            rng,
            evaluator,
            finishing: FinishLocks::new(),
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
