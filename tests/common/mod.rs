// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use interview_backend::{
    config::{Config, JudgeConfig},
    models::{
        candidate::{AssignedInterview, Candidate},
        criterion::Criterion,
        question::{Difficulty, Question},
    },
    routes,
    services::{
        judge::{JudgeError, JudgeScore, OpenAiJudge, ScoringJudge},
        selector::SeededRandom,
    },
    state::AppState,
    store::MemoryStore,
    utils::hash::hash_password,
};

pub const PASSWORD: &str = "password123";
pub const CATEGORY_ID: i64 = 1;

/// Scores an answer by reading it as a number; anything else scores 0.
#[derive(Default)]
pub struct NumericJudge {
    calls: AtomicUsize,
}

impl NumericJudge {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoringJudge for NumericJudge {
    async fn score(&self, _reference: &str, candidate: &str) -> Result<JudgeScore, JudgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(JudgeScore {
            score: candidate.trim().parse().unwrap_or(0),
            justification: "stub".to_string(),
        })
    }
}

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub judge: Arc<NumericJudge>,
    pub client: reqwest::Client,
}

fn test_config() -> Config {
    Config {
        database_url: "unused".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        judge: JudgeConfig::default(),
    }
}

async fn serve(state: AppState) -> String {
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

/// Spawns the app with a scripted judge and a seeded question shuffle.
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let judge = Arc::new(NumericJudge::default());

    let state = AppState::new(
        test_config(),
        store.clone(),
        judge.clone(),
        Arc::new(SeededRandom::new(1234)),
    );

    TestApp {
        address: serve(state).await,
        store,
        judge,
        client: reqwest::Client::new(),
    }
}

/// Spawns the app with the real judge client and no API key.
pub async fn spawn_app_without_judge() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let judge = OpenAiJudge::new(&JudgeConfig::default()).unwrap();

    let state = AppState::new(
        test_config(),
        store.clone(),
        Arc::new(judge),
        Arc::new(SeededRandom::new(1234)),
    );

    TestApp {
        address: serve(state).await,
        store,
        judge: Arc::new(NumericJudge::default()),
        client: reqwest::Client::new(),
    }
}

pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

pub fn criterion(id: i64, name: &str, easy: i32, medium: i32, hard: i32, passing_marks: i32) -> Criterion {
    Criterion {
        id,
        name: name.to_string(),
        category_id: CATEGORY_ID,
        easy,
        medium,
        hard,
        time_limit: 45,
        passing_marks,
        valid_from: None,
        valid_to: None,
        created_by: "admin".to_string(),
        created_at: Utc::now(),
    }
}

pub fn question(id: i64, difficulty: Difficulty, reference: &str) -> Question {
    Question {
        id,
        qno: Some(id as i32),
        question: format!("Question {}", id),
        answer: reference.to_string(),
        difficulty,
        category_id: CATEGORY_ID,
        image_url: None,
        created_by: "admin".to_string(),
    }
}

pub fn yesterday() -> NaiveDate {
    Utc::now().date_naive().pred_opt().unwrap()
}

impl TestApp {
    /// 3 easy + 2 medium questions with references, ids 1..=5.
    pub fn seed_bank(&self) {
        for id in 1..=3 {
            self.store
                .insert_question(question(id, Difficulty::Easy, &format!("reference {}", id)));
        }
        for id in 4..=5 {
            self.store
                .insert_question(question(id, Difficulty::Medium, &format!("reference {}", id)));
        }
    }

    pub fn seed_candidate(&self, interviews: &[&str]) -> String {
        let candidate_id = unique_name("cand");
        self.store.insert_candidate(Candidate {
            candidate_id: candidate_id.clone(),
            name: "Test Candidate".to_string(),
            email: "candidate@example.com".to_string(),
            phone: "555-0100".to_string(),
            password: hash_password(PASSWORD).unwrap(),
            interviews: interviews
                .iter()
                .map(|name| AssignedInterview {
                    interview_name: name.to_string(),
                    interview_date: "2025-10-01".to_string(),
                    interview_time: "10:00".to_string(),
                })
                .collect(),
        });
        candidate_id
    }

    pub async fn login(&self, candidate_id: &str) -> String {
        let resp = self
            .client
            .post(format!("{}/api/auth/candidate/login", self.address))
            .json(&serde_json::json!({ "candidateId": candidate_id, "password": PASSWORD }))
            .send()
            .await
            .expect("Login failed")
            .json::<serde_json::Value>()
            .await
            .expect("Failed to parse login json");

        resp["access_token"]
            .as_str()
            .expect("Token not found")
            .to_string()
    }

    pub async fn post(&self, path: &str, token: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Starts a session and returns its JSON body.
    pub async fn start(&self, token: &str, interview_name: &str) -> serde_json::Value {
        let resp = self
            .post(
                "/api/interview/start",
                token,
                serde_json::json!({ "interview_name": interview_name }),
            )
            .await;
        assert_eq!(resp.status().as_u16(), 200);
        resp.json().await.unwrap()
    }
}
