// src/models/question.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Difficulty band of a question.
///
/// Bands are ordered: a served question set always lists every easy
/// question before any medium one, and medium before hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// Sequence number inside the uploaded bank.
    pub qno: Option<i32>,

    /// The prompt shown to the candidate.
    pub question: String,

    /// Reference answer used by the scoring judge. Never sent to candidates.
    pub answer: String,

    pub difficulty: Difficulty,

    pub category_id: i64,

    pub image_url: Option<String>,

    /// Admin who uploaded the question.
    pub created_by: String,
}

/// DTO for sending a question to a candidate (excludes the reference answer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PublicQuestion {
    pub qid: i64,
    pub qno: Option<i32>,
    pub question: String,
    pub difficulty: Difficulty,
    pub image_url: Option<String>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            qid: q.id,
            qno: q.qno,
            question: q.question,
            difficulty: q.difficulty,
            image_url: q.image_url,
        }
    }
}
