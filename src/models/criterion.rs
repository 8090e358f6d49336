// src/models/criterion.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::question::Difficulty;

/// Represents the 'criteria' table in the database.
/// A named scoring template bound to one question category.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Criterion {
    pub id: i64,

    /// Interview name. Unique per owning admin only.
    pub name: String,

    pub category_id: i64,

    pub easy: i32,
    pub medium: i32,
    pub hard: i32,

    /// Time limit as configured by the admin (minutes).
    pub time_limit: i32,

    /// Pass threshold, 0-100.
    pub passing_marks: i32,

    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,

    pub created_by: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Requested question count per difficulty band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandCounts {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl BandCounts {
    pub fn get(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

impl Criterion {
    /// Band counts with negative values treated as zero.
    pub fn band_counts(&self) -> BandCounts {
        let count = |n: i32| usize::try_from(n).unwrap_or(0);
        BandCounts {
            easy: count(self.easy),
            medium: count(self.medium),
            hard: count(self.hard),
        }
    }

    /// Whether the interview may be started on `day`. Both bounds are inclusive.
    pub fn is_available_on(&self, day: NaiveDate) -> bool {
        self.valid_from.is_none_or(|from| from <= day) && self.valid_to.is_none_or(|to| day <= to)
    }
}
