// src/services/mod.rs

pub mod criteria;
pub mod evaluator;
pub mod finishing;
pub mod judge;
pub mod selector;
