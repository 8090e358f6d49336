// src/models/mod.rs

pub mod candidate;
pub mod criterion;
pub mod question;
pub mod session;
