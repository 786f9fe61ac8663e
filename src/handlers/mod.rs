// src/handlers/mod.rs

pub mod article;
pub mod auth;
pub mod category;
pub mod comment;
pub mod like;
pub mod tag;
