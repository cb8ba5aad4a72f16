//! tyrano-assets - shared drive to TyranoScript project sync
//!
//! Converts scenario manuscripts (.txt/.docx) into paged TyranoScript,
//! transcodes music to mp3 and HEIC photos to JPEG, and copies everything
//! else as-is, skipping files whose content has not changed.

pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod media;
pub mod pipeline;
pub mod romanize;
pub mod script;
pub mod workflow;
