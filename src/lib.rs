// src/lib.rs

//! Talk archive to podcast feed builder.
//!
//! Fetches an audio-talk listing page, detects changes by checksum, extracts
//! dated talks from the links, renders an RSS feed and publishes it locally
//! and, in production, to S3.

pub mod config;
pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
