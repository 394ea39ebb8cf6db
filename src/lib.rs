//! Decode PCM WAV files, normalize their samples for display and estimate
//! their fundamental frequency.

pub mod audio;
pub mod config;
pub mod display;
