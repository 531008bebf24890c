//! braintype - C.O.D.E brain type diagnosis
//!
//! A short quiz maps each answer to one of four brain types. The session
//! state machine lives in [`session`], tallying in [`scoring`], and the
//! declaration card pipeline in [`export`].

pub mod catalog;
pub mod cli;
pub mod config;
pub mod export;
pub mod models;
pub mod reporters;
pub mod scoring;
pub mod session;
