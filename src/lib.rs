//! Core of the eztask personal task manager: the fixed-layout task record,
//! the per-user file-backed store it lives in, and the queries the menus
//! are built from. The binary adds a CLI and an interactive UI on top.

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod queries;
pub mod storage;
pub mod timeutil;
pub mod tui;
