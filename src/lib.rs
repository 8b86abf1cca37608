// ABOUTME: Library crate for cardiocheck exposing the assessment wizard, API client and TUI for testing

#![allow(missing_docs)]

pub mod api;
pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod credentials;
pub mod session;
