//! Core type definitions for the application

use std::time::Instant;

/// Where the one search call stands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded,
    Failed,
}

/// UI state for the application
#[derive(Clone, Default)]
pub struct UiState {
    pub load_state: LoadState,
    pub selected: usize,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_help_popup: bool,
}
