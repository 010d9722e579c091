//! UI rendering module for the matchday TUI
//!
//! This module contains all the rendering logic for the terminal user
//! interface, using the ratatui library for TUI components.

pub mod fixture_list;
pub mod help_overlay;

pub use fixture_list::render as render_fixture_list;
pub use help_overlay::render as render_help_overlay;
