//! Terminal UI module using ratatui.
//!
//! - `render`: Frame layout, screens and overlays
//! - `input`: Keyboard event handling
//! - `menu_bar`: The menu surface driven by the session
//! - `styles`: Color schemes and text styling

pub mod input;
pub mod menu_bar;
pub mod render;
pub mod styles;
