//! UI components for Scribble

pub mod editor;
pub mod note_list;
pub mod settings_panel;
