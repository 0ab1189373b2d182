//! Core functionality: note persistence, settings, and editor state

pub mod codec;
pub mod events;
pub mod gateway;
pub mod note;
pub mod registry;
pub mod repository;
pub mod session;
pub mod settings;
