//! HTTP boundary for the parking finder.
//!
//! Plays the part of the chat front-end: users share a location, then ask
//! for nearby or nearest parking. Answers are JSON, or a chat-style HTML
//! message when the client accepts `text/html`.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
