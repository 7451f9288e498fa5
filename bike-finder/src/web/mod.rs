//! Web layer for the bike finder.
//!
//! A thin fulfillment webhook: the conversational front-end posts an action
//! and gets back the text to say. No language understanding happens here.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{Action, AppError, create_router, handle_action};
pub use state::{AppState, LiveFinder};
