pub mod annotator;
pub mod generator;
pub mod handlers;

use crate::state::AppState;
use axum::Router;

pub use annotator::Annotator;
pub use generator::{OpenAiGenerator, TextGenerator};

pub fn router() -> Router<AppState> {
    handlers::ai_routes()
}
