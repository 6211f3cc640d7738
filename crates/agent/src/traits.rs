//! Agent traits for abstraction and testability
//!
//! The webhook layer depends on `TurnHandler` rather than the concrete
//! controller, so transport tests can substitute a scripted or failing
//! handler.

use async_trait::async_trait;

use hotel_voice_core::Prompt;

use crate::controller::{TurnRequest, TurnResult};

#[async_trait]
pub trait TurnHandler: Send + Sync {
    /// Process one turn; failures are reported in the result, never raised
    async fn run_turn(&self, request: &TurnRequest) -> TurnResult;

    /// Closing prompt used when a turn could not be processed at all
    fn apology(&self) -> Prompt;
}
