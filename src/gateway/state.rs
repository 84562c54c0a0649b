use crate::engine::Engine;
use std::sync::Arc;

/// Shared state handed to every handler. The gateway itself carries no
/// state of its own — every question a handler needs answered goes through
/// the engine facade, which owns the single round lock.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}
