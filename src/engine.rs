//! Engine facade — the single entry point the transport calls into.
//!
//! Wraps one `Round` behind one `Mutex`: the "single exclusive lock for the
//! whole round" model the spec recommends (§5, §9), mirroring the
//! teacher's pattern of a single shared, lock-guarded matching state rather
//! than fine-grained per-book locking.

use crate::clock::{Clock, SystemClock};
use crate::core_types::PlayerId;
use crate::error::EngineError;
use crate::events::{EventSink, NullSink};
use crate::round::{Action, ActionResult, Config, Round, Snapshot};
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex};

pub struct Engine {
    round: Mutex<Round>,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self::with_collaborators(config, Arc::new(SystemClock), Arc::new(NullSink))
    }

    pub fn with_collaborators(
        config: Config,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Engine {
            round: Mutex::new(Round::new(config, clock, sink)),
        }
    }

    /// Construct with a seeded rng, for tests that want a reproducible deal.
    pub fn with_rng(
        config: Config,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EventSink>,
        rng: StdRng,
    ) -> Self {
        Engine {
            round: Mutex::new(Round::with_rng(config, clock, sink, rng)),
        }
    }

    pub fn join(&self, name: String) -> Result<PlayerId, EngineError> {
        self.round
            .lock()
            .expect("round mutex poisoned")
            .join(name)
    }

    pub fn state_for(&self, player: PlayerId) -> Result<Snapshot, EngineError> {
        self.round
            .lock()
            .expect("round mutex poisoned")
            .state_for(player)
    }

    pub fn submit_action(
        &self,
        player: PlayerId,
        action: Action,
    ) -> Result<ActionResult, EngineError> {
        self.round
            .lock()
            .expect("round mutex poisoned")
            .submit_action(player, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn engine(num_players: usize) -> Engine {
        Engine::new(Config {
            num_players,
            trading_duration: Duration::from_secs(240),
            starting_balance: 350,
            ante: 50,
        })
    }

    #[test]
    fn lobby_rejects_joins_past_capacity() {
        let engine = engine(4);
        for i in 0..4 {
            engine.join(format!("p{i}")).unwrap();
        }
        assert_eq!(engine.join("late".into()).unwrap_err(), EngineError::NotWaiting);
    }

    #[test]
    fn state_for_rejects_unknown_player() {
        let engine = engine(4);
        engine.join("a".into()).unwrap();
        assert_eq!(
            engine.state_for(PlayerId::new()).unwrap_err(),
            EngineError::UnknownPlayer
        );
    }
}
