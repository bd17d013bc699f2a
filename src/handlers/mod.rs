use std::sync::Arc;

use crate::moderation::BanEvaluator;
use crate::scan::ProximityEngine;
use crate::store::EntityStore;

pub mod moderation;
pub mod scan;

// Re-export handler functions for use in routing
pub use moderation::banned_get;
pub use scan::nearby_post;

/// Shared request state: the engine and evaluator over one store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub engine: Arc<ProximityEngine>,
    pub evaluator: Arc<BanEvaluator>,
}
