use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::clock::{epoch, Clock};
use crate::store::{EntityStore, StoreError};

/// The two entity families moderation can suspend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Restaurant,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Restaurant => "restaurant",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(EntityKind::User),
            "restaurant" => Ok(EntityKind::Restaurant),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("{0} {1} not found")]
    NotFound(EntityKind, Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The lazy write a ban check wants applied: reset an expired
/// `banned_until` to the epoch value. Surfaced as an explicit command so
/// the caller owns the transaction boundary instead of the read path
/// hiding a mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BanCleanup {
    pub kind: EntityKind,
    pub entity_id: Uuid,
    pub reset_to: DateTime<FixedOffset>,
}

/// Outcome of evaluating a `banned_until` field against a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BanDecision {
    pub is_banned: bool,
    pub cleanup: Option<BanCleanup>,
}

impl BanDecision {
    /// Pure suspension check. A ban strictly in the future is active and
    /// left untouched. Anything at or before `now` means the entity is no
    /// longer banned; a stale non-epoch value additionally yields the
    /// idempotent cleanup command.
    pub fn evaluate(
        kind: EntityKind,
        entity_id: Uuid,
        banned_until: Option<DateTime<FixedOffset>>,
        now: DateTime<FixedOffset>,
    ) -> Self {
        match banned_until {
            Some(until) if until > now => BanDecision {
                is_banned: true,
                cleanup: None,
            },
            Some(until) if until != epoch() => BanDecision {
                is_banned: false,
                cleanup: Some(BanCleanup {
                    kind,
                    entity_id,
                    reset_to: epoch(),
                }),
            },
            _ => BanDecision {
                is_banned: false,
                cleanup: None,
            },
        }
    }
}

/// Answers "is this entity currently suspended?" and self-heals expired
/// suspensions on the way through.
///
/// The state machine has exactly one transition inside this component:
/// SUSPENDED -> ACTIVE by elapsed time, checked lazily. Re-suspension is
/// owned by the external moderation workflow that sets `banned_until`.
pub struct BanEvaluator {
    store: Arc<dyn EntityStore>,
    clock: Arc<dyn Clock>,
}

impl BanEvaluator {
    pub fn new(store: Arc<dyn EntityStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Load the entity and evaluate its ban. A missing entity is an error,
    /// never "not banned" - silently passing one through would mask a
    /// data-integrity problem upstream.
    pub async fn is_banned(&self, id: Uuid, kind: EntityKind) -> Result<bool, ModerationError> {
        let banned_until = match kind {
            EntityKind::User => {
                self.store
                    .user_by_id(id)
                    .await?
                    .ok_or(ModerationError::NotFound(kind, id))?
                    .banned_until
            }
            EntityKind::Restaurant => {
                self.store
                    .restaurant_by_id(id)
                    .await?
                    .ok_or(ModerationError::NotFound(kind, id))?
                    .banned_until
            }
        };

        let decision = BanDecision::evaluate(kind, id, banned_until, self.clock.now());
        if let Some(cleanup) = decision.cleanup {
            self.apply_cleanup(cleanup).await?;
        }

        Ok(decision.is_banned)
    }

    /// Execute a cleanup command. Safe to race: every checker writes the
    /// same epoch value.
    pub async fn apply_cleanup(&self, cleanup: BanCleanup) -> Result<(), StoreError> {
        debug!(
            "Clearing expired ban on {} {}",
            cleanup.kind.as_str(),
            cleanup.entity_id
        );
        match cleanup.kind {
            EntityKind::User => {
                self.store
                    .set_user_banned_until(cleanup.entity_id, cleanup.reset_to)
                    .await
            }
            EntityKind::Restaurant => {
                self.store
                    .set_restaurant_banned_until(cleanup.entity_id, cleanup.reset_to)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<FixedOffset> {
        epoch() + Duration::days(1000)
    }

    #[test]
    fn future_ban_is_active_and_untouched() {
        let id = Uuid::new_v4();
        let until = now() + Duration::hours(4);
        let decision = BanDecision::evaluate(EntityKind::User, id, Some(until), now());
        assert!(decision.is_banned);
        assert!(decision.cleanup.is_none());
    }

    #[test]
    fn expired_ban_clears_to_epoch() {
        let id = Uuid::new_v4();
        let until = now() - Duration::hours(4);
        let decision = BanDecision::evaluate(EntityKind::Restaurant, id, Some(until), now());
        assert!(!decision.is_banned);
        let cleanup = decision.cleanup.expect("expired ban should request cleanup");
        assert_eq!(cleanup.entity_id, id);
        assert_eq!(cleanup.kind, EntityKind::Restaurant);
        assert_eq!(cleanup.reset_to, epoch());
    }

    #[test]
    fn ban_expiring_exactly_now_is_inactive() {
        let id = Uuid::new_v4();
        let decision = BanDecision::evaluate(EntityKind::User, id, Some(now()), now());
        assert!(!decision.is_banned);
        assert!(decision.cleanup.is_some());
    }

    #[test]
    fn absent_and_epoch_values_need_no_cleanup() {
        let id = Uuid::new_v4();
        let none = BanDecision::evaluate(EntityKind::User, id, None, now());
        assert!(!none.is_banned);
        assert!(none.cleanup.is_none());

        let zeroed = BanDecision::evaluate(EntityKind::User, id, Some(epoch()), now());
        assert!(!zeroed.is_banned);
        assert!(zeroed.cleanup.is_none());
    }

    #[test]
    fn entity_kind_parses_path_values() {
        assert_eq!("user".parse::<EntityKind>(), Ok(EntityKind::User));
        assert_eq!("restaurant".parse::<EntityKind>(), Ok(EntityKind::Restaurant));
        assert!("comment".parse::<EntityKind>().is_err());
    }
}
