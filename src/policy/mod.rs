use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::moderation::EntityKind;

/// Account role. `Propietario` is a user who owns at least one restaurant;
/// the role names match what existing clients send and store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Propietario,
    Admin,
}

impl Role {
    /// Lenient parse for role values coming out of the store. Unknown
    /// values degrade to the least-privileged role.
    pub fn parse(value: &str) -> Self {
        match value {
            "admin" => Role::Admin,
            "propietario" => Role::Propietario,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Propietario => "propietario",
            Role::Admin => "admin",
        }
    }
}

/// The authenticated principal a request acts as.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ScanNearby,
    CheckBan,
    Moderate,
}

#[derive(Debug, Clone, Copy)]
pub enum Resource {
    RestaurantCollection,
    Entity { kind: EntityKind, id: Uuid },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Single capability gate called before the engine or evaluator runs,
/// replacing per-handler role checks.
pub fn check(actor: &Actor, action: Action, resource: &Resource) -> Decision {
    if actor.role == Role::Admin {
        return Decision::Allow;
    }

    match (action, resource) {
        // Any authenticated account may scan for nearby restaurants.
        (Action::ScanNearby, Resource::RestaurantCollection) => Decision::Allow,

        // Non-admins may only query their own ban state.
        (Action::CheckBan, Resource::Entity { kind, id }) => {
            if *kind == EntityKind::User && *id == actor.user_id {
                Decision::Allow
            } else {
                Decision::Deny("ban checks on other entities require the admin role")
            }
        }

        (Action::Moderate, _) => Decision::Deny("moderation requires the admin role"),

        _ => Decision::Deny("action not permitted on this resource"),
    }
}
