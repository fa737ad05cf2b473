//! Policy module - who may do what to a session.

mod authorization;

pub use authorization::{
    can_end, can_join, can_manage_participants, can_pin, can_send, can_start, can_subscribe,
    deny, require_host, require_manager, require_present, role_change, ActorRelation,
    AuthorizationResult, Manager, RoleChange,
};
