use sea_orm::Set;

use crate::contract::model::{PasswordHash, UserProfile};
use crate::infra::storage::entity::{ActiveModel, Model};

impl From<Model> for UserProfile {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            name: m.name,
            password_hash: PasswordHash::from_stored(m.password_hash),
            last_login: m.last_login,
            is_active: m.is_active,
            is_staff: m.is_staff,
            is_superuser: m.is_superuser,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Every column set, so the same value serves inserts and full updates.
impl From<UserProfile> for ActiveModel {
    fn from(u: UserProfile) -> Self {
        Self {
            id: Set(u.id),
            email: Set(u.email),
            name: Set(u.name),
            password_hash: Set(u.password_hash.as_str().to_owned()),
            last_login: Set(u.last_login),
            is_active: Set(u.is_active),
            is_staff: Set(u.is_staff),
            is_superuser: Set(u.is_superuser),
            created_at: Set(u.created_at),
            updated_at: Set(u.updated_at),
        }
    }
}
