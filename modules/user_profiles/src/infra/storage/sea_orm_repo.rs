//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it works with a `DatabaseConnection`
//! or with a transaction handle.

use anyhow::Context;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, SqlErr,
};
use uuid::Uuid;

use crate::contract::model::UserProfile;
use crate::domain::repo::{EmailTaken, UserProfileRepository};
use crate::infra::storage::entity::{ActiveModel as ProfileAM, Column, Entity as ProfileEntity};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUserProfileRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUserProfileRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait::async_trait]
impl<C> UserProfileRepository for SeaOrmUserProfileRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        let found = ProfileEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserProfile>> {
        let found = ProfileEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_by_email failed")?;
        Ok(found.map(Into::into))
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let count = ProfileEntity::find()
            .filter(Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, u: UserProfile) -> anyhow::Result<()> {
        let email = u.email.clone();
        let m: ProfileAM = u.into();
        match ProfileEntity::insert(m).exec(&self.conn).await {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(EmailTaken { email }.into()),
            Err(e) => Err(anyhow::Error::new(e).context("insert failed")),
        }
    }

    async fn update(&self, u: UserProfile) -> anyhow::Result<()> {
        let email = u.email.clone();
        let m: ProfileAM = u.into();
        match m.update(&self.conn).await {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(EmailTaken { email }.into()),
            Err(e) => Err(anyhow::Error::new(e).context("update failed")),
        }
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = ProfileEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }
}
