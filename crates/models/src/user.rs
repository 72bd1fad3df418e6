use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique, column_type = "String(StringLen::N(256))")]
    pub username: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub const USERNAME_MAX_LEN: usize = 256;

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(ModelError::validation("username", "username required"));
    }
    if trimmed.len() != username.len() {
        return Err(ModelError::validation("username", "username must not have surrounding whitespace"));
    }
    if username.chars().count() > USERNAME_MAX_LEN {
        return Err(ModelError::validation("username", format!("at most {USERNAME_MAX_LEN} characters")));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(db: &C, username: &str, is_admin: bool) -> Result<Model, ModelError> {
    validate_username(username)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        is_active: Set(true),
        is_admin: Set(is_admin),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_username<C: ConnectionTrait>(db: &C, username: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Username.eq(username)).one(db).await?)
}

pub async fn set_active<C: ConnectionTrait>(db: &C, id: Uuid, is_active: bool) -> Result<Model, ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ModelError::validation("id", "user not found"))?
        .into();
    found.is_active = Set(is_active);
    found.updated_at = Set(Utc::now().into());
    Ok(found.update(db).await?)
}
