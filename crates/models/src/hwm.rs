use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::{namespace, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hwm")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub namespace_id: Uuid,
    #[sea_orm(column_type = "String(StringLen::N(2048))")]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_name = "type", column_type = "String(StringLen::N(64))")]
    pub hwm_type: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub value: Json,
    #[sea_orm(column_type = "Text", nullable)]
    pub entity: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub expression: Option<String>,
    pub is_deleted: bool,
    pub changed_at: DateTimeWithTimeZone,
    pub changed_by_user_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Namespace,
    ChangedBy,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Namespace => Entity::belongs_to(namespace::Entity)
                .from(Column::NamespaceId)
                .to(namespace::Column::Id)
                .into(),
            Relation::ChangedBy => Entity::belongs_to(user::Entity)
                .from(Column::ChangedByUserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<namespace::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Namespace.def()
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChangedBy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const NAME_MAX_LEN: usize = 2048;
pub const TYPE_MAX_LEN: usize = 64;

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::validation("name", "name required"));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(ModelError::validation("name", format!("at most {NAME_MAX_LEN} characters")));
    }
    Ok(())
}

pub fn validate_type(hwm_type: &str) -> Result<(), ModelError> {
    if hwm_type.trim().is_empty() {
        return Err(ModelError::validation("type", "type required"));
    }
    if hwm_type.chars().count() > TYPE_MAX_LEN {
        return Err(ModelError::validation("type", format!("at most {TYPE_MAX_LEN} characters")));
    }
    Ok(())
}

/// Column values of a new HWM, before ids and timestamps are assigned.
#[derive(Clone, Debug, PartialEq)]
pub struct NewHwm {
    pub namespace_id: Uuid,
    pub name: String,
    pub description: String,
    pub hwm_type: String,
    pub value: Json,
    pub entity: Option<String>,
    pub expression: Option<String>,
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewHwm, changed_by: Uuid) -> Result<Model, ModelError> {
    validate_name(&new.name)?;
    validate_type(&new.hwm_type)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        namespace_id: Set(new.namespace_id),
        name: Set(new.name),
        description: Set(new.description),
        hwm_type: Set(new.hwm_type),
        value: Set(new.value),
        entity: Set(new.entity),
        expression: Set(new.expression),
        is_deleted: Set(false),
        changed_at: Set(Utc::now().into()),
        changed_by_user_id: Set(Some(changed_by)),
    };
    Ok(am.insert(db).await?)
}
