use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::{hwm, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hwm_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub hwm_id: Uuid,
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
    #[sea_orm(column_type = "String(StringLen::N(32))")]
    pub action: String,
    pub changed_at: DateTimeWithTimeZone,
    pub changed_by_user_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Hwm,
    ChangedBy,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Hwm => Entity::belongs_to(hwm::Entity)
                .from(Column::HwmId)
                .to(hwm::Column::Id)
                .into(),
            Relation::ChangedBy => Entity::belongs_to(user::Entity)
                .from(Column::ChangedByUserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChangedBy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// What happened to the HWM in a history row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HwmAction {
    Created,
    Updated,
    Deleted,
}

impl HwmAction {
    pub fn as_str(self) -> &'static str {
        match self {
            HwmAction::Created => "Created",
            HwmAction::Updated => "Updated",
            HwmAction::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for HwmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HwmAction {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(HwmAction::Created),
            "Updated" => Ok(HwmAction::Updated),
            "Deleted" => Ok(HwmAction::Deleted),
            other => Err(ModelError::validation("action", format!("unknown action {other:?}"))),
        }
    }
}

/// Append a snapshot of `current` to the history log.
pub async fn record<C: ConnectionTrait>(
    db: &C,
    current: &hwm::Model,
    action: HwmAction,
    changed_by: Option<Uuid>,
) -> Result<Model, ModelError> {
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        hwm_id: Set(current.id),
        namespace_id: Set(current.namespace_id),
        name: Set(current.name.clone()),
        description: Set(current.description.clone()),
        hwm_type: Set(current.hwm_type.clone()),
        value: Set(current.value.clone()),
        entity: Set(current.entity.clone()),
        expression: Set(current.expression.clone()),
        action: Set(action.as_str().to_string()),
        changed_at: Set(Utc::now().into()),
        changed_by_user_id: Set(changed_by),
    };
    Ok(am.insert(db).await?)
}
