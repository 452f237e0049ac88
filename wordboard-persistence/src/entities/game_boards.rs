use sea_orm::entity::prelude::*;

/// `guess_count` shadows the length of the `guesses` JSON array so the
/// conditional update in the repository can filter on the prior state.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "game_boards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: String,
    pub day: i32,
    pub guesses: Json,
    pub guess_count: i32,
    pub state: String,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
