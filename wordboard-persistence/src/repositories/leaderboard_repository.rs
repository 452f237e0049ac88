use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    SqlErr,
};
use uuid::Uuid;

use crate::entities::{game_boards, leaderboards, prelude::*, users};
use crate::repositories::{model_to_user, parse_uuid, repo_err, state_from_str};
use wordboard_types::{
    GuessRow, Leaderboard, LeaderboardStore, RepoError, User, UserStat,
};

pub struct LeaderboardRepository {
    db: DatabaseConnection,
}

impl LeaderboardRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_leaderboard(model: leaderboards::Model) -> Result<Leaderboard, RepoError> {
        let raw_ids: Vec<String> = serde_json::from_value(model.member_ids)
            .map_err(|err| RepoError::Failure(format!("malformed member list: {err}")))?;
        let member_ids = raw_ids
            .iter()
            .map(|raw| parse_uuid(raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Leaderboard {
            join_id: model.join_id,
            stored_id: model.id,
            name: model.name,
            owner_id: parse_uuid(&model.owner_id)?,
            member_ids,
        })
    }

    fn member_ids_to_json(leaderboard: &Leaderboard) -> serde_json::Value {
        serde_json::Value::from(
            leaderboard
                .member_ids
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>(),
        )
    }
}

#[async_trait]
impl LeaderboardStore for LeaderboardRepository {
    async fn find_by_join_id(&self, join_id: &str) -> Result<Leaderboard, RepoError> {
        let model = Leaderboards::find()
            .filter(leaderboards::Column::JoinId.eq(join_id))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        match model {
            Some(model) => Self::model_to_leaderboard(model),
            None => Err(RepoError::NotFound),
        }
    }

    async fn insert(&self, leaderboard: &Leaderboard) -> Result<Leaderboard, RepoError> {
        let stored_id = Uuid::new_v4().to_string();
        let model = leaderboards::ActiveModel {
            id: Set(stored_id.clone()),
            join_id: Set(leaderboard.join_id.clone()),
            name: Set(leaderboard.name.clone()),
            owner_id: Set(leaderboard.owner_id.to_string()),
            member_ids: Set(Self::member_ids_to_json(leaderboard)),
            created_at: Set(chrono::Utc::now().into()),
        };

        match Leaderboards::insert(model).exec(&self.db).await {
            Ok(_) => {
                let mut stored = leaderboard.clone();
                stored.stored_id = stored_id;
                Ok(stored)
            }
            // join-id collision; the service maps this to CouldNotCreate
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(RepoError::Conflict),
                _ => Err(repo_err(err)),
            },
        }
    }

    async fn update_by_id(
        &self,
        stored_id: &str,
        leaderboard: &Leaderboard,
    ) -> Result<(), RepoError> {
        let result = Leaderboards::update_many()
            .col_expr(
                leaderboards::Column::Name,
                Expr::value(leaderboard.name.clone()),
            )
            .col_expr(
                leaderboards::Column::MemberIds,
                Expr::value(Self::member_ids_to_json(leaderboard)),
            )
            .filter(leaderboards::Column::Id.eq(stored_id))
            .exec(&self.db)
            .await
            .map_err(repo_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn find_members(&self, member_ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let ids: Vec<String> = member_ids.iter().map(Uuid::to_string).collect();
        let models = Users::find()
            .filter(users::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        models.into_iter().map(model_to_user).collect()
    }

    async fn find_stats_for_members(
        &self,
        member_ids: &[Uuid],
    ) -> Result<HashMap<User, Vec<UserStat>>, RepoError> {
        let ids: Vec<String> = member_ids.iter().map(Uuid::to_string).collect();

        let members = Users::find()
            .filter(users::Column::Id.is_in(ids.clone()))
            .all(&self.db)
            .await
            .map_err(repo_err)?;
        let boards = GameBoards::find()
            .filter(game_boards::Column::UserId.is_in(ids))
            .order_by_asc(game_boards::Column::Day)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        let mut users_by_id: HashMap<String, User> = HashMap::new();
        let mut stats: HashMap<User, Vec<UserStat>> = HashMap::new();
        for model in members {
            let user = model_to_user(model)?;
            users_by_id.insert(user.id.to_string(), user.clone());
            stats.insert(user, Vec::new());
        }

        for board in boards {
            let Some(user) = users_by_id.get(&board.user_id) else {
                continue;
            };
            let guesses: Vec<GuessRow> = serde_json::from_value(board.guesses)
                .map_err(|err| RepoError::Failure(format!("malformed guess rows: {err}")))?;
            let stat = UserStat {
                day: board.day,
                guesses,
                state: state_from_str(&board.state)?,
                user: user.clone(),
                visible: true,
            };
            if let Some(entries) = stats.get_mut(user) {
                entries.push(stat);
            }
        }

        Ok(stats)
    }

    async fn find_leaderboards_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Leaderboard>, RepoError> {
        // member lists are small JSON arrays; membership is filtered in
        // process rather than with backend-specific JSON operators
        let models = Leaderboards::find()
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        let mut boards = Vec::new();
        for model in models {
            let leaderboard = Self::model_to_leaderboard(model)?;
            if leaderboard.has_member(user_id) {
                boards.push(leaderboard);
            }
        }
        Ok(boards)
    }
}
