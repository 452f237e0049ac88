use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, SqlErr,
};
use uuid::Uuid;

use crate::entities::{prelude::*, users};
use crate::repositories::{model_to_user, repo_err};
use wordboard_types::{RepoError, User, UserStore};

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<User, RepoError> {
        let model = Users::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        match model {
            Some(model) => model_to_user(model),
            None => Err(RepoError::NotFound),
        }
    }

    async fn find_by_oauth_id(&self, oauth_id: &str) -> Result<User, RepoError> {
        let model = Users::find()
            .filter(users::Column::OauthId.eq(oauth_id))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        match model {
            Some(model) => model_to_user(model),
            None => Err(RepoError::NotFound),
        }
    }

    async fn create(&self, user: &User) -> Result<User, RepoError> {
        let model = users::ActiveModel {
            id: Set(user.id.to_string()),
            oauth_id: Set(user.oauth_id.clone()),
            display_name: Set(user.display_name.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        match Users::insert(model).exec(&self.db).await {
            Ok(_) => Ok(user.clone()),
            // oauth_id carries a unique index; a concurrent first login for
            // the same subject resolves by re-fetching
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(RepoError::Conflict),
                _ => Err(repo_err(err)),
            },
        }
    }
}
