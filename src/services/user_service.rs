use super::{build_list_query, ListQuery};
use crate::config::AppConfig;
use crate::constants::entities::USER;
use crate::database::error_codes::{sqlstate, PgErrorCode};
use crate::error::{Result, TodoError};
use crate::metadata::MetadataRegistry;
use crate::models::{NewUser, User};
use crate::validation::{validate_owner, validate_user_name};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct UserService {
    pool: PgPool,
    registry: Arc<MetadataRegistry>,
    config: Arc<AppConfig>,
}

impl UserService {
    pub fn new(pool: PgPool, registry: Arc<MetadataRegistry>, config: Arc<AppConfig>) -> Self {
        Self {
            pool,
            registry,
            config,
        }
    }

    /// List users matching the request's filter, order and page
    #[instrument(skip_all)]
    pub async fn find_all(&self, request: &ListQuery) -> Result<Vec<User>> {
        let (_, builder) = build_list_query(&self.registry, &self.config.query, USER, request)?;
        Ok(User::find_by_query(&self.pool, &builder).await?)
    }

    /// Register a user; the email doubles as the assignment owner key
    pub async fn create(&self, email: &str, name: &str) -> Result<User> {
        let new_user = NewUser {
            email: validate_owner(email, self.config.assignment.max_owner_length)?,
            name: validate_user_name(name)?,
        };

        match User::create(&self.pool, new_user).await {
            Ok(user) => {
                info!(user_id = %user.id, "created user");
                Ok(user)
            }
            Err(err) if sqlstate(&err).is_some_and(|code| PgErrorCode::is_unique_violation(&code)) => {
                Err(TodoError::Validation(format!("email {email} is already registered")))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<User> {
        User::find_by_email(&self.pool, email)
            .await?
            .ok_or_else(|| TodoError::not_found(USER, email))
    }
}
