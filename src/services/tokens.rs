use chrono::Utc;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::token;
use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};

/// Keys are 20 random bytes rendered as 40 lowercase hex characters.
const KEY_BYTES: usize = 20;

pub fn generate_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    rand::thread_rng().fill(&mut bytes[..]);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Return the user's token, creating it on first use.
/// The flag tells whether a new token was created.
pub async fn get_or_create(
    db: &DatabaseConnection,
    user_id: i32,
) -> AppResult<(token::Model, bool)> {
    if let Some(existing) = find_for_user(db, user_id).await? {
        return Ok((existing, false));
    }

    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let new_token = token::ActiveModel {
        key: Set(generate_key()),
        user_id: Set(user_id),
        created: Set(Utc::now().into()),
    };

    match new_token.insert(db).await {
        Ok(created) => {
            tracing::info!(user_id, "Token created");
            Ok((created, true))
        }
        // Someone else created it between the lookup and the insert
        Err(e) => match find_for_user(db, user_id).await? {
            Some(existing) => Ok((existing, false)),
            None => Err(e.into()),
        },
    }
}

async fn find_for_user(db: &DatabaseConnection, user_id: i32) -> AppResult<Option<token::Model>> {
    Ok(token::Entity::find()
        .filter(token::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

pub async fn for_email(
    db: &DatabaseConnection,
    email: &str,
) -> AppResult<(user::Model, token::Model, bool)> {
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user with email {}", email)))?;

    let (token, created) = get_or_create(db, user.id).await?;
    Ok((user, token, created))
}

/// Token of the first active user holding `role`.
pub async fn for_role(
    db: &DatabaseConnection,
    role: UserRole,
) -> AppResult<(user::Model, token::Model, bool)> {
    let user = user::Entity::find()
        .filter(user::Column::Role.eq(role))
        .filter(user::Column::IsActive.eq(true))
        .order_by_asc(user::Column::Id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No active {} user", role)))?;

    let (token, created) = get_or_create(db, user.id).await?;
    Ok((user, token, created))
}

/// Resolve a token key to its owner.
pub async fn lookup(db: &DatabaseConnection, key: &str) -> AppResult<user::Model> {
    let (_, user) = token::Entity::find_by_id(key.trim().to_string())
        .find_also_related(user::Entity)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Token not found".to_string()))?;

    let user = user.ok_or_else(|| AppError::NotFound("Token not found".to_string()))?;
    if !user.is_active {
        return Err(AppError::Unauthorized("User is inactive".to_string()));
    }
    Ok(user)
}
