use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};

use crate::entities::empleado::{self, Especialidad};
use crate::entities::user::{self, UserRole};
use crate::entities::cliente;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// New password for [`reset_password`].
#[derive(Debug, Clone)]
pub enum PasswordInput {
    /// Hashed with argon2 before it is stored.
    Plain(String),
    /// A precomputed PHC hash string, stored as is.
    Hash(String),
}

impl PasswordInput {
    fn into_hash(self) -> AppResult<String> {
        match self {
            PasswordInput::Plain(plain) => {
                if plain.is_empty() {
                    return Err(AppError::BadRequest("Password cannot be empty".to_string()));
                }
                hash_password(&plain)
            }
            PasswordInput::Hash(hash) => {
                PasswordHash::new(&hash).map_err(|e| {
                    AppError::BadRequest(format!("Password hash is not a PHC string: {}", e))
                })?;
                Ok(hash)
            }
        }
    }
}

pub fn hash_password(plain: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(plain: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub async fn create_user<C: ConnectionTrait>(db: &C, new: NewUser) -> AppResult<user::Model> {
    let email = new.email.trim().to_lowercase();
    let username = new.username.trim().to_string();

    if !email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if username.is_empty() {
        return Err(AppError::BadRequest("Username cannot be empty".to_string()));
    }
    if new.password.is_empty() {
        return Err(AppError::BadRequest("Password cannot be empty".to_string()));
    }

    let existing = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(&email))
                .add(user::Column::Username.eq(&username)),
        )
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email or username already registered".to_string()));
    }

    let password = hash_password(&new.password)?;
    let user = user::ActiveModel {
        username: Set(username),
        email: Set(email),
        password: Set(password),
        role: Set(new.role),
        is_active: Set(true),
        date_joined: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(user.insert(db).await?)
}

/// Create a user with the cliente role together with its profile. Both rows
/// are written in one transaction.
pub async fn register_cliente(
    db: &DatabaseConnection,
    new: NewUser,
    nombre_completo: &str,
    telefono: Option<String>,
) -> AppResult<(user::Model, cliente::Model)> {
    let nombre_completo = nombre_completo.trim();
    if nombre_completo.is_empty() {
        return Err(AppError::BadRequest("nombre_completo cannot be empty".to_string()));
    }

    let txn = db.begin().await?;
    let user = create_user(&txn, NewUser { role: UserRole::Cliente, ..new }).await?;
    let cliente = cliente::ActiveModel {
        user_id: Set(user.id),
        nombre_completo: Set(nombre_completo.to_string()),
        telefono: Set(telefono),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok((user, cliente))
}

/// Create a user with the empleado role together with its profile, in one
/// transaction.
pub async fn register_empleado(
    db: &DatabaseConnection,
    new: NewUser,
    especialidad: Especialidad,
) -> AppResult<(user::Model, empleado::Model)> {
    let txn = db.begin().await?;
    let user = create_user(&txn, NewUser { role: UserRole::Empleado, ..new }).await?;
    let empleado = empleado::ActiveModel {
        user_id: Set(user.id),
        especialidad: Set(especialidad),
        activo: Set(true),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok((user, empleado))
}

/// Check credentials. `login` may be either the email or the username.
pub async fn authenticate(
    db: &DatabaseConnection,
    login: &str,
    password: &str,
) -> AppResult<user::Model> {
    let login = login.trim();
    let user = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(login.to_lowercase()))
                .add(user::Column::Username.eq(login)),
        )
        .one(db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !user.is_active || !verify_password(password, &user.password) {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    Ok(user)
}

/// Overwrite the stored password of the user with `email`.
///
/// There is no existence check: the returned row count (1 or 0) is the only
/// signal that the email matched a user.
pub async fn reset_password(
    db: &DatabaseConnection,
    email: &str,
    input: PasswordInput,
) -> AppResult<u64> {
    let hash = input.into_hash()?;
    let result = user::Entity::update_many()
        .col_expr(user::Column::Password, Expr::value(hash))
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .exec(db)
        .await?;

    tracing::info!(email = %email, rows = result.rows_affected, "Password reset");
    Ok(result.rows_affected)
}

pub async fn cliente_for_user(db: &DatabaseConnection, user_id: i32) -> AppResult<cliente::Model> {
    cliente::Entity::find()
        .filter(cliente::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("No cliente profile for this user".to_string()))
}

pub async fn empleado_for_user(db: &DatabaseConnection, user_id: i32) -> AppResult<empleado::Model> {
    empleado::Entity::find()
        .filter(empleado::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("No empleado profile for this user".to_string()))
}

/// Create the owner account if no user has `email` yet.
pub async fn seed_propietario(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> AppResult<Option<user::Model>> {
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(None);
    }

    let username = email.split('@').next().unwrap_or(email).to_string();
    let user = create_user(
        db,
        NewUser {
            username,
            email: email.to_string(),
            password: password.to_string(),
            role: UserRole::Propietario,
        },
    )
    .await?;

    tracing::info!("Propietario account created: {}", user.email);
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use sea_orm::sea_query::{Alias, Table};
    use sea_orm::PaginatorTrait;
    use sea_orm_migration::SchemaManager;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: "secreto".to_string(),
            role: UserRole::Cliente,
        }
    }

    #[tokio::test]
    async fn test_reset_password_existing_email() {
        let db = connect_in_memory().await.unwrap();
        create_user(&db, new_user("ana", "ana@example.com")).await.unwrap();

        let hash = hash_password("nueva-clave").unwrap();
        let rows = reset_password(&db, "ana@example.com", PasswordInput::Hash(hash.clone()))
            .await
            .unwrap();
        assert_eq!(rows, 1);

        let stored = user::Entity::find()
            .filter(user::Column::Email.eq("ana@example.com"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.password, hash);
        assert!(authenticate(&db, "ana@example.com", "nueva-clave").await.is_ok());
    }

    #[tokio::test]
    async fn test_reset_password_missing_email_updates_nothing() {
        let db = connect_in_memory().await.unwrap();
        create_user(&db, new_user("ana", "ana@example.com")).await.unwrap();

        let rows = reset_password(
            &db,
            "nadie@example.com",
            PasswordInput::Plain("x1".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_reset_password_rejects_non_phc_hash() {
        let db = connect_in_memory().await.unwrap();
        let err = reset_password(
            &db,
            "ana@example.com",
            PasswordInput::Hash("not-a-hash".to_string()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let db = connect_in_memory().await.unwrap();
        create_user(&db, new_user("ana", "ana@example.com")).await.unwrap();
        let err = create_user(&db, new_user("ana2", "ANA@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_authenticate_by_username_and_rejects_wrong_password() {
        let db = connect_in_memory().await.unwrap();
        create_user(&db, new_user("ana", "ana@example.com")).await.unwrap();

        assert!(authenticate(&db, "ana", "secreto").await.is_ok());
        assert!(matches!(
            authenticate(&db, "ana", "otra").await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_seed_propietario_runs_once() {
        let db = connect_in_memory().await.unwrap();
        let first = seed_propietario(&db, "duenia@salon.local", "clave").await.unwrap();
        let second = seed_propietario(&db, "duenia@salon.local", "clave").await.unwrap();

        assert_eq!(first.map(|u| u.role), Some(UserRole::Propietario));
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_failed_profile_leaves_no_user() {
        let db = connect_in_memory().await.unwrap();
        SchemaManager::new(&db)
            .drop_table(Table::drop().table(Alias::new("empleados_empleado")).to_owned())
            .await
            .unwrap();

        let result =
            register_empleado(&db, new_user("marta", "marta@example.com"), Especialidad::Masajes)
                .await;
        assert!(result.is_err());
        assert_eq!(user::Entity::find().count(&db).await.unwrap(), 0);

        let (user, cliente) =
            register_cliente(&db, new_user("lucia", "lucia@example.com"), "Lucía", None)
                .await
                .unwrap();
        assert_eq!(cliente.user_id, user.id);
        assert_eq!(user.role, UserRole::Cliente);
    }
}
