pub mod handlers;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{Account, NewAccount, Owner};
use crate::store::RecordStore;

/// Header carrying the calling account's id. Session handling lives in front
/// of this service; requests arrive already authenticated.
pub const OWNER_HEADER: &str = "x-user-id";

#[async_trait]
impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(OWNER_HEADER)
            .ok_or(AppError::Unauthorized)?;
        let account_id = value
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .ok_or(AppError::Unauthorized)?;
        Ok(Owner::new(account_id))
    }
}

/// Registers an account. Usernames are unique; a taken one is a `Conflict`.
pub async fn register_account(
    store: &dyn RecordStore,
    request: NewAccount,
) -> Result<Account, AppError> {
    let username = request.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("Username must not be blank".to_string()));
    }
    let display_name = request
        .display_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    let mut tx = store.begin().await?;
    let account = tx
        .create_account(NewAccount {
            username,
            email: request.email.trim().to_string(),
            display_name,
        })
        .await?;
    tx.commit().await?;

    info!("Registered account {} ({})", account.id, account.username);
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::http::Request;

    fn new_account(username: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            display_name: Some("  ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_trims_and_drops_blank_display_name() {
        let store = MemoryStore::new();
        let account = register_account(&store, new_account(" ada ")).await.unwrap();
        assert_eq!(account.username, "ada");
        assert_eq!(account.display_name, None);
        assert_eq!(account.preferred_name(), "ada");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let store = MemoryStore::new();
        register_account(&store, new_account("ada")).await.unwrap();
        let err = register_account(&store, new_account("ada")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == "Username already exists"));
    }

    #[tokio::test]
    async fn test_blank_username_is_validation_error() {
        let store = MemoryStore::new();
        let err = register_account(&store, new_account("   ")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    async fn extract(request: Request<()>) -> Result<Owner, AppError> {
        let (mut parts, _) = request.into_parts();
        Owner::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_owner_extractor() {
        let id = Uuid::new_v4();
        let request = Request::builder()
            .header("X-User-Id", id.to_string())
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.unwrap(), Owner::new(id));

        let missing = Request::builder().body(()).unwrap();
        assert!(matches!(extract(missing).await, Err(AppError::Unauthorized)));

        let malformed = Request::builder()
            .header("X-User-Id", "not-a-uuid")
            .body(())
            .unwrap();
        assert!(matches!(extract(malformed).await, Err(AppError::Unauthorized)));
    }
}
