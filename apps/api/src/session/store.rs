use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{Credentials, ProfileUpdate, Registration, User};
use crate::session::auth::Authenticator;
use crate::session::storage::SessionStorage;

/// Owns the active user and keeps the durable record in step with it.
///
/// Every mutation writes through to storage before the in-memory session
/// changes, so a failed write leaves the previous session in place.
pub struct SessionStore {
    current: Option<User>,
    storage: Arc<dyn SessionStorage>,
    authenticator: Arc<dyn Authenticator>,
}

impl SessionStore {
    /// Restores the persisted session, if any. A missing, unreadable or
    /// corrupt record starts the store anonymous.
    pub async fn open(
        storage: Arc<dyn SessionStorage>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        let current = restore(storage.as_ref()).await;
        match &current {
            Some(user) => info!("Restored session for {} ({})", user.email, user.role()),
            None => info!("Starting without an active session"),
        }
        Self {
            current,
            storage,
            authenticator,
        }
    }

    pub fn current(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub async fn login(&mut self, credentials: &Credentials) -> Result<User, AppError> {
        let user = self.authenticator.authenticate(credentials).await?;
        self.replace(user.clone()).await?;
        info!("Logged in {} as {}", user.email, user.role());
        Ok(user)
    }

    pub async fn register(&mut self, registration: &Registration) -> Result<User, AppError> {
        let user = self.authenticator.register(registration).await?;
        self.replace(user.clone()).await?;
        self.authenticator.commit_registration(&user);
        info!("Registered {} as {}", user.email, user.role());
        Ok(user)
    }

    pub async fn logout(&mut self) {
        if let Some(user) = self.current.take() {
            info!("Logged out {}", user.email);
        }
        if let Err(e) = self.storage.clear().await {
            warn!("Failed to remove persisted session: {e}");
        }
    }

    pub async fn update_profile(&mut self, update: ProfileUpdate) -> Result<User, AppError> {
        let mut updated = self.current.clone().ok_or(AppError::NoActiveSession)?;
        updated.apply_update(update)?;
        self.replace(updated.clone()).await?;
        self.authenticator.account_updated(&updated);
        info!("Updated profile for {}", updated.email);
        Ok(updated)
    }

    async fn replace(&mut self, user: User) -> Result<(), AppError> {
        let record = serde_json::to_string(&user)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to serialize session: {e}")))?;
        self.storage.save(&record).await?;
        self.current = Some(user);
        Ok(())
    }
}

async fn restore(storage: &dyn SessionStorage) -> Option<User> {
    let record = match storage.load().await {
        Ok(record) => record?,
        Err(e) => {
            warn!("Could not read persisted session, continuing anonymous: {e}");
            return None;
        }
    };
    match serde_json::from_str::<User>(&record) {
        Ok(user) => Some(user),
        Err(e) => {
            warn!("Discarding corrupt session record: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::ids::SequentialGenerator;
    use crate::models::Role;
    use crate::session::auth::LocalAuthenticator;
    use crate::session::storage::MemoryStorage;

    struct FailingStorage;

    #[async_trait]
    impl SessionStorage for FailingStorage {
        async fn load(&self) -> Result<Option<String>, AppError> {
            Err(AppError::Storage("disk on fire".to_string()))
        }
        async fn save(&self, _record: &str) -> Result<(), AppError> {
            Err(AppError::Storage("disk on fire".to_string()))
        }
        async fn clear(&self) -> Result<(), AppError> {
            Err(AppError::Storage("disk on fire".to_string()))
        }
    }

    /// Fails the first save, then behaves like memory.
    #[derive(Default)]
    struct FlakyStorage {
        failed_once: AtomicBool,
        inner: MemoryStorage,
    }

    #[async_trait]
    impl SessionStorage for FlakyStorage {
        async fn load(&self) -> Result<Option<String>, AppError> {
            self.inner.load().await
        }
        async fn save(&self, record: &str) -> Result<(), AppError> {
            if !self.failed_once.swap(true, Ordering::SeqCst) {
                return Err(AppError::Storage("transient".to_string()));
            }
            self.inner.save(record).await
        }
        async fn clear(&self) -> Result<(), AppError> {
            self.inner.clear().await
        }
    }

    fn auth() -> Arc<dyn Authenticator> {
        Arc::new(LocalAuthenticator::new(Arc::new(SequentialGenerator::new())))
    }

    fn creds(email: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: "pw".to_string(),
            role: None,
        }
    }

    fn acme() -> Registration {
        Registration {
            name: Some("Acme".to_string()),
            email: Some("hr@acme.io".to_string()),
            role: Some(Role::Employer),
            company: Some("Acme".to_string()),
        }
    }

    #[tokio::test]
    async fn test_login_persists_and_restores() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = SessionStore::open(storage.clone(), auth()).await;
        assert!(!store.is_authenticated());

        let user = store.login(&creds("a@employer.co")).await.unwrap();
        assert_eq!(user.role(), Role::Employer);
        assert!(storage.load().await.unwrap().is_some());

        let reopened = SessionStore::open(storage, auth()).await;
        assert_eq!(reopened.current(), Some(&user));
    }

    #[tokio::test]
    async fn test_corrupt_record_starts_anonymous() {
        let storage = Arc::new(MemoryStorage::with_record("{not json"));
        let store = SessionStore::open(storage, auth()).await;
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_unreadable_storage_starts_anonymous() {
        let store = SessionStore::open(Arc::new(FailingStorage), auth()).await;
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_record() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = SessionStore::open(storage.clone(), auth()).await;
        store.login(&creds("a@person.co")).await.unwrap();
        store.logout().await;
        assert!(store.current().is_none());
        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_logout_tolerates_storage_failure() {
        let mut store = SessionStore::open(Arc::new(FailingStorage), auth()).await;
        store.logout().await;
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_requires_session() {
        let mut store = SessionStore::open(Arc::new(MemoryStorage::new()), auth()).await;
        let err = store
            .update_profile(ProfileUpdate {
                bio: Some("x".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoActiveSession));
    }

    #[tokio::test]
    async fn test_update_profile_merges_and_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = SessionStore::open(storage.clone(), auth()).await;
        let before = store.login(&creds("a@person.co")).await.unwrap();

        let after = store
            .update_profile(ProfileUpdate {
                bio: Some("x".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(after.bio, "x");
        assert_eq!(after.name, before.name);
        assert_eq!(after.email, before.email);
        assert_eq!(after.location, before.location);

        let persisted: User =
            serde_json::from_str(&storage.load().await.unwrap().unwrap()).unwrap();
        assert_eq!(persisted.bio, "x");
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_session() {
        let mut store = SessionStore::open(Arc::new(FailingStorage), auth()).await;
        let err = store.login(&creds("a@person.co")).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_failed_registration_write_can_be_retried() {
        let mut store = SessionStore::open(Arc::new(FlakyStorage::default()), auth()).await;

        let err = store.register(&acme()).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert!(store.current().is_none());

        let user = store.register(&acme()).await.unwrap();
        assert_eq!(store.current(), Some(&user));

        store.logout().await;
        let back = store.login(&creds("hr@acme.io")).await.unwrap();
        assert_eq!(back.id, user.id);
    }

    #[tokio::test]
    async fn test_profile_edits_survive_logging_back_in() {
        let mut store = SessionStore::open(Arc::new(MemoryStorage::new()), auth()).await;
        let registered = store.register(&acme()).await.unwrap();
        store
            .update_profile(ProfileUpdate {
                bio: Some("We build rockets".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        store.logout().await;
        let back = store.login(&creds("hr@acme.io")).await.unwrap();
        assert_eq!(back.id, registered.id);
        assert_eq!(back.bio, "We build rockets");
        assert_eq!(back.company(), Some("Acme"));
    }
}
