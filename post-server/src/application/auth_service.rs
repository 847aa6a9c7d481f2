use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use tracing::debug;

use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::infrastructure::jwt::{Claims, JwtService};

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) access_token: String,
}

pub(crate) struct AuthService<R: UserRepository> {
    repo: R,
    jwt: Arc<JwtService>,
}

impl<R: UserRepository> AuthService<R> {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(repo: R, jwt: Arc<JwtService>) -> Self {
        Self { repo, jwt }
    }

    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        if self.repo.find_by_email(&req.email).await?.is_some() {
            return Err(DomainError::Validation {
                field: "email",
                message: "has already been taken",
            });
        }

        let password_hash = self.hash_password(&req.password)?;
        let user = self
            .repo
            .create_user(NewUser {
                name: req.name,
                email: req.email,
                password_hash,
            })
            .await?;

        let access_token = self.issue_token(&user)?;
        Ok(AuthResult { user, access_token })
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let Some(user_creds) = self.repo.find_by_email(&req.email).await? else {
            // same amount of hashing work whether or not the account exists
            let _ = self.verify_password(&req.password, Self::DUMMY_PASSWORD_HASH);
            return Err(DomainError::InvalidCredentials);
        };

        self.verify_password(&req.password, &user_creds.password_hash)?;

        let access_token = self.issue_token(&user_creds.user)?;
        Ok(AuthResult {
            user: user_creds.user,
            access_token,
        })
    }

    /// Verifies the bearer token and rejects tokens revoked by logout.
    pub(crate) async fn authenticate(&self, token: &str) -> Result<Claims, DomainError> {
        let claims = self.jwt.verify_token(token).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            DomainError::Unauthenticated
        })?;

        if self.repo.is_token_revoked(claims.jti).await? {
            return Err(DomainError::Unauthenticated);
        }
        Ok(claims)
    }

    pub(crate) async fn logout(&self, claims: &Claims) -> Result<(), DomainError> {
        let expires_at = claims
            .expires_at()
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        self.repo.revoke_token(claims.jti, expires_at).await
    }

    pub(crate) async fn current_user(&self, user_id: i64) -> Result<User, DomainError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Unauthenticated)
    }

    pub(crate) fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    pub(crate) fn verify_password(
        &self,
        raw_password: &str,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Self::argon2()?
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })?;

        Ok(())
    }

    fn issue_token(&self, user: &User) -> Result<String, DomainError> {
        self.jwt
            .generate_token(user.id, &user.name)
            .map_err(|err| DomainError::Unexpected(err.to_string()))
    }

    fn argon2() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use super::AuthService;
    use crate::data::repositories::in_memory::InMemoryStore;
    use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
    use crate::domain::error::DomainError;
    use crate::domain::user::{LoginRequest, RegisterRequest, User};
    use crate::infrastructure::jwt::JwtService;

    #[derive(Clone)]
    struct FakeUserRepo {
        created_input: Arc<Mutex<Option<NewUser>>>,
        login_credentials: Arc<Mutex<Option<UserCredentials>>>,
        create_user_out: User,
    }

    impl FakeUserRepo {
        fn new(create_user_out: User) -> Self {
            Self {
                created_input: Arc::new(Mutex::new(None)),
                login_credentials: Arc::new(Mutex::new(None)),
                create_user_out,
            }
        }

        fn set_login_credentials(&self, creds: Option<UserCredentials>) {
            *self
                .login_credentials
                .lock()
                .expect("login credentials mutex poisoned") = creds;
        }

        fn take_created_input(&self) -> Option<NewUser> {
            self.created_input
                .lock()
                .expect("created input mutex poisoned")
                .take()
        }
    }

    #[async_trait]
    impl UserRepository for FakeUserRepo {
        async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
            *self
                .created_input
                .lock()
                .expect("created input mutex poisoned") = Some(input);
            Ok(self.create_user_out.clone())
        }

        async fn find_by_email(
            &self,
            _email: &str,
        ) -> Result<Option<UserCredentials>, DomainError> {
            Ok(self
                .login_credentials
                .lock()
                .expect("login credentials mutex poisoned")
                .clone())
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<User>, DomainError> {
            Ok(Some(self.create_user_out.clone()))
        }

        async fn revoke_token(
            &self,
            _jti: Uuid,
            _expires_at: DateTime<Utc>,
        ) -> Result<(), DomainError> {
            Ok(())
        }

        async fn is_token_revoked(&self, _jti: Uuid) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn register_creates_user_and_returns_token() {
        let repo = FakeUserRepo::new(sample_user(1, "John Doe", "john@example.com"));
        let service = AuthService::new(repo.clone(), test_jwt());

        let req = RegisterRequest {
            name: "  John Doe  ".to_string(),
            email: "  JOHN@EXAMPLE.COM  ".to_string(),
            password: "password123".to_string(),
            password_confirmation: "password123".to_string(),
        };

        let result = service.register(req).await.expect("register must succeed");

        assert_eq!(result.user.name, "John Doe");
        assert!(!result.access_token.is_empty());

        let created = repo
            .take_created_input()
            .expect("create_user must be called");
        assert_eq!(created.name, "John Doe");
        assert_eq!(created.email, "john@example.com");
        assert!(created.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn register_rejects_taken_email() {
        let repo = FakeUserRepo::new(sample_user(1, "John Doe", "john@example.com"));
        repo.set_login_credentials(Some(UserCredentials {
            user: sample_user(1, "John Doe", "john@example.com"),
            password_hash: "irrelevant".to_string(),
        }));
        let service = AuthService::new(repo.clone(), test_jwt());

        let req = RegisterRequest {
            name: "Other".to_string(),
            email: "john@example.com".to_string(),
            password: "password123".to_string(),
            password_confirmation: "password123".to_string(),
        };

        let err = service.register(req).await.expect_err("must be rejected");
        assert!(matches!(err, DomainError::Validation { field: "email", .. }));
        assert!(repo.take_created_input().is_none());
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_missing_user() {
        let repo = FakeUserRepo::new(sample_user(1, "John Doe", "john@example.com"));
        repo.set_login_credentials(None);
        let service = AuthService::new(repo, test_jwt());

        let req = LoginRequest {
            email: "john@example.com".to_string(),
            password: "some-password".to_string(),
        };

        let err = service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_wrong_password() {
        let repo = FakeUserRepo::new(sample_user(1, "John Doe", "john@example.com"));
        let service = AuthService::new(repo.clone(), test_jwt());

        let hash = service
            .hash_password("correct-password")
            .expect("hash must be created");
        repo.set_login_credentials(Some(UserCredentials {
            user: sample_user(1, "John Doe", "john@example.com"),
            password_hash: hash,
        }));

        let req = LoginRequest {
            email: "john@example.com".to_string(),
            password: "wrong-password".to_string(),
        };

        let err = service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_token_for_valid_credentials() {
        let repo = FakeUserRepo::new(sample_user(1, "John Doe", "john@example.com"));
        let service = AuthService::new(repo.clone(), test_jwt());

        let hash = service
            .hash_password("correct-password")
            .expect("hash must be created");
        repo.set_login_credentials(Some(UserCredentials {
            user: sample_user(1, "John Doe", "john@example.com"),
            password_hash: hash,
        }));

        let req = LoginRequest {
            email: "john@example.com".to_string(),
            password: "correct-password".to_string(),
        };

        let result = service.login(req).await.expect("login must succeed");
        assert_eq!(result.user.id, 1);
        assert!(!result.access_token.is_empty());
    }

    #[tokio::test]
    async fn logout_revokes_the_presented_token() {
        let store = InMemoryStore::new();
        let service = AuthService::new(store, test_jwt());

        let registered = service
            .register(RegisterRequest {
                name: "Jane Smith".to_string(),
                email: "jane@example.com".to_string(),
                password: "password123".to_string(),
                password_confirmation: "password123".to_string(),
            })
            .await
            .expect("register must succeed");

        let claims = service
            .authenticate(&registered.access_token)
            .await
            .expect("fresh token must authenticate");
        assert_eq!(claims.user_id, registered.user.id);

        service.logout(&claims).await.expect("logout must succeed");

        let err = service
            .authenticate(&registered.access_token)
            .await
            .expect_err("revoked token must be rejected");
        assert!(matches!(err, DomainError::Unauthenticated));
    }

    #[tokio::test]
    async fn authenticate_rejects_garbage() {
        let repo = FakeUserRepo::new(sample_user(1, "John Doe", "john@example.com"));
        let service = AuthService::new(repo, test_jwt());

        let err = service
            .authenticate("not-a-jwt")
            .await
            .expect_err("must be rejected");
        assert!(matches!(err, DomainError::Unauthenticated));
    }

    fn sample_user(id: i64, name: &str, email: &str) -> User {
        let now = Utc::now();
        User::new(id, name.to_string(), email.to_string(), now, now)
            .expect("sample user must be valid")
    }

    fn test_jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new("0123456789abcdef0123456789abcdef", 3600))
    }
}
