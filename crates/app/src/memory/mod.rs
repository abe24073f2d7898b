//! In-process record store.
//!
//! [`MemoryStore`] implements every repository trait over one mutex-guarded set of
//! tables. Each operation takes the lock once, so conditional writes are atomic in
//! the same way a single `UPDATE ... WHERE version = $n` statement is.

use std::collections::BTreeMap;

use async_trait::async_trait;
use jiff::Timestamp;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    auth::{NewToken, TokenDigest, TokenScope, TokensRepository},
    domain::{
        movies::{
            MoviesRepository,
            data::NewMovie,
            records::{MovieId, MovieRecord},
        },
        users::{
            UsersRepository,
            data::NewUserRecord,
            password::Password,
            records::{UserId, UserRecord},
        },
    },
    permissions::{PermissionCode, PermissionSet, PermissionsRepository},
    store::StoreError,
    versioning::{Version, VersionedStore},
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    last_user_id: i64,
    users: BTreeMap<i64, UserRecord>,
    tokens: Vec<NewToken>,
    grants: FxHashMap<i64, FxHashSet<PermissionCode>>,
    last_movie_id: i64,
    movies: BTreeMap<i64, MovieRecord>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|user| Some(user.id.into_i64()) != except && user.email.eq_ignore_ascii_case(email))
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.tables.lock().users.len()
    }

    /// Digests of every stored token, oldest first.
    #[must_use]
    pub fn stored_token_digests(&self) -> Vec<TokenDigest> {
        self.tables.lock().tokens.iter().map(|token| token.digest).collect()
    }
}

/// Stored users never keep a plaintext password.
fn at_rest(user: &UserRecord) -> UserRecord {
    UserRecord {
        password: Password::from_hash(user.password.hash().unwrap_or_default().to_string()),
        ..user.clone()
    }
}

#[async_trait]
impl UsersRepository for MemoryStore {
    async fn insert_user(&self, user: &NewUserRecord) -> Result<UserRecord, StoreError> {
        let mut tables = self.tables.lock();

        if tables.email_taken(&user.email, None) {
            return Err(StoreError::AlreadyExists);
        }

        tables.last_user_id += 1;

        let record = UserRecord {
            id: UserId::from_i64(tables.last_user_id),
            created_at: Timestamp::now(),
            name: user.name.clone(),
            email: user.email.clone(),
            password: Password::from_hash(user.password_hash.clone()),
            activated: user.activated,
            version: Version::INITIAL,
        };

        tables.users.insert(record.id.into_i64(), record.clone());

        Ok(record)
    }

    async fn get_user(&self, user: UserId) -> Result<UserRecord, StoreError> {
        self.tables
            .lock()
            .users
            .get(&user.into_i64())
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, StoreError> {
        self.tables
            .lock()
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_user_by_token(
        &self,
        digest: &TokenDigest,
        scope: TokenScope,
        now: Timestamp,
    ) -> Result<UserRecord, StoreError> {
        let tables = self.tables.lock();

        tables
            .tokens
            .iter()
            .find(|token| token.digest == *digest && token.scope == scope && token.expires_at > now)
            .and_then(|token| tables.users.get(&token.user_id.into_i64()))
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl VersionedStore<UserRecord> for MemoryStore {
    async fn write_if_version_matches(
        &self,
        record: &UserRecord,
        expected: Version,
    ) -> Result<Option<Version>, StoreError> {
        let mut tables = self.tables.lock();
        let id = record.id.into_i64();

        if !tables.users.get(&id).is_some_and(|stored| stored.version == expected) {
            return Ok(None);
        }

        if tables.email_taken(&record.email, Some(id)) {
            return Err(StoreError::AlreadyExists);
        }

        let next = expected.next();

        tables.users.insert(
            id,
            UserRecord {
                version: next,
                ..at_rest(record)
            },
        );

        Ok(Some(next))
    }
}

#[async_trait]
impl TokensRepository for MemoryStore {
    async fn insert_token(&self, token: &NewToken) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();

        if !tables.users.contains_key(&token.user_id.into_i64()) {
            return Err(StoreError::NotFound);
        }

        tables.tokens.push(token.clone());

        Ok(())
    }

    async fn delete_tokens_for_user(
        &self,
        scope: TokenScope,
        user: UserId,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock();
        let before = tables.tokens.len();

        tables
            .tokens
            .retain(|token| !(token.scope == scope && token.user_id == user));

        Ok(u64::try_from(before - tables.tokens.len()).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl PermissionsRepository for MemoryStore {
    async fn permissions_for_user(&self, user: UserId) -> Result<PermissionSet, StoreError> {
        Ok(self
            .tables
            .lock()
            .grants
            .get(&user.into_i64())
            .map(|codes| codes.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn grant_permissions(
        &self,
        user: UserId,
        codes: &[PermissionCode],
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock();
        let granted = tables.grants.entry(user.into_i64()).or_default();

        let added = codes
            .iter()
            .filter(|code| PermissionCode::KNOWN.contains(code))
            .filter(|code| granted.insert((*code).clone()))
            .count();

        Ok(u64::try_from(added).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl MoviesRepository for MemoryStore {
    async fn insert_movie(&self, movie: &NewMovie) -> Result<MovieRecord, StoreError> {
        let mut tables = self.tables.lock();

        tables.last_movie_id += 1;

        let record = MovieRecord {
            id: MovieId::from_i64(tables.last_movie_id),
            created_at: Timestamp::now(),
            title: movie.title.clone(),
            year: movie.year,
            runtime: movie.runtime,
            genres: movie.genres.clone(),
            version: Version::INITIAL,
        };

        tables.movies.insert(record.id.into_i64(), record.clone());

        Ok(record)
    }

    async fn get_movie(&self, movie: MovieId) -> Result<MovieRecord, StoreError> {
        self.tables
            .lock()
            .movies
            .get(&movie.into_i64())
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn delete_movie(&self, movie: MovieId) -> Result<u64, StoreError> {
        let removed = self.tables.lock().movies.remove(&movie.into_i64());

        Ok(u64::from(removed.is_some()))
    }
}

#[async_trait]
impl VersionedStore<MovieRecord> for MemoryStore {
    async fn write_if_version_matches(
        &self,
        record: &MovieRecord,
        expected: Version,
    ) -> Result<Option<Version>, StoreError> {
        let mut tables = self.tables.lock();

        match tables.movies.get_mut(&record.id.into_i64()) {
            Some(stored) if stored.version == expected => {
                let next = expected.next();

                *stored = MovieRecord {
                    version: next,
                    ..record.clone()
                };

                Ok(Some(next))
            }
            Some(_) | None => Ok(None),
        }
    }
}
