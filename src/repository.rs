use crate::authz::ListScope;
use crate::error::ApiError;
use crate::models::{NewUser, NewsArticle, NewsStatus, Role, RoleName, User};
use crate::workflow::NewDraft;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// StoreError
///
/// Failures surfaced by the persistence boundary. Unique-key violations that
/// only show up at commit time (e.g. a race on login) become `Conflict`;
/// everything else stays a database error that is logged and rendered as an
/// opaque internal failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entity not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("entity not found".to_string()),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                ApiError::Internal
            }
        }
    }
}

/// Outcome of the guarded publish transition.
#[derive(Debug)]
pub enum PublishOutcome {
    Published(NewsArticle),
    AlreadyPublished,
    NotFound,
}

/// Repository Trait
///
/// The abstract contract for all persistence operations, shared across the
/// application as `Arc<dyn Repository>`. Handlers interact with the data
/// layer through this trait only, which is what lets the test suite swap in
/// the in-memory implementation.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Creates the schema if it does not exist yet. No-op for stores that
    /// need none.
    async fn init_schema(&self) -> Result<(), StoreError>;

    // --- Role store ---
    async fn list_roles(&self) -> Result<Vec<Role>, StoreError>;
    /// Resolves role ids to catalog rows; ids not present are dropped, not
    /// rejected.
    async fn find_roles_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, StoreError>;
    /// Insert-if-missing; idempotent, used by the bootstrap seeding.
    async fn ensure_role(&self, name: RoleName) -> Result<Role, StoreError>;

    // --- User registry ---
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn insert_user(&self, user: NewUser, roles: Vec<Role>) -> Result<User, StoreError>;
    /// Persists the scalar fields of `user` and, when `roles` is Some,
    /// replaces the role associations -- both inside one transaction so a
    /// partial failure cannot leave the record inconsistent.
    async fn update_user(&self, user: &User, roles: Option<Vec<Role>>) -> Result<User, StoreError>;
    /// Hard delete. Role links cascade; authored articles are orphaned.
    async fn delete_user(&self, id: i64) -> Result<bool, StoreError>;

    // --- News articles ---
    async fn find_article_by_id(&self, id: i64) -> Result<Option<NewsArticle>, StoreError>;
    async fn list_articles(&self, scope: ListScope) -> Result<Vec<NewsArticle>, StoreError>;
    async fn insert_article(
        &self,
        draft: NewDraft,
        created_by: i64,
        now: DateTime<Utc>,
    ) -> Result<NewsArticle, StoreError>;
    /// Full-row write of a previously loaded and workflow-updated article.
    async fn save_article(&self, article: &NewsArticle) -> Result<NewsArticle, StoreError>;
    /// Guarded publish: a single conditional update, so of two concurrent
    /// publishes exactly one succeeds and the other observes AlreadyPublished.
    async fn publish_article(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<PublishOutcome, StoreError>;
    async fn delete_article(&self, id: i64) -> Result<bool, StoreError>;
    /// Bumps the view counter by one. Not deduplicated per viewer.
    async fn increment_views(&self, id: i64) -> Result<(), StoreError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

// --- PostgreSQL Implementation ---

const ARTICLE_COLUMNS: &str = "id, title, body, url, author, created_by_user_id, status, category, \
     tags, created_at, published_at, redacted_at, views";

/// PostgresRepository
///
/// The production implementation, backed by a sqlx connection pool.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_user_roles(&self, user_id: i64) -> Result<Vec<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>(
            "SELECT r.id, r.name FROM roles r \
             JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 ORDER BY r.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}

/// Maps a late-surfacing unique violation (Postgres 23505) to Conflict.
fn map_unique(err: sqlx::Error, message: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::Conflict(message.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn init_schema(&self) -> Result<(), StoreError> {
        let statements = [
            "CREATE TABLE IF NOT EXISTS roles ( \
                id BIGSERIAL PRIMARY KEY, \
                name TEXT NOT NULL UNIQUE \
            )",
            "CREATE TABLE IF NOT EXISTS users ( \
                id BIGSERIAL PRIMARY KEY, \
                login TEXT NOT NULL UNIQUE, \
                fio TEXT, \
                phone TEXT, \
                email TEXT NOT NULL UNIQUE, \
                password TEXT NOT NULL, \
                in_ban BOOLEAN NOT NULL DEFAULT FALSE, \
                created TIMESTAMPTZ NOT NULL DEFAULT NOW() \
            )",
            "CREATE TABLE IF NOT EXISTS user_roles ( \
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE, \
                role_id BIGINT NOT NULL REFERENCES roles(id), \
                PRIMARY KEY (user_id, role_id) \
            )",
            // created_by_user_id carries no foreign key: deleting a user
            // orphans their articles rather than cascading.
            "CREATE TABLE IF NOT EXISTS news ( \
                id BIGSERIAL PRIMARY KEY, \
                title TEXT NOT NULL, \
                body TEXT NOT NULL, \
                url TEXT UNIQUE, \
                author TEXT, \
                created_by_user_id BIGINT NOT NULL, \
                status TEXT NOT NULL DEFAULT 'draft', \
                category TEXT NOT NULL DEFAULT 'live', \
                tags JSONB NOT NULL DEFAULT '[]', \
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
                published_at TIMESTAMPTZ, \
                redacted_at TIMESTAMPTZ, \
                views BIGINT NOT NULL DEFAULT 0 \
            )",
        ];
        for stmt in statements {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        Ok(
            sqlx::query_as::<_, Role>("SELECT id, name FROM roles ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn find_roles_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, StoreError> {
        Ok(
            sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE id = ANY($1) ORDER BY id")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn ensure_role(&self, name: RoleName) -> Result<Role, StoreError> {
        sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name.as_str())
            .execute(&self.pool)
            .await?;
        Ok(
            sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE name = $1")
                .bind(name.as_str())
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, login, fio, phone, email, password, in_ban, created \
             FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;
        match user {
            None => Ok(None),
            Some(mut user) => {
                user.roles = self.load_user_roles(user.id).await?;
                Ok(Some(user))
            }
        }
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, login, fio, phone, email, password, in_ban, created \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match user {
            None => Ok(None),
            Some(mut user) => {
                user.roles = self.load_user_roles(user.id).await?;
                Ok(Some(user))
            }
        }
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users = sqlx::query_as::<_, User>(
            "SELECT id, login, fio, phone, email, password, in_ban, created \
             FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let rows = sqlx::query(
            "SELECT ur.user_id, r.id AS role_id, r.name FROM user_roles ur \
             JOIN roles r ON r.id = ur.role_id ORDER BY r.id",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut by_user: HashMap<i64, Vec<Role>> = HashMap::new();
        for row in rows {
            let user_id: i64 = row.try_get("user_id").map_err(StoreError::Database)?;
            let role_id: i64 = row.try_get("role_id").map_err(StoreError::Database)?;
            let name: String = row.try_get("name").map_err(StoreError::Database)?;
            if let Some(name) = RoleName::parse(&name) {
                by_user
                    .entry(user_id)
                    .or_default()
                    .push(Role { id: role_id, name });
            }
        }
        for user in &mut users {
            user.roles = by_user.remove(&user.id).unwrap_or_default();
        }
        Ok(users)
    }

    async fn insert_user(&self, user: NewUser, roles: Vec<Role>) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut created = sqlx::query_as::<_, User>(
            "INSERT INTO users (login, fio, phone, email, password, in_ban, created) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, login, fio, phone, email, password, in_ban, created",
        )
        .bind(&user.login)
        .bind(&user.fio)
        .bind(&user.phone)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.in_ban)
        .bind(user.created)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique(e, "login or email already taken"))?;

        for role in &roles {
            sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
                .bind(created.id)
                .bind(role.id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        created.roles = roles;
        Ok(created)
    }

    async fn update_user(&self, user: &User, roles: Option<Vec<Role>>) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query_as::<_, User>(
            "UPDATE users SET login = $2, fio = $3, phone = $4, email = $5, \
             password = $6, in_ban = $7 WHERE id = $1 \
             RETURNING id, login, fio, phone, email, password, in_ban, created",
        )
        .bind(user.id)
        .bind(&user.login)
        .bind(&user.fio)
        .bind(&user.phone)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.in_ban)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_unique(e, "login or email already taken"))?;
        let mut updated = updated.ok_or(StoreError::NotFound)?;

        match roles {
            Some(roles) => {
                sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
                    .bind(user.id)
                    .execute(&mut *tx)
                    .await?;
                for role in &roles {
                    sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
                        .bind(user.id)
                        .bind(role.id)
                        .execute(&mut *tx)
                        .await?;
                }
                updated.roles = roles;
            }
            None => {
                updated.roles = user.roles.clone();
            }
        }
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_article_by_id(&self, id: i64) -> Result<Option<NewsArticle>, StoreError> {
        Ok(sqlx::query_as::<_, NewsArticle>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM news WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_articles(&self, scope: ListScope) -> Result<Vec<NewsArticle>, StoreError> {
        const ORDER: &str = "ORDER BY published_at DESC NULLS LAST, created_at DESC";
        let articles = match scope {
            ListScope::All => {
                sqlx::query_as::<_, NewsArticle>(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM news {ORDER}"
                ))
                .fetch_all(&self.pool)
                .await?
            }
            ListScope::PublishedOnly => {
                sqlx::query_as::<_, NewsArticle>(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM news WHERE status = 'published' {ORDER}"
                ))
                .fetch_all(&self.pool)
                .await?
            }
            ListScope::PublishedOrOwned(user_id) => {
                sqlx::query_as::<_, NewsArticle>(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM news \
                     WHERE status = 'published' OR created_by_user_id = $1 {ORDER}"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(articles)
    }

    async fn insert_article(
        &self,
        draft: NewDraft,
        created_by: i64,
        now: DateTime<Utc>,
    ) -> Result<NewsArticle, StoreError> {
        sqlx::query_as::<_, NewsArticle>(&format!(
            "INSERT INTO news (title, body, url, author, created_by_user_id, \
             status, category, tags, created_at, views) \
             VALUES ($1, $2, $3, $4, $5, 'draft', $6, $7, $8, 0) \
             RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(&draft.title)
        .bind(&draft.body)
        .bind(&draft.url)
        .bind(&draft.author)
        .bind(created_by)
        .bind(draft.category.as_str())
        .bind(sqlx::types::Json(&draft.tags))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, "article url already taken"))
    }

    async fn save_article(&self, article: &NewsArticle) -> Result<NewsArticle, StoreError> {
        let saved = sqlx::query_as::<_, NewsArticle>(&format!(
            "UPDATE news SET title = $2, body = $3, url = $4, author = $5, \
             status = $6, category = $7, tags = $8, published_at = $9, redacted_at = $10 \
             WHERE id = $1 RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(article.id)
        .bind(&article.title)
        .bind(&article.body)
        .bind(&article.url)
        .bind(&article.author)
        .bind(article.status.as_str())
        .bind(article.category.as_str())
        .bind(sqlx::types::Json(&article.tags))
        .bind(article.published_at)
        .bind(article.redacted_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique(e, "article url already taken"))?;
        saved.ok_or(StoreError::NotFound)
    }

    async fn publish_article(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<PublishOutcome, StoreError> {
        // Single conditional update: of two concurrent publishes only one
        // matches the status guard.
        let published = sqlx::query_as::<_, NewsArticle>(&format!(
            "UPDATE news SET status = 'published', \
             published_at = COALESCE(published_at, $2), redacted_at = $2 \
             WHERE id = $1 AND status <> 'published' \
             RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(article) = published {
            return Ok(PublishOutcome::Published(article));
        }
        let exists = sqlx::query("SELECT 1 FROM news WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        if exists {
            Ok(PublishOutcome::AlreadyPublished)
        } else {
            Ok(PublishOutcome::NotFound)
        }
    }

    async fn delete_article(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn increment_views(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("UPDATE news SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// --- In-Memory Implementation (Test Double) ---

/// MemoryRepository
///
/// Mutex-held maps standing in for the database. Every method mirrors the
/// Postgres semantics -- unique login/email/url, orphaning deletes, the
/// conditional publish guard -- so the HTTP test suite runs hermetically.
#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<MemoryStore>,
}

#[derive(Default)]
struct MemoryStore {
    roles: Vec<Role>,
    users: Vec<User>,
    articles: Vec<NewsArticle>,
    next_role_id: i64,
    next_user_id: i64,
    next_article_id: i64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, MemoryStore> {
        self.inner.lock().expect("memory store poisoned")
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn init_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        Ok(self.store().roles.clone())
    }

    async fn find_roles_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, StoreError> {
        let store = self.store();
        Ok(store
            .roles
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn ensure_role(&self, name: RoleName) -> Result<Role, StoreError> {
        let mut store = self.store();
        if let Some(role) = store.roles.iter().find(|r| r.name == name) {
            return Ok(role.clone());
        }
        store.next_role_id += 1;
        let role = Role {
            id: store.next_role_id,
            name,
        };
        store.roles.push(role.clone());
        Ok(role)
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .store()
            .users
            .iter()
            .find(|u| u.login == login)
            .cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.store().users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.store().users.clone())
    }

    async fn insert_user(&self, user: NewUser, roles: Vec<Role>) -> Result<User, StoreError> {
        let mut store = self.store();
        if store
            .users
            .iter()
            .any(|u| u.login == user.login || u.email == user.email)
        {
            return Err(StoreError::Conflict("login or email already taken".to_string()));
        }
        store.next_user_id += 1;
        let created = User {
            id: store.next_user_id,
            login: user.login,
            fio: user.fio,
            phone: user.phone,
            email: user.email,
            password: user.password,
            in_ban: user.in_ban,
            created: user.created,
            roles,
        };
        store.users.push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, user: &User, roles: Option<Vec<Role>>) -> Result<User, StoreError> {
        let mut store = self.store();
        if store
            .users
            .iter()
            .any(|u| u.id != user.id && (u.login == user.login || u.email == user.email))
        {
            return Err(StoreError::Conflict("login or email already taken".to_string()));
        }
        let existing = store
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(StoreError::NotFound)?;
        existing.login = user.login.clone();
        existing.fio = user.fio.clone();
        existing.phone = user.phone.clone();
        existing.email = user.email.clone();
        existing.password = user.password.clone();
        existing.in_ban = user.in_ban;
        if let Some(roles) = roles {
            existing.roles = roles;
        }
        Ok(existing.clone())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let mut store = self.store();
        let before = store.users.len();
        store.users.retain(|u| u.id != id);
        // Authored articles stay behind with their creator id intact.
        Ok(store.users.len() < before)
    }

    async fn find_article_by_id(&self, id: i64) -> Result<Option<NewsArticle>, StoreError> {
        Ok(self.store().articles.iter().find(|a| a.id == id).cloned())
    }

    async fn list_articles(&self, scope: ListScope) -> Result<Vec<NewsArticle>, StoreError> {
        let store = self.store();
        let mut articles: Vec<NewsArticle> = store
            .articles
            .iter()
            .filter(|a| match scope {
                ListScope::All => true,
                ListScope::PublishedOnly => a.status == NewsStatus::Published,
                ListScope::PublishedOrOwned(user_id) => {
                    a.status == NewsStatus::Published || a.created_by_user_id == user_id
                }
            })
            .cloned()
            .collect();
        articles.sort_by(|a, b| {
            match (a.published_at, b.published_at) {
                (Some(pa), Some(pb)) => pb.cmp(&pa),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(articles)
    }

    async fn insert_article(
        &self,
        draft: NewDraft,
        created_by: i64,
        now: DateTime<Utc>,
    ) -> Result<NewsArticle, StoreError> {
        let mut store = self.store();
        if let Some(url) = &draft.url {
            if store.articles.iter().any(|a| a.url.as_deref() == Some(url)) {
                return Err(StoreError::Conflict("article url already taken".to_string()));
            }
        }
        store.next_article_id += 1;
        let article = NewsArticle {
            id: store.next_article_id,
            title: draft.title,
            body: draft.body,
            url: draft.url,
            author: draft.author,
            created_by_user_id: created_by,
            status: NewsStatus::Draft,
            category: draft.category,
            tags: draft.tags,
            created_at: now,
            published_at: None,
            redacted_at: None,
            views: 0,
        };
        store.articles.push(article.clone());
        Ok(article)
    }

    async fn save_article(&self, article: &NewsArticle) -> Result<NewsArticle, StoreError> {
        let mut store = self.store();
        if let Some(url) = &article.url {
            if store
                .articles
                .iter()
                .any(|a| a.id != article.id && a.url.as_deref() == Some(url))
            {
                return Err(StoreError::Conflict("article url already taken".to_string()));
            }
        }
        let existing = store
            .articles
            .iter_mut()
            .find(|a| a.id == article.id)
            .ok_or(StoreError::NotFound)?;
        // views is excluded: the counter moves only through increment_views.
        let views = existing.views;
        *existing = article.clone();
        existing.views = views;
        Ok(existing.clone())
    }

    async fn publish_article(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<PublishOutcome, StoreError> {
        let mut store = self.store();
        match store.articles.iter_mut().find(|a| a.id == id) {
            None => Ok(PublishOutcome::NotFound),
            Some(article) if article.status == NewsStatus::Published => {
                Ok(PublishOutcome::AlreadyPublished)
            }
            Some(article) => {
                article.status = NewsStatus::Published;
                article.published_at.get_or_insert(now);
                article.redacted_at = Some(now);
                Ok(PublishOutcome::Published(article.clone()))
            }
        }
    }

    async fn delete_article(&self, id: i64) -> Result<bool, StoreError> {
        let mut store = self.store();
        let before = store.articles.len();
        store.articles.retain(|a| a.id != id);
        Ok(store.articles.len() < before)
    }

    async fn increment_views(&self, id: i64) -> Result<(), StoreError> {
        let mut store = self.store();
        if let Some(article) = store.articles.iter_mut().find(|a| a.id == id) {
            article.views += 1;
        }
        Ok(())
    }
}
