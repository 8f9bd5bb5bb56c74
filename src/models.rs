use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{FromRow, Row, postgres::PgRow};
use std::fmt;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Closed Vocabularies ---

/// RoleName
///
/// The closed set of role names recognized by the authorization engine.
/// Roles are seeded into the catalog at startup and never change shape at
/// runtime; every role comparison in the codebase goes through this enum
/// rather than ad-hoc string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RoleName {
    Admin,
    Moderator,
    Reader,
    Author,
}

impl RoleName {
    /// Every role, in seeding order.
    pub const ALL: [RoleName; 4] = [
        RoleName::Admin,
        RoleName::Moderator,
        RoleName::Reader,
        RoleName::Author,
    ];

    /// The canonical lowercase literal stored in the database and embedded
    /// in token role snapshots.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "admin",
            RoleName::Moderator => "moderator",
            RoleName::Reader => "reader",
            RoleName::Author => "author",
        }
    }

    pub fn parse(s: &str) -> Option<RoleName> {
        match s {
            "admin" => Some(RoleName::Admin),
            "moderator" => Some(RoleName::Moderator),
            "reader" => Some(RoleName::Reader),
            "author" => Some(RoleName::Author),
            _ => None,
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// NewsStatus
///
/// Lifecycle state of an article. New articles always start in `Draft`;
/// the transition into `Published` is guarded by the workflow engine and
/// stamps `published_at` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum NewsStatus {
    Draft,
    Published,
    Archived,
}

impl NewsStatus {
    pub const ALL: [NewsStatus; 3] = [
        NewsStatus::Draft,
        NewsStatus::Published,
        NewsStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NewsStatus::Draft => "draft",
            NewsStatus::Published => "published",
            NewsStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<NewsStatus> {
        match s {
            "draft" => Some(NewsStatus::Draft),
            "published" => Some(NewsStatus::Published),
            "archived" => Some(NewsStatus::Archived),
            _ => None,
        }
    }
}

/// Category
///
/// The fixed category tag carried by every article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Category {
    Live,
    Ai,
    Science,
    Politics,
    Sport,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Live,
        Category::Ai,
        Category::Science,
        Category::Politics,
        Category::Sport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Live => "live",
            Category::Ai => "ai",
            Category::Science => "science",
            Category::Politics => "politics",
            Category::Sport => "sport",
        }
    }

    pub fn parse(s: &str) -> Option<Category> {
        match s {
            "live" => Some(Category::Live),
            "ai" => Some(Category::Ai),
            "science" => Some(Category::Science),
            "politics" => Some(Category::Politics),
            "sport" => Some(Category::Sport),
            _ => None,
        }
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// Role
///
/// A row of the role catalog (`roles` table). Read-mostly; the catalog is
/// seeded from `RoleName::ALL` at startup and referenced by id in
/// registration/update payloads.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Role {
    pub id: i64,
    pub name: RoleName,
}

impl<'r> FromRow<'r, PgRow> for Role {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let name: String = row.try_get("name")?;
        let name = RoleName::parse(&name).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "name".into(),
            source: format!("unknown role name: {name}").into(),
        })?;
        Ok(Role {
            id: row.try_get("id")?,
            name,
        })
    }
}

/// User
///
/// Canonical user record (`users` table) with its role associations. The
/// password credential is stored opaquely, exactly as given; hashing is the
/// concern of an external collaborator. This struct is internal and never
/// serialized directly -- responses go through `UserResponse`/`UserSummary`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub fio: Option<String>,
    pub phone: Option<String>,
    pub email: String,
    pub password: String,
    pub in_ban: bool,
    pub created: DateTime<Utc>,
    /// Loaded by a second query against the `user_roles` join table.
    #[sqlx(skip)]
    pub roles: Vec<Role>,
}

/// NewUser
///
/// A registration payload ready for insertion, with defaults resolved and
/// the creation timestamp stamped by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub fio: Option<String>,
    pub phone: Option<String>,
    pub email: String,
    pub password: String,
    pub in_ban: bool,
    pub created: DateTime<Utc>,
}

/// NewsArticle
///
/// An article row (`news` table). `published_at` is set on the first
/// transition into Published and never reset; `redacted_at` is stamped on
/// every successful edit; `views` only ever grows.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NewsArticle {
    pub id: i64,
    pub title: String,
    pub body: String,
    /// Optional URL slug, unique across articles.
    pub url: Option<String>,
    /// Free-text author label, independent of the owning user.
    pub author: Option<String>,
    pub created_by_user_id: i64,
    pub status: NewsStatus,
    pub category: Category,
    pub tags: Vec<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub redacted_at: Option<DateTime<Utc>>,
    pub views: i64,
}

/// Manual row mapping: status and category live as lowercase text columns and
/// tags as JSONB, none of which map through the derive.
impl<'r> FromRow<'r, PgRow> for NewsArticle {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = NewsStatus::parse(&status).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".into(),
            source: format!("unknown news status: {status}").into(),
        })?;
        let category: String = row.try_get("category")?;
        let category = Category::parse(&category).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "category".into(),
            source: format!("unknown category: {category}").into(),
        })?;
        let tags: sqlx::types::Json<Vec<String>> = row.try_get("tags")?;

        Ok(NewsArticle {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            body: row.try_get("body")?,
            url: row.try_get("url")?,
            author: row.try_get("author")?,
            created_by_user_id: row.try_get("created_by_user_id")?,
            status,
            category,
            tags: tags.0,
            created_at: row.try_get("created_at")?,
            published_at: row.try_get("published_at")?,
            redacted_at: row.try_get("redacted_at")?,
            views: row.try_get("views")?,
        })
    }
}

// --- Response Schemas (Output) ---

/// UserResponse
///
/// Full user representation returned to admins and to the user themselves.
/// The opaque password credential never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserResponse {
    pub id: i64,
    pub login: String,
    #[serde(rename = "FIO")]
    pub fio: Option<String>,
    pub phone: Option<String>,
    pub email: String,
    pub in_ban: bool,
    #[ts(type = "string")]
    pub created: DateTime<Utc>,
    pub roles: Vec<Role>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse {
            id: u.id,
            login: u.login,
            fio: u.fio,
            phone: u.phone,
            email: u.email,
            in_ban: u.in_ban,
            created: u.created,
            roles: u.roles,
        }
    }
}

/// UserSummary
///
/// Reduced projection served to moderators on the user listing: no login,
/// email or phone -- only what moderation work needs.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserSummary {
    pub id: i64,
    #[serde(rename = "FIO")]
    pub fio: Option<String>,
    pub in_ban: bool,
    #[ts(type = "string")]
    pub created: DateTime<Utc>,
    pub roles: Vec<Role>,
}

impl From<User> for UserSummary {
    fn from(u: User) -> Self {
        UserSummary {
            id: u.id,
            fio: u.fio,
            in_ban: u.in_ban,
            created: u.created,
            roles: u.roles,
        }
    }
}

/// TokenResponse
///
/// Credential issuance response for POST /token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always the literal "bearer".
    pub token_type: String,
}

// --- Request Payloads (Input Schemas) ---

/// LoginForm
///
/// OAuth2 password-grant style form body for POST /token. Field names follow
/// the OAuth2 convention (`username` carries the login).
#[derive(Debug, Clone, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// RegisterUserRequest
///
/// Input payload for the public registration endpoint (POST /users).
/// Role ids that do not exist in the catalog are silently dropped; an empty
/// role set is a valid outcome.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterUserRequest {
    pub login: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "FIO", default)]
    pub fio: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub in_ban: Option<bool>,
    #[serde(default)]
    pub role_ids: Vec<i64>,
}

/// UpdateUserRequest
///
/// Partial update payload for PATCH /users/{id}. Absent fields are left
/// untouched; an explicit null clears the nullable fields (double-Option).
/// `role_ids` and `in_ban` are admin-only and rejected for everyone else
/// before any mutation happens.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateUserRequest {
    #[serde(
        rename = "FIO",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    #[schema(value_type = Option<String>)]
    #[ts(optional, type = "string | null")]
    pub fio: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    #[schema(value_type = Option<String>)]
    #[ts(optional, type = "string | null")]
    pub phone: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_ids: Option<Vec<i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_ban: Option<bool>,
}

/// CreateNewsRequest
///
/// Input payload for POST /news. A `status` field is accepted for shape
/// compatibility but ignored: every article starts life as a Draft.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateNewsRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Lowercase category literal; defaults to "live".
    #[serde(default)]
    pub category: Option<String>,
    /// Ignored on create.
    #[serde(default)]
    pub status: Option<String>,
}

/// UpdateNewsRequest
///
/// Partial update payload for PATCH /news/{id}. Absent fields are left
/// untouched; an explicit null clears the nullable `url` and `author`
/// fields (double-Option).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateNewsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    #[schema(value_type = Option<String>)]
    #[ts(optional, type = "string | null")]
    pub url: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    #[schema(value_type = Option<String>)]
    #[ts(optional, type = "string | null")]
    pub author: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Lowercase category literal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Lowercase status literal; any status change is moderator/admin-only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Distinguishes a missing key (outer None) from an explicit JSON null
/// (Some(None)) during deserialization of nullable update fields.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}
