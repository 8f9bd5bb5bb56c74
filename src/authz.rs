//! The authorization engine: pure predicates deciding, for every mutating or
//! visibility-sensitive operation, whether the principal may perform it and
//! which articles it may see. Never mutates state.

use crate::auth::{Identity, Principal};
use crate::error::ApiError;
use crate::models::{NewsArticle, NewsStatus, RoleName};

/// Roles that may moderate content: edit or delete any article, change
/// lifecycle status, and see everything.
pub const ELEVATED: [RoleName; 2] = [RoleName::Admin, RoleName::Moderator];

/// Roles allowed to create articles.
pub const CONTRIBUTORS: [RoleName; 3] = [RoleName::Admin, RoleName::Moderator, RoleName::Author];

/// RoleSet
///
/// A principal's role snapshot. Order-irrelevant, duplicate-free; unknown
/// role names are dropped on construction so that every downstream check
/// works over the closed `RoleName` vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(Vec<RoleName>);

impl RoleSet {
    pub fn new(roles: impl IntoIterator<Item = RoleName>) -> Self {
        let mut set = RoleSet::default();
        for role in roles {
            if !set.0.contains(&role) {
                set.0.push(role);
            }
        }
        set
    }

    /// Builds a set from string literals, silently dropping unknown names.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        RoleSet::new(names.into_iter().filter_map(RoleName::parse))
    }

    pub fn contains(&self, role: RoleName) -> bool {
        self.0.contains(&role)
    }

    /// The one canonical "does the principal hold any of these" helper.
    pub fn has_any(&self, required: &[RoleName]) -> bool {
        required.iter().any(|r| self.0.contains(r))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = RoleName> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<RoleName> for RoleSet {
    fn from_iter<T: IntoIterator<Item = RoleName>>(iter: T) -> Self {
        RoleSet::new(iter)
    }
}

/// Denial
///
/// Machine-distinguishable reasons an action is refused. Converted into the
/// client-visible `ApiError` taxonomy at the handler boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// No principal where one is required.
    Unauthenticated,
    /// The principal lacks a required role; carries the missing capability.
    InsufficientRole(&'static str),
    /// An owner-scoped action attempted on someone else's resource.
    NotOwner(&'static str),
    /// The action is structurally impossible in the current state.
    Conflict(&'static str),
}

impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => {
                ApiError::Unauthenticated("authentication required".to_string())
            }
            Denial::InsufficientRole(capability) => {
                ApiError::Forbidden(format!("insufficient role: {capability}"))
            }
            Denial::NotOwner(capability) => ApiError::Forbidden(format!("not owner: {capability}")),
            Denial::Conflict(reason) => ApiError::Conflict(reason.to_string()),
        }
    }
}

/// ListScope
///
/// The visibility filter applied to bulk article listings, resolved once per
/// request and handed to the repository query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Admins and moderators see everything.
    All,
    /// Anonymous callers and plain readers see the published set.
    PublishedOnly,
    /// Authors see the published set plus their own articles (union).
    PublishedOrOwned(i64),
}

pub fn is_elevated(ident: &Identity) -> bool {
    ident.roles.has_any(&ELEVATED)
}

// --- User registry actions ---

pub fn can_list_users(ident: &Identity) -> Result<(), Denial> {
    if ident.roles.has_any(&ELEVATED) {
        Ok(())
    } else {
        Err(Denial::InsufficientRole(
            "listing users requires admin or moderator",
        ))
    }
}

/// Edit-user gate. Requires a contributor role; non-elevated actors may only
/// target themselves. Role assignments and the ban flag are admin-only
/// regardless of target.
pub fn can_edit_user(
    ident: &Identity,
    target_id: i64,
    touches_roles: bool,
    touches_ban: bool,
) -> Result<(), Denial> {
    if !ident.roles.has_any(&CONTRIBUTORS) {
        return Err(Denial::InsufficientRole(
            "editing users requires admin, moderator or author",
        ));
    }
    if !ident.roles.has_any(&ELEVATED) && ident.user_id != target_id {
        return Err(Denial::NotOwner("users may only edit their own account"));
    }
    if touches_roles && !ident.roles.contains(RoleName::Admin) {
        return Err(Denial::InsufficientRole(
            "only admins may change role assignments",
        ));
    }
    if touches_ban && !ident.roles.contains(RoleName::Admin) {
        return Err(Denial::InsufficientRole(
            "only admins may change ban status",
        ));
    }
    Ok(())
}

pub fn can_delete_user(ident: &Identity) -> Result<(), Denial> {
    if ident.roles.contains(RoleName::Admin) {
        Ok(())
    } else {
        Err(Denial::InsufficientRole("deleting users requires admin"))
    }
}

/// Ban-flag gate: admin only, and never against oneself.
pub fn can_set_ban(ident: &Identity, target_id: i64) -> Result<(), Denial> {
    if !ident.roles.contains(RoleName::Admin) {
        return Err(Denial::InsufficientRole("changing ban status requires admin"));
    }
    if ident.user_id == target_id {
        return Err(Denial::Conflict(
            "you cannot change your own ban status through this action",
        ));
    }
    Ok(())
}

// --- News workflow actions ---

pub fn can_create_news(ident: &Identity) -> Result<(), Denial> {
    if ident.roles.has_any(&CONTRIBUTORS) {
        Ok(())
    } else {
        Err(Denial::InsufficientRole(
            "creating news requires admin, moderator or author",
        ))
    }
}

/// Edit gate: moderators and admins may edit any article, an author only
/// their own. Status-field changes are additionally gated by the workflow
/// engine through `is_elevated`.
pub fn can_edit_news(ident: &Identity, article: &NewsArticle) -> Result<(), Denial> {
    if ident.roles.has_any(&ELEVATED) {
        return Ok(());
    }
    if !ident.roles.contains(RoleName::Author) {
        return Err(Denial::InsufficientRole(
            "editing news requires admin, moderator or author",
        ));
    }
    if article.created_by_user_id != ident.user_id {
        return Err(Denial::NotOwner("authors may only edit their own articles"));
    }
    Ok(())
}

pub fn can_publish_news(ident: &Identity) -> Result<(), Denial> {
    if ident.roles.has_any(&ELEVATED) {
        Ok(())
    } else {
        Err(Denial::InsufficientRole(
            "publishing news requires admin or moderator",
        ))
    }
}

pub fn can_delete_news(ident: &Identity) -> Result<(), Denial> {
    if ident.roles.has_any(&ELEVATED) {
        Ok(())
    } else {
        Err(Denial::InsufficientRole(
            "deleting news requires admin or moderator",
        ))
    }
}

// --- Visibility ---

/// Single-article visibility predicate: published articles are visible to
/// everyone; anything else only to admin/moderator or the article's creator.
pub fn visible(principal: &Principal, status: NewsStatus, owner_id: i64) -> bool {
    if status == NewsStatus::Published {
        return true;
    }
    match principal.identity() {
        None => false,
        Some(ident) => ident.roles.has_any(&ELEVATED) || ident.user_id == owner_id,
    }
}

/// View-by-id gate built on `visible`, mapping the invisible case onto the
/// appropriate denial reason.
pub fn can_view_news(principal: &Principal, article: &NewsArticle) -> Result<(), Denial> {
    if visible(principal, article.status, article.created_by_user_id) {
        return Ok(());
    }
    match principal.identity() {
        None => Err(Denial::Unauthenticated),
        Some(_) => Err(Denial::NotOwner("no access to this article")),
    }
}

/// Resolves the bulk-listing filter for a principal. Authors get the union
/// of the published set and their own articles, not a replacement filter.
pub fn list_scope(principal: &Principal) -> ListScope {
    match principal.identity() {
        None => ListScope::PublishedOnly,
        Some(ident) => {
            if ident.roles.has_any(&ELEVATED) {
                ListScope::All
            } else if ident.roles.contains(RoleName::Author) {
                ListScope::PublishedOrOwned(ident.user_id)
            } else {
                ListScope::PublishedOnly
            }
        }
    }
}
