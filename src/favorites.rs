//! Favorites views: the profile page list and the catalog with favorite marks.
//!
//! SYSTEM CONTEXT
//! ==============
//! A profile stores only movie ids; titles and metadata come from the
//! catalog. The two are fetched independently, so they can drift. Ids the
//! catalog no longer resolves are dropped from the rendered list and reported
//! through `missing` plus a notice, never as a hard failure.

#[cfg(test)]
#[path = "favorites_test.rs"]
mod favorites_test;

use std::collections::BTreeSet;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::notice::{self, Notice};
use crate::types::{Movie, UserProfile};

pub const PARTIAL_FAVORITES: &str = "Some favorite movies could not be loaded.";
pub const FAVORITES_FAILED: &str = "Failed to load favorite movies.";
pub const USER_DATA_FAILED: &str = "Failed to load user data.";
pub const CATALOG_FAILED: &str = "Failed to load movies.";

/// Favorite ids resolved against the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesView {
    /// Resolved movies, in catalog order.
    pub movies: Vec<Movie>,
    /// Ids with no catalog entry.
    pub missing: Vec<String>,
}

impl FavoritesView {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Match `ids` against `catalog`.
#[must_use]
pub fn resolve(ids: &BTreeSet<String>, catalog: &[Movie]) -> FavoritesView {
    let movies: Vec<Movie> = catalog.iter().filter(|m| ids.contains(&m.id)).cloned().collect();
    let found: BTreeSet<&str> = movies.iter().map(|m| m.id.as_str()).collect();
    let missing = ids.iter().filter(|id| !found.contains(id.as_str())).cloned().collect();
    FavoritesView { movies, missing }
}

// =============================================================================
// PROFILE VIEW
// =============================================================================

/// Everything the profile page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    /// Freshly fetched profile (not written back to the session).
    pub profile: UserProfile,
    pub favorites: FavoritesView,
    /// Set when favorites could only be partially loaded.
    pub notice: Option<Notice>,
}

impl ProfileView {
    /// Remove `movie_id` from the user's favorites and from this view.
    ///
    /// # Errors
    ///
    /// Returns an error notice if the server call fails; the view is unchanged.
    pub async fn remove_favorite(&mut self, client: &ApiClient, movie_id: &str) -> Result<Notice, Notice> {
        match client.remove_favorite(&self.profile.username, movie_id).await {
            Ok(_) => {
                self.profile.favorite_movie_ids.remove(movie_id);
                self.favorites.movies.retain(|m| m.id != movie_id);
                self.favorites.missing.retain(|id| id != movie_id);
                Ok(Notice::info("Movie removed from favorites", notice::SHORT))
            }
            Err(_) => Err(Notice::error("Failed to remove movie from favorites.", notice::MEDIUM)),
        }
    }
}

/// Load the signed-in user's profile and resolve their favorites.
///
/// # Errors
///
/// Returns an error notice when there is no session or the profile fetch
/// fails. A catalog failure still yields the profile, with an empty list.
pub async fn load_profile_view(client: &ApiClient) -> Result<ProfileView, Notice> {
    let Some(stored) = client.session().profile() else {
        return Err(Notice::error(USER_DATA_FAILED, notice::MEDIUM));
    };
    let profile = client
        .get_user(&stored.username)
        .await
        .map_err(|_| Notice::error(USER_DATA_FAILED, notice::MEDIUM))?;

    if profile.favorite_movie_ids.is_empty() {
        return Ok(ProfileView { profile, favorites: FavoritesView::default(), notice: None });
    }

    match client.list_movies().await {
        Ok(catalog) => {
            let favorites = resolve(&profile.favorite_movie_ids, &catalog);
            let notice = (!favorites.is_complete()).then(|| {
                tracing::warn!(missing = ?favorites.missing, "favorites reference unknown movies");
                Notice::error(PARTIAL_FAVORITES, notice::MEDIUM)
            });
            Ok(ProfileView { profile, favorites, notice })
        }
        Err(_) => Ok(ProfileView {
            profile,
            favorites: FavoritesView::default(),
            notice: Some(Notice::error(FAVORITES_FAILED, notice::MEDIUM)),
        }),
    }
}

// =============================================================================
// CATALOG VIEW
// =============================================================================

/// One card in the catalog listing.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub movie: Movie,
    pub favorite: bool,
}

/// The catalog plus the signed-in user's current favorite ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogView {
    pub entries: Vec<CatalogEntry>,
    pub favorite_ids: BTreeSet<String>,
}

impl CatalogView {
    fn new(catalog: Vec<Movie>, favorite_ids: BTreeSet<String>) -> Self {
        let entries = catalog
            .into_iter()
            .map(|movie| {
                let favorite = favorite_ids.contains(&movie.id);
                CatalogEntry { movie, favorite }
            })
            .collect();
        Self { entries, favorite_ids }
    }

    #[must_use]
    pub fn find(&self, movie_id: &str) -> Option<&Movie> {
        self.entries.iter().map(|e| &e.movie).find(|m| m.id == movie_id)
    }

    /// Re-derive each entry's mark after `favorite_ids` changed.
    pub fn refresh_marks(&mut self) {
        for entry in &mut self.entries {
            entry.favorite = self.favorite_ids.contains(&entry.movie.id);
        }
    }
}

/// Fetch the catalog and the user's favorites concurrently.
///
/// A failed or skipped profile fetch (no session) leaves every mark unset.
///
/// # Errors
///
/// Returns an error notice if the catalog cannot be loaded.
pub async fn catalog_view(client: &ApiClient) -> Result<CatalogView, Notice> {
    let username = client.session().profile().map(|p| p.username);
    let profile_fetch = async {
        match &username {
            Some(name) => client.get_user(name).await.map(Some),
            None => Ok::<_, ApiError>(None),
        }
    };
    let (catalog, profile) = tokio::join!(client.list_movies(), profile_fetch);

    let catalog = catalog.map_err(|_| Notice::error(CATALOG_FAILED, notice::MEDIUM))?;
    let favorite_ids = match profile {
        Ok(Some(profile)) => profile.favorite_movie_ids,
        Ok(None) => BTreeSet::new(),
        Err(e) => {
            tracing::warn!(error = %e, "favorites unavailable; showing catalog without marks");
            BTreeSet::new()
        }
    };
    Ok(CatalogView::new(catalog, favorite_ids))
}
