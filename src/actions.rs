//! Account flows: what the login, registration, profile, and movie-card
//! screens do with the API client and the session store.
//!
//! Each flow returns the value it produced together with a success notice,
//! or an error notice. None of them retries; a failure leaves local state as
//! it was.

#[cfg(test)]
#[path = "actions_test.rs"]
mod actions_test;

use std::collections::BTreeSet;

use time::Date;

use crate::api::{ApiClient, CURRENT_PASSWORD_REQUIRED};
use crate::error::{ApiError, StorageError};
use crate::notice::{self, Notice};
use crate::session::Session;
use crate::types::{Credentials, Movie, ProfileUpdate, Registration, UserProfile};

/// Value plus success notice, or an error notice.
pub type FlowResult<T> = Result<(T, Notice), Notice>;

pub const NOT_SIGNED_IN: &str = "You are not logged in.";
pub const NO_CHANGES: &str = "No changes detected.";

/// Log in and persist the returned token and profile.
///
/// # Errors
///
/// Returns an error notice if the credentials are rejected or the session cannot be stored.
pub async fn login(client: &ApiClient, credentials: &Credentials) -> FlowResult<Session> {
    let response = client.login(credentials).await.map_err(|e| {
        tracing::error!(username = %credentials.username, error = %e, "login failed");
        Notice::error("Login failed", notice::SHORT)
    })?;
    let session = Session { token: response.token, user: response.user };
    client.session().save(&session).map_err(storage_notice)?;
    Ok((session, Notice::info("User successfully logged in", notice::SHORT)))
}

/// Create an account. Does not sign in.
///
/// # Errors
///
/// Returns an error notice if the server rejects the registration.
pub async fn register(client: &ApiClient, registration: &Registration) -> FlowResult<UserProfile> {
    match client.register(registration).await {
        Ok(profile) => Ok((profile, Notice::info("User registered successfully", notice::SHORT))),
        Err(e) => {
            tracing::error!(username = %registration.username, error = %e, "registration failed");
            Err(Notice::error("Registration failed", notice::SHORT))
        }
    }
}

/// Forget the stored session.
///
/// # Errors
///
/// Returns an error if the store could not be emptied.
pub fn logout(client: &ApiClient) -> Result<(), StorageError> {
    client.session().clear()
}

// =============================================================================
// PROFILE EDIT
// =============================================================================

/// Form input of the profile editor. Unchanged fields may be left as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEdit {
    pub email: Option<String>,
    pub birthday: Option<Date>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Turn an edit into the minimal update payload for `current`.
///
/// Only fields that differ from the stored profile are sent. The current
/// password is always required.
///
/// # Errors
///
/// Returns an error notice when the current password is missing or nothing changed.
pub fn build_update(current: &UserProfile, edit: &ProfileEdit) -> Result<ProfileUpdate, Notice> {
    let Some(password) = non_blank(edit.current_password.as_deref()) else {
        return Err(Notice::error(CURRENT_PASSWORD_REQUIRED, notice::MEDIUM));
    };
    let email = non_blank(edit.email.as_deref())
        .map(str::trim)
        .filter(|e| current.email.as_deref() != Some(*e))
        .map(str::to_owned);
    let birthday = edit.birthday.filter(|b| current.birthday != Some(*b));
    let new_password = non_blank(edit.new_password.as_deref()).map(str::to_owned);

    if email.is_none() && birthday.is_none() && new_password.is_none() {
        return Err(Notice::error(NO_CHANGES, notice::SHORT));
    }
    Ok(ProfileUpdate { email, birthday, current_password: Some(password.to_owned()), new_password })
}

/// Apply `edit` to the signed-in user's profile and store the result.
///
/// # Errors
///
/// Returns an error notice for a missing session, a local validation
/// failure, or a rejected update.
pub async fn update_profile(client: &ApiClient, edit: &ProfileEdit) -> FlowResult<UserProfile> {
    let current = signed_in(client)?;
    let update = build_update(&current, edit)?;
    match client.update_user(&current.username, &update).await {
        Ok(profile) => {
            client.session().replace_profile(&profile).map_err(storage_notice)?;
            Ok((profile, Notice::info("Profile updated successfully.", notice::SHORT)))
        }
        Err(ApiError::Validation(message)) => Err(Notice::error(message, notice::MEDIUM)),
        Err(e) => Err(Notice::error(format!("Failed to update profile: {e}"), notice::LONG)),
    }
}

/// Delete the signed-in account, then clear the session.
///
/// # Errors
///
/// Returns an error notice if there is no session or the deletion fails; the
/// session is kept in that case.
pub async fn delete_account(client: &ApiClient) -> FlowResult<()> {
    let current = signed_in(client)?;
    if let Err(e) = client.delete_user(&current.username).await {
        tracing::error!(username = %current.username, error = %e, "account deletion failed");
        return Err(Notice::error("Failed to delete account.", notice::MEDIUM));
    }
    client.session().clear().map_err(storage_notice)?;
    Ok(((), Notice::info("Account deleted successfully.", notice::SHORT)))
}

// =============================================================================
// FAVORITES
// =============================================================================

/// Add `movie` to favorites, or remove it if already present.
///
/// `favorites` is the caller's local id set; it is updated only on success.
/// Returns whether the movie is a favorite afterwards.
///
/// # Errors
///
/// Returns an error notice if there is no session or the server call fails.
pub async fn toggle_favorite(
    client: &ApiClient,
    movie: &Movie,
    favorites: &mut BTreeSet<String>,
) -> FlowResult<bool> {
    let current = signed_in(client)?;
    if favorites.contains(&movie.id) {
        client
            .remove_favorite(&current.username, &movie.id)
            .await
            .map_err(|_| Notice::error("Failed to remove movie from favorites.", notice::MEDIUM))?;
        favorites.remove(&movie.id);
        let message = format!("{} has been removed from your favorites!", movie.title);
        Ok((false, Notice::info(message, notice::SHORT)))
    } else {
        client
            .add_favorite(&current.username, &movie.id)
            .await
            .map_err(|_| Notice::error("Failed to add movie to favorites.", notice::MEDIUM))?;
        favorites.insert(movie.id.clone());
        let message = format!("{} has been added to your favorites!", movie.title);
        Ok((true, Notice::info(message, notice::SHORT)))
    }
}

fn signed_in(client: &ApiClient) -> Result<UserProfile, Notice> {
    client
        .session()
        .profile()
        .ok_or_else(|| Notice::error(NOT_SIGNED_IN, notice::MEDIUM))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn storage_notice(err: StorageError) -> Notice {
    tracing::error!(error = %err, "session storage failed");
    Notice::error(format!("Could not save session: {err}"), notice::LONG)
}
