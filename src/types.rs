//! Wire records exchanged with the movie API.
//!
//! DESIGN
//! ======
//! Field names follow the API's PascalCase JSON (`Username`, `FavoriteMovies`,
//! `_id`). Shapes are parsed here, at the boundary, so the rest of the crate
//! never touches untyped payloads. Lenient deserializers accept the handful of
//! representations the server is known to emit for dates and years.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeSet;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

// =============================================================================
// CATALOG
// =============================================================================

/// A movie as listed by `GET /movies`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Server-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Genre")]
    pub genre: Genre,
    #[serde(rename = "Director")]
    pub director: Director,
    /// Poster image URL, when the catalog provides one.
    #[serde(rename = "ImagePath", default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(rename = "Featured", default)]
    pub featured: bool,
}

/// Genre metadata, embedded in a movie or returned by `GET /movies/genre/{name}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description", default)]
    pub description: String,
}

/// Director metadata, embedded in a movie or returned by `GET /movies/directors/{name}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Director {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Bio", default)]
    pub bio: String,
    #[serde(rename = "Birth", default, deserialize_with = "deserialize_year", skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(rename = "Death", default, deserialize_with = "deserialize_year", skip_serializing_if = "Option::is_none")]
    pub death_year: Option<i32>,
}

// =============================================================================
// ACCOUNT
// =============================================================================

/// A user profile as returned by `GET /users/{username}` and the auth endpoints.
///
/// The password hash some deployments echo back is ignored on purpose: it is
/// never deserialized, so it never reaches local storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Unique, immutable account name.
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        rename = "Birthday",
        default,
        deserialize_with = "deserialize_optional_date",
        serialize_with = "serialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub birthday: Option<Date>,
    /// Identifiers of favorited movies. Order carries no meaning.
    #[serde(rename = "FavoriteMovies", default)]
    pub favorite_movie_ids: BTreeSet<String>,
}

impl UserProfile {
    /// Whether `movie_id` is among this user's favorites.
    #[must_use]
    pub fn is_favorite(&self, movie_id: &str) -> bool {
        self.favorite_movie_ids.contains(movie_id)
    }
}

/// Body of `POST /users`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Registration {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password")]
    pub password: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(
        rename = "Birthday",
        serialize_with = "serialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub birthday: Option<Date>,
}

/// Body of `POST /login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password")]
    pub password: String,
}

/// Response of `POST /login`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Body of `PUT /users/{username}`. Absent fields are left unchanged server-side.
///
/// `current_password` authorizes the change and is sent as `Password`; the
/// client refuses to send an update without it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(rename = "Email", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        rename = "Birthday",
        serialize_with = "serialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub birthday: Option<Date>,
    #[serde(rename = "Password", skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    #[serde(rename = "NewPassword", skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

impl ProfileUpdate {
    /// The current password, if one was supplied and is not blank.
    #[must_use]
    pub fn current_password(&self) -> Option<&str> {
        self.current_password.as_deref().filter(|p| !p.trim().is_empty())
    }
}

/// Acknowledgement for calls whose response body callers do not rely on.
#[derive(Clone, Debug, PartialEq)]
pub struct Ack {
    pub status: u16,
    /// Parsed JSON body; plain text is kept as a JSON string, an empty body is `null`.
    pub body: serde_json::Value,
}

// =============================================================================
// DATES
// =============================================================================

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// # Errors
///
/// Returns a description of the rejected input when neither form matches.
pub fn parse_date(raw: &str) -> Result<Date, String> {
    let raw = raw.trim();
    if let Ok(date) = Date::parse(raw, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(ts) = time::OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(ts.date());
    }
    // Some servers emit `YYYY-MM-DDTHH:MM:SS` without an offset.
    if let Some(prefix) = raw.get(..10)
        && let Ok(date) = Date::parse(prefix, DATE_FORMAT)
    {
        return Ok(date);
    }
    Err(format!("invalid date '{raw}' (expected YYYY-MM-DD)"))
}

/// Render a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day()))
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_date(&raw).map(Some).map_err(D::Error::custom),
    }
}

#[allow(clippy::ref_option)]
fn serialize_optional_date<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(date) => serializer.serialize_str(&format_date(*date)),
        None => serializer.serialize_none(),
    }
}

fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(number)) => {
            let year = number
                .as_i64()
                .ok_or_else(|| D::Error::custom("expected integer year"))?;
            i32::try_from(year)
                .map(Some)
                .map_err(|_| D::Error::custom(format!("year {year} out of range")))
        }
        Some(serde_json::Value::String(raw)) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.get(..4)
                .and_then(|y| y.parse::<i32>().ok())
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid year '{raw}'")))
        }
        Some(_) => Err(D::Error::custom("expected year as number or string")),
    }
}
