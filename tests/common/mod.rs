//! In-process fake of the movie API, served by axum on an ephemeral port.
//!
//! Behaves like the real service for the endpoints the client uses: bearer
//! tokens issued at login, idempotent favorite add/remove, password-checked
//! profile updates. Every request's method, path, and `Authorization`
//! header is recorded for assertions.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use myflix::{ApiClient, SessionStore};
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
struct FakeUser {
    password: String,
    email: Option<String>,
    birthday: Option<String>,
    favorites: BTreeSet<String>,
    token: String,
}

#[derive(Default)]
struct FakeState {
    users: HashMap<String, FakeUser>,
    movies: Vec<Value>,
    requests: Vec<Recorded>,
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeApi {
    pub base_url: String,
    state: Shared,
}

impl FakeApi {
    /// Start a server with a three-movie catalog and no users.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState { movies: catalog(), ..FakeState::default() }));
        let app = Router::new()
            .route("/users", post(register))
            .route("/login", post(login))
            .route("/movies", get(list_movies))
            .route("/movies/{title}", get(get_movie))
            .route("/movies/directors/{name}", get(get_director))
            .route("/movies/genre/{name}", get(get_genre))
            .route("/users/{username}", get(get_user).put(update_user).delete(delete_user))
            .route("/users/{username}/movies/{movie_id}", post(add_favorite).delete(remove_favorite))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { base_url: format!("http://{addr}/"), state }
    }

    /// Add an account that logs in with `password` and receives `token`.
    pub fn seed_user(&self, username: &str, password: &str, token: &str) {
        self.state.lock().unwrap().users.insert(
            username.to_owned(),
            FakeUser {
                password: password.to_owned(),
                email: None,
                birthday: None,
                favorites: BTreeSet::new(),
                token: token.to_owned(),
            },
        );
    }

    /// Put an id on a user's favorites directly, bypassing the API.
    pub fn seed_favorite(&self, username: &str, movie_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.users.get_mut(username).unwrap().favorites.insert(movie_id.to_owned());
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    /// A client with a fresh in-memory session pointed at this server.
    pub fn client(&self) -> ApiClient {
        self.client_with(SessionStore::in_memory())
    }

    pub fn client_with(&self, session: SessionStore) -> ApiClient {
        ApiClient::new(self.base_url.parse().unwrap(), session).unwrap()
    }
}

fn catalog() -> Vec<Value> {
    vec![
        json!({
            "_id": "m1",
            "Title": "Inception",
            "Description": "A thief who steals corporate secrets through dreams.",
            "Genre": { "Name": "Sci-Fi", "Description": "Speculative fiction." },
            "Director": { "Name": "Christopher Nolan", "Bio": "British-American filmmaker.", "Birth": "1970" },
            "Featured": true
        }),
        json!({
            "_id": "m2",
            "Title": "Heat",
            "Description": "A group of professional bank robbers.",
            "Genre": { "Name": "Crime", "Description": "Crime fiction." },
            "Director": { "Name": "Michael Mann", "Bio": "American director.", "Birth": 1943 }
        }),
        json!({
            "_id": "m3",
            "Title": "AC/DC: Live",
            "Description": "Concert film.",
            "Genre": { "Name": "Music", "Description": "Concert films." },
            "Director": { "Name": "David Mallet", "Bio": "British director.", "Birth": "1945" }
        }),
    ]
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

async fn record(State(state): State<Shared>, req: Request, next: Next) -> Response {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    state.lock().unwrap().requests.push(Recorded {
        method: req.method().to_string(),
        path: req.uri().path().to_owned(),
        authorization,
    });
    next.run(req).await
}

fn authorized(state: &FakeState, headers: &HeaderMap) -> bool {
    let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    else {
        return false;
    };
    !token.is_empty() && state.users.values().any(|u| u.token == token)
}

fn unauthorized() -> Response {
    StatusCode::UNAUTHORIZED.into_response()
}

fn user_json(username: &str, user: &FakeUser) -> Value {
    let mut value = json!({
        "_id": format!("id-{username}"),
        "Username": username,
        "Password": "$2b$10$not-a-real-hash",
        "FavoriteMovies": user.favorites,
    });
    if let Some(email) = &user.email {
        value["Email"] = json!(email);
    }
    if let Some(birthday) = &user.birthday {
        value["Birthday"] = json!(format!("{birthday}T00:00:00.000Z"));
    }
    value
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    let Some(username) = body["Username"].as_str().filter(|u| !u.is_empty()).map(str::to_owned) else {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "errors": [{ "msg": "Username is required" }] })))
            .into_response();
    };
    if state.users.contains_key(&username) {
        return (StatusCode::BAD_REQUEST, format!("{username} already exists")).into_response();
    }
    let user = FakeUser {
        password: body["Password"].as_str().unwrap_or_default().to_owned(),
        email: body["Email"].as_str().map(str::to_owned),
        birthday: body["Birthday"].as_str().map(str::to_owned),
        favorites: BTreeSet::new(),
        token: format!("token-{username}"),
    };
    let json = user_json(&username, &user);
    state.users.insert(username, user);
    (StatusCode::CREATED, Json(json)).into_response()
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let state = state.lock().unwrap();
    let username = body["Username"].as_str().unwrap_or_default();
    let password = body["Password"].as_str().unwrap_or_default();
    match state.users.get(username) {
        Some(user) if user.password == password => {
            let minimal = json!({ "Username": username, "FavoriteMovies": user.favorites });
            Json(json!({ "user": minimal, "token": user.token })).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, Json(json!({ "message": "Incorrect username or password." }))).into_response(),
    }
}

async fn list_movies(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    Json(state.movies.clone()).into_response()
}

async fn get_movie(State(state): State<Shared>, headers: HeaderMap, Path(title): Path<String>) -> Response {
    let state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    match state.movies.iter().find(|m| m["Title"] == title.as_str() || m["_id"] == title.as_str()) {
        Some(movie) => Json(movie.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "movie not found" }))).into_response(),
    }
}

async fn get_director(State(state): State<Shared>, headers: HeaderMap, Path(name): Path<String>) -> Response {
    let state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    match state.movies.iter().find(|m| m["Director"]["Name"] == name.as_str()) {
        Some(movie) => Json(movie["Director"].clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Director not found").into_response(),
    }
}

async fn get_genre(State(state): State<Shared>, headers: HeaderMap, Path(name): Path<String>) -> Response {
    let state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    match state.movies.iter().find(|m| m["Genre"]["Name"] == name.as_str()) {
        Some(movie) => Json(movie["Genre"].clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Genre not found").into_response(),
    }
}

async fn get_user(State(state): State<Shared>, headers: HeaderMap, Path(username): Path<String>) -> Response {
    let state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    match state.users.get(&username) {
        Some(user) => Json(user_json(&username, user)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "user not found" }))).into_response(),
    }
}

async fn update_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(username): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let Some(user) = state.users.get_mut(&username) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "user not found" }))).into_response();
    };
    if body["Password"].as_str() != Some(user.password.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Current password is incorrect" }))).into_response();
    }
    if let Some(email) = body["Email"].as_str() {
        user.email = Some(email.to_owned());
    }
    if let Some(birthday) = body["Birthday"].as_str() {
        user.birthday = Some(birthday.to_owned());
    }
    if let Some(new_password) = body["NewPassword"].as_str() {
        user.password = new_password.to_owned();
    }
    Json(user_json(&username, user)).into_response()
}

async fn delete_user(State(state): State<Shared>, headers: HeaderMap, Path(username): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    match state.users.remove(&username) {
        Some(_) => (StatusCode::OK, format!("{username} was deleted.")).into_response(),
        None => (StatusCode::BAD_REQUEST, format!("{username} was not found")).into_response(),
    }
}

async fn add_favorite(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((username, movie_id)): Path<(String, String)>,
) -> Response {
    let mut state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    match state.users.get_mut(&username) {
        Some(user) => {
            user.favorites.insert(movie_id);
            let json = user_json(&username, user);
            Json(json).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "user not found" }))).into_response(),
    }
}

async fn remove_favorite(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((username, movie_id)): Path<(String, String)>,
) -> Response {
    let mut state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    match state.users.get_mut(&username) {
        Some(user) => {
            user.favorites.remove(&movie_id);
            let json = user_json(&username, user);
            Json(json).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "user not found" }))).into_response(),
    }
}
