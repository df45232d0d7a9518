use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use myflix::actions::{self, ProfileEdit};
use myflix::storage::FileStorage;
use myflix::types::{Credentials, Registration, parse_date};
use myflix::{ApiClient, ApiError, ClientConfig, ConfigError, Notice, SessionStore, StorageError, favorites};
use serde::Serialize;
use serde_json::Value;
use time::Date;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid JSON output: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{0}")]
    Notice(String),
    #[error("refusing to delete account without --yes")]
    Unconfirmed,
    #[error("movie `{0}` not found in catalog")]
    UnknownMovie(String),
}

impl From<Notice> for CliError {
    fn from(notice: Notice) -> Self {
        Self::Notice(notice.message)
    }
}

#[derive(Parser, Debug)]
#[command(name = "myflix", about = "Browse the movie catalog and manage your account")]
struct Cli {
    /// Overrides `MYFLIX_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Overrides `MYFLIX_STORAGE_DIR`.
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long, env = "MYFLIX_PASSWORD")]
        password: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_parser = parse_date)]
        birthday: Option<Date>,
    },
    /// Log in and store the session.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "MYFLIX_PASSWORD")]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Print the stored profile snapshot.
    Whoami,
    Movies(MoviesCommand),
    Director {
        name: String,
    },
    Genre {
        name: String,
    },
    Profile(ProfileCommand),
    Favorites(FavoritesCommand),
}

#[derive(Args, Debug)]
struct MoviesCommand {
    #[command(subcommand)]
    command: MoviesSubcommand,
}

#[derive(Subcommand, Debug)]
enum MoviesSubcommand {
    List,
    Show { title: String },
    /// List movies with the signed-in user's favorites marked.
    Catalog,
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    /// Profile and resolved favorites.
    Show,
    Update {
        #[arg(long)]
        email: Option<String>,
        #[arg(long, value_parser = parse_date)]
        birthday: Option<Date>,
        #[arg(long, env = "MYFLIX_PASSWORD")]
        current_password: Option<String>,
        #[arg(long)]
        new_password: Option<String>,
    },
    Delete {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct FavoritesCommand {
    #[command(subcommand)]
    command: FavoritesSubcommand,
}

#[derive(Subcommand, Debug)]
enum FavoritesSubcommand {
    List,
    Add { movie_id: String },
    Remove { movie_id: String },
    Toggle { movie_id: String },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let client_config = ClientConfig::resolve(cli.api_url.as_deref(), cli.storage_dir.as_deref())?;

    let storage = FileStorage::for_origin(&client_config.storage_dir, &client_config.base_url);
    let session = SessionStore::new(Arc::new(storage));
    let client = ApiClient::from_config(&client_config, session)?;

    match cli.command {
        Command::Register { username, password, email, birthday } => {
            let registration = Registration { username, password, email, birthday };
            let (profile, notice) = actions::register(&client, &registration).await?;
            report(&notice);
            print_json(&profile)
        }
        Command::Login { username, password } => {
            let (session, notice) = actions::login(&client, &Credentials { username, password }).await?;
            report(&notice);
            print_json(&session.user)
        }
        Command::Logout => {
            actions::logout(&client)?;
            eprintln!("Logged out");
            Ok(())
        }
        Command::Whoami => match client.session().profile() {
            Some(profile) => print_json(&profile),
            None => Err(CliError::Notice(actions::NOT_SIGNED_IN.to_owned())),
        },
        Command::Movies(movies) => run_movies(&client, movies).await,
        Command::Director { name } => print_json(&client.get_director(&name).await?),
        Command::Genre { name } => print_json(&client.get_genre(&name).await?),
        Command::Profile(profile) => run_profile(&client, profile).await,
        Command::Favorites(favorites) => run_favorites(&client, favorites).await,
    }
}

async fn run_movies(client: &ApiClient, movies: MoviesCommand) -> Result<(), CliError> {
    match movies.command {
        MoviesSubcommand::List => print_json(&client.list_movies().await?),
        MoviesSubcommand::Show { title } => print_json(&client.get_movie(&title).await?),
        MoviesSubcommand::Catalog => {
            let view = favorites::catalog_view(client).await?;
            let rows: Vec<Value> = view
                .entries
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "id": entry.movie.id,
                        "title": entry.movie.title,
                        "genre": entry.movie.genre.name,
                        "director": entry.movie.director.name,
                        "favorite": entry.favorite,
                    })
                })
                .collect();
            print_json(&rows)
        }
    }
}

async fn run_profile(client: &ApiClient, profile: ProfileCommand) -> Result<(), CliError> {
    match profile.command {
        ProfileSubcommand::Show => {
            let view = favorites::load_profile_view(client).await?;
            if let Some(notice) = &view.notice {
                report(notice);
            }
            print_json(&serde_json::json!({
                "profile": view.profile,
                "favorites": view.favorites.movies,
                "missing": view.favorites.missing,
            }))
        }
        ProfileSubcommand::Update { email, birthday, current_password, new_password } => {
            let edit = ProfileEdit { email, birthday, current_password, new_password };
            let (updated, notice) = actions::update_profile(client, &edit).await?;
            report(&notice);
            print_json(&updated)
        }
        ProfileSubcommand::Delete { yes } => {
            if !yes {
                return Err(CliError::Unconfirmed);
            }
            let ((), notice) = actions::delete_account(client).await?;
            report(&notice);
            Ok(())
        }
    }
}

async fn run_favorites(client: &ApiClient, command: FavoritesCommand) -> Result<(), CliError> {
    match command.command {
        FavoritesSubcommand::List => {
            let view = favorites::load_profile_view(client).await?;
            if let Some(notice) = &view.notice {
                report(notice);
            }
            print_json(&view.favorites.movies)
        }
        FavoritesSubcommand::Add { movie_id } => {
            let username = signed_in_username(client)?;
            let ack = client.add_favorite(&username, &movie_id).await?;
            print_json(&ack.body)
        }
        FavoritesSubcommand::Remove { movie_id } => {
            let mut view = favorites::load_profile_view(client).await?;
            let notice = view.remove_favorite(client, &movie_id).await?;
            report(&notice);
            print_json(&view.favorites.movies)
        }
        FavoritesSubcommand::Toggle { movie_id } => {
            let mut view = favorites::catalog_view(client).await?;
            let movie = view.find(&movie_id).cloned().ok_or(CliError::UnknownMovie(movie_id))?;
            let (favorite, notice) = actions::toggle_favorite(client, &movie, &mut view.favorite_ids).await?;
            report(&notice);
            print_json(&serde_json::json!({ "id": movie.id, "favorite": favorite }))
        }
    }
}

fn signed_in_username(client: &ApiClient) -> Result<String, CliError> {
    client
        .session()
        .profile()
        .map(|p| p.username)
        .ok_or_else(|| CliError::Notice(actions::NOT_SIGNED_IN.to_owned()))
}

fn report(notice: &Notice) {
    eprintln!("{notice}");
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
