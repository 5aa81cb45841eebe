use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use futures::TryStreamExt;
use url::Url;

use spotify_web_api::auth::{Credential, SpotifyTokenEndpoint, TokenManager};
use spotify_web_api::config::Config;
use spotify_web_api::logging::init_tracing;
use spotify_web_api::model::{
    BeforeOrAfterTimestamp, PlaybackContext, PlaybackRequest, PositionOrUriOffset,
};
use spotify_web_api::{Scope, SpotifyApi};

type Api = SpotifyApi<TokenManager<SpotifyTokenEndpoint>>;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "SPOTIFY_WEB_API_CONFIG")]
    config: Option<PathBuf>,

    /// Tracing filter, e.g. `spotify_web_api=debug` (default: warn)
    #[arg(long, global = true, env = "LOG_LEVEL")]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the profile of the current user
    Me,
    /// Print every item of a playlist, following all pages
    PlaylistItems {
        /// Playlist id or uri
        playlist: String,

        /// Items per page
        #[arg(short, long)]
        limit: Option<u32>,

        /// ISO 3166-1 alpha-2 country code
        #[arg(short, long)]
        market: Option<String>,
    },
    /// Print the tracks the current user played recently
    RecentlyPlayed {
        /// Only tracks played before this Unix timestamp in milliseconds
        #[arg(long, conflicts_with = "after")]
        before: Option<i64>,

        /// Only tracks played after this Unix timestamp in milliseconds
        #[arg(long)]
        after: Option<i64>,

        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Print the device and the item that is currently playing
    CurrentlyPlaying {
        /// ISO 3166-1 alpha-2 country code
        #[arg(short, long)]
        market: Option<String>,
    },
    /// Start playback on the active device
    Play {
        /// Album, artist or playlist to play
        #[arg(long, conflicts_with = "uris", required_unless_present = "uris")]
        context_uri: Option<String>,

        /// Tracks or episodes to play
        #[arg(long, num_args = 1..)]
        uris: Vec<String>,

        /// Index of the item to start with
        #[arg(long, conflicts_with = "offset_uri")]
        offset_position: Option<u32>,

        /// Uri of the item to start with
        #[arg(long)]
        offset_uri: Option<String>,

        #[arg(long)]
        position_ms: Option<u32>,

        #[arg(long)]
        device_id: Option<String>,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    if let Commands::Config(config_commands) = &args.command {
        init_tracing(
            "spotify-api",
            None,
            args.log_filter.as_deref().unwrap_or("warn"),
        )?;
        match config_commands {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                println!("{}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        }
        return Ok(());
    }

    let config = {
        if let Some(config) = &args.config {
            Config::from_file(config)
        } else {
            Config::load()
        }
    }
    .wrap_err("Failed to load spotify-web-api config")?;

    let filter = args
        .log_filter
        .clone()
        .or_else(|| config.log_filter.clone())
        .unwrap_or_else(|| "warn".to_string());
    let tracer_provider = init_tracing("spotify-api", config.otlp_endpoint.as_deref(), &filter)?;

    let credential_path = config.credential_path();
    tracing::debug!("Loading credential from {}", credential_path.display());
    let credential = Credential::load(&credential_path)?;

    let mut token_endpoint =
        SpotifyTokenEndpoint::new(config.client_id.clone(), config.client_secret.clone())?;
    if let Some(token_url) = &config.token_url {
        token_endpoint = token_endpoint
            .with_token_url(Url::parse(token_url).wrap_err("Invalid token_url in config")?);
    }
    let manager = Arc::new(TokenManager::new(token_endpoint, credential));

    let mut api = SpotifyApi::new(Arc::clone(&manager));
    if let Some(base_url) = &config.api_base_url {
        api = api.with_base_url(base_url.as_str());
    }

    let result = run(&api, args.command).await;

    // Saved even when the command failed, a refresh may have happened first
    manager
        .snapshot()
        .save(&credential_path)
        .wrap_err("Failed to save refreshed credential")?;

    if let Some(tracer_provider) = tracer_provider {
        tracer_provider
            .shutdown()
            .wrap_err("Failed to shut down tracer provider")?;
    }

    result
}

async fn run(api: &Api, command: Commands) -> Result<()> {
    match command {
        Commands::Me => {
            let user = api.current_user_profile().await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Commands::PlaylistItems {
            playlist,
            limit,
            market,
        } => {
            let first = api
                .playlist_items(&playlist, limit, None, market.as_deref())
                .await?;
            tracing::debug!("Playlist has {:?} items", first.total);

            let mut items = std::pin::pin!(
                api.pages(first, Default::default()).into_item_stream()
            );
            let mut index = 0;
            while let Some(container) = items.try_next().await? {
                match container.track {
                    Some(item) => println!(
                        "{}\t{}\t{}\t{}",
                        index,
                        item.object_type(),
                        item.name(),
                        item.uri().unwrap_or("-")
                    ),
                    None => println!("{}\tunavailable", index),
                }
                index += 1;
            }
        }
        Commands::RecentlyPlayed {
            before,
            after,
            limit,
        } => {
            let reference = match (before, after) {
                (Some(before), _) => Some(BeforeOrAfterTimestamp::before_millis(before)),
                (None, Some(after)) => Some(BeforeOrAfterTimestamp::after_millis(after)),
                (None, None) => None,
            };
            let page = api.recently_played(reference, limit).await?;
            for history in page.items {
                println!("{}\t{}", history.played_at.to_rfc3339(), history.track.name);
            }
            if let Some(cursors) = page.cursors {
                tracing::info!(
                    "Cursors: before={:?} after={:?}",
                    cursors.before,
                    cursors.after
                );
            }
        }
        Commands::CurrentlyPlaying { market } => {
            match api.currently_playing(market.as_deref()).await? {
                Some(context) => {
                    let item = context
                        .item
                        .as_ref()
                        .map(|item| format!("{}\t{}", item.object_type(), item.name()))
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{}\t{}\t{}",
                        context.device.name,
                        if context.is_playing { "playing" } else { "paused" },
                        item
                    );
                    tracing::debug!("Disallowed actions: {:?}", context.disallowed_actions);
                }
                None => println!("No active device"),
            }
        }
        Commands::Play {
            context_uri,
            uris,
            offset_position,
            offset_uri,
            position_ms,
            device_id,
        } => {
            let context = match context_uri {
                Some(context_uri) => PlaybackContext::ContextUri(context_uri),
                None => PlaybackContext::Uris(uris),
            };
            let mut request = PlaybackRequest::new(context);
            if let Some(position) = offset_position {
                request = request.with_offset(PositionOrUriOffset::Position(position));
            } else if let Some(uri) = offset_uri {
                request = request.with_offset(PositionOrUriOffset::Uri(uri));
            }
            if let Some(position_ms) = position_ms {
                request = request.with_position_ms(position_ms);
            }
            api.play(&request, device_id.as_deref())
                .await
                .wrap_err_with(|| {
                    format!(
                        "Failed to start playback (requires the {} scope)",
                        Scope::UserModifyPlaybackState
                    )
                })?;
        }
        Commands::Config(_) => return Err(eyre!("Config commands do not call the API")),
    }

    Ok(())
}
