use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use sptfy::{
    cli::{self, BrowseCommand, PlaylistCommand, Providers, ResourceCommand},
    config,
    types::{PlaylistOptions as CreateOptions, SearchOperator, SearchQuery, SearchType},
    warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about="Spotify Web API client with app and user token management",
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Obtain an access token
    Token(TokenOptions),

    /// Search the catalog
    Search(SearchOptions),

    /// Browse categories and new releases
    Browse(BrowseOptions),

    /// Create, read and modify playlists
    Playlist(PlaylistOptions),

    /// Look up an album by id
    Album(AlbumOptions),

    /// Look up an artist by id
    Artist(ArtistOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct TokenOptions {
    #[command(subcommand)]
    pub command: TokenSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TokenSubcommand {
    /// App token from the client-credentials grant
    App,

    /// User token from an interactive login
    User {
        /// Use the authorization-code flow with PKCE instead of the console login
        #[clap(long)]
        pkce: bool,
    },
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Free text to search for
    pub query: Option<String>,

    /// Item type(s) to search; can be repeated
    #[clap(
        long = "type",
        value_parser = parse_search_type,
        action = ArgAction::Append,
        num_args = 1
    )]
    pub types: Vec<SearchType>,

    #[clap(long)]
    pub artist: Option<String>,
    #[clap(long)]
    pub album: Option<String>,
    #[clap(long)]
    pub track: Option<String>,
    #[clap(long)]
    pub playlist: Option<String>,
    #[clap(long)]
    pub year: Option<String>,
    #[clap(long)]
    pub genre: Option<String>,

    /// Exclude results matching this term
    #[clap(long, conflicts_with = "or")]
    pub not: Option<String>,

    /// Also include results matching this term
    #[clap(long)]
    pub or: Option<String>,

    /// Number of results (1-50)
    #[clap(long)]
    pub limit: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct BrowseOptions {
    #[command(subcommand)]
    pub command: BrowseSubcommand,

    /// ISO 3166-1 alpha-2 country code
    #[clap(long, global = true)]
    pub country: Option<String>,

    /// Locale such as `sv_SE`
    #[clap(long, global = true)]
    pub locale: Option<String>,

    /// Number of results (1-50)
    #[clap(long, global = true)]
    pub limit: Option<u32>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum BrowseSubcommand {
    /// List categories
    Categories,
    /// Show one category
    Category { id: String },
    /// Playlists of a category
    CategoryPlaylists { id: String },
    /// Find a playlist of a category by exact name
    CategoryPlaylist { id: String, name: String },
    /// New album releases
    NewReleases,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistOptions {
    #[command(subcommand)]
    pub command: PlaylistSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PlaylistSubcommand {
    /// Create a playlist for the configured user
    Create {
        name: String,
        #[clap(long)]
        public: bool,
        #[clap(long)]
        collaborative: bool,
        #[clap(long)]
        description: Option<String>,
    },
    /// Show a playlist
    Get {
        id: String,
        #[clap(long)]
        market: Option<String>,
    },
    /// List the tracks of a playlist
    Tracks {
        id: String,
        #[clap(long)]
        market: Option<String>,
        #[clap(long)]
        limit: Option<u32>,
    },
    /// Add tracks by URI or name
    Add {
        id: String,
        #[clap(required = true)]
        tracks: Vec<String>,
    },
    /// Remove tracks by URI or name
    Remove {
        id: String,
        #[clap(required = true)]
        tracks: Vec<String>,
    },
    /// Find a playlist id by exact name
    Find { name: String },
}

#[derive(Parser, Debug, Clone)]
pub struct AlbumOptions {
    pub id: String,

    /// List the album's tracks
    #[clap(long)]
    pub tracks: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ArtistOptions {
    pub id: String,

    /// List the artist's albums
    #[clap(long, conflicts_with_all = ["top_tracks", "related"])]
    pub albums: bool,

    /// List the artist's top tracks
    #[clap(long, conflicts_with = "related")]
    pub top_tracks: bool,

    /// List related artists
    #[clap(long)]
    pub related: bool,

    /// Market for top tracks (defaults to US)
    #[clap(long, requires = "top_tracks")]
    pub country: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn parse_search_type(s: &str) -> Result<SearchType, String> {
    s.parse()
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment file. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Token(opt) => match opt.command {
            TokenSubcommand::App => cli::token_app(&Providers::from_config(false)).await,
            TokenSubcommand::User { pkce } => cli::token_user(&Providers::from_config(pkce)).await,
        },

        Command::Search(opt) => {
            let query = SearchQuery {
                text: opt.query,
                artist: opt.artist,
                album: opt.album,
                track: opt.track,
                playlist: opt.playlist,
                year: opt.year,
                genre: opt.genre,
                operator: opt
                    .not
                    .map(|term| (SearchOperator::Not, term))
                    .or_else(|| opt.or.map(|term| (SearchOperator::Or, term))),
            };
            cli::search(&Providers::from_config(false), query, opt.types, opt.limit).await
        }

        Command::Browse(opt) => {
            let command = match opt.command {
                BrowseSubcommand::Categories => BrowseCommand::Categories,
                BrowseSubcommand::Category { id } => BrowseCommand::Category(id),
                BrowseSubcommand::CategoryPlaylists { id } => BrowseCommand::CategoryPlaylists(id),
                BrowseSubcommand::CategoryPlaylist { id, name } => {
                    BrowseCommand::CategoryPlaylist { id, name }
                }
                BrowseSubcommand::NewReleases => BrowseCommand::NewReleases,
            };
            cli::browse(
                &Providers::from_config(false),
                command,
                opt.country,
                opt.locale,
                opt.limit,
            )
            .await
        }

        Command::Playlist(opt) => {
            let command = match opt.command {
                PlaylistSubcommand::Create {
                    name,
                    public,
                    collaborative,
                    description,
                } => PlaylistCommand::Create {
                    name,
                    options: CreateOptions {
                        public,
                        collaborative,
                        description,
                    },
                },
                PlaylistSubcommand::Get { id, market } => PlaylistCommand::Get { id, market },
                PlaylistSubcommand::Tracks { id, market, limit } => {
                    PlaylistCommand::Tracks { id, market, limit }
                }
                PlaylistSubcommand::Add { id, tracks } => PlaylistCommand::Add { id, tracks },
                PlaylistSubcommand::Remove { id, tracks } => PlaylistCommand::Remove { id, tracks },
                PlaylistSubcommand::Find { name } => PlaylistCommand::Find { name },
            };
            cli::playlist(&Providers::from_config(false), command).await
        }

        Command::Album(opt) => {
            let command = if opt.tracks {
                ResourceCommand::AlbumTracks(opt.id)
            } else {
                ResourceCommand::Album(opt.id)
            };
            cli::resource(&Providers::from_config(false), command).await
        }

        Command::Artist(opt) => {
            let command = if opt.albums {
                ResourceCommand::ArtistAlbums(opt.id)
            } else if opt.top_tracks {
                ResourceCommand::TopTracks {
                    id: opt.id,
                    country: opt.country,
                }
            } else if opt.related {
                ResourceCommand::RelatedArtists(opt.id)
            } else {
                ResourceCommand::Artist(opt.id)
            };
            cli::resource(&Providers::from_config(false), command).await
        }

        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
