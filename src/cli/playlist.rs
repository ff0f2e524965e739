use serde_json::json;

use crate::{
    cli::{Providers, print_json, with_spinner},
    error,
    spotify::playlist::PlaylistClient,
    success,
    types::PlaylistOptions,
};

#[derive(Debug, Clone)]
pub enum PlaylistCommand {
    Create {
        name: String,
        options: PlaylistOptions,
    },
    Get {
        id: String,
        market: Option<String>,
    },
    Tracks {
        id: String,
        market: Option<String>,
        limit: Option<u32>,
    },
    Add {
        id: String,
        tracks: Vec<String>,
    },
    Remove {
        id: String,
        tracks: Vec<String>,
    },
    Find {
        name: String,
    },
}

pub async fn playlist(providers: &Providers, command: PlaylistCommand) {
    let client = PlaylistClient::from_config(
        providers.app.clone(),
        providers.user.clone(),
    );

    match command {
        PlaylistCommand::Create { name, options } => {
            match with_spinner("Creating playlist...", client.create(&name, &options)).await {
                Ok(created) => {
                    success!("Playlist {} created", created.name);
                    print_json(&created);
                }
                Err(e) => error!("Failed to create playlist. Err: {}", e),
            }
        }
        PlaylistCommand::Get { id, market } => match client.get(&id, market.as_deref()).await {
            Ok(value) => print_json(&value),
            Err(e) => error!("Failed to get playlist {}. Err: {}", id, e),
        },
        PlaylistCommand::Tracks { id, market, limit } => {
            match client.tracks(&id, market.as_deref(), limit).await {
                Ok(value) => print_json(&value),
                Err(e) => error!("Failed to get tracks of playlist {}. Err: {}", id, e),
            }
        }
        PlaylistCommand::Add { id, tracks } => {
            let uris = match client.resolve_tracks(&tracks).await {
                Ok(uris) => uris,
                Err(e) => error!("Cannot resolve tracks. Err: {}", e),
            };
            match with_spinner("Adding tracks...", client.add_tracks(&id, &uris)).await {
                Ok(snapshot) => {
                    success!("Added {} items to playlist {}", uris.len(), id);
                    print_json(&snapshot);
                }
                Err(e) => error!("Failed to add tracks to playlist {}. Err: {}", id, e),
            }
        }
        PlaylistCommand::Remove { id, tracks } => {
            let uris = match client.resolve_tracks(&tracks).await {
                Ok(uris) => uris,
                Err(e) => error!("Cannot resolve tracks. Err: {}", e),
            };
            match with_spinner("Removing tracks...", client.remove_tracks(&id, &uris)).await {
                Ok(snapshot) => {
                    success!("Removed {} items from playlist {}", uris.len(), id);
                    print_json(&snapshot);
                }
                Err(e) => error!("Failed to remove tracks from playlist {}. Err: {}", id, e),
            }
        }
        PlaylistCommand::Find { name } => match client.find_id(&name).await {
            Ok(id) => print_json(&json!({ "name": name, "id": id })),
            Err(e) => error!("Cannot find playlist. Err: {}", e),
        },
    }
}
