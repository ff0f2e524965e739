use crate::{
    cli::{Providers, print_json},
    error,
    spotify::resource::ResourceClient,
};

#[derive(Debug, Clone)]
pub enum ResourceCommand {
    Album(String),
    AlbumTracks(String),
    Artist(String),
    ArtistAlbums(String),
    TopTracks {
        id: String,
        country: Option<String>,
    },
    RelatedArtists(String),
}

pub async fn resource(providers: &Providers, command: ResourceCommand) {
    let client = ResourceClient::from_config(providers.app.clone());

    let result = match &command {
        ResourceCommand::Album(id) => client.album(id).await,
        ResourceCommand::AlbumTracks(id) => client.album_tracks(id).await,
        ResourceCommand::Artist(id) => client.artist(id).await,
        ResourceCommand::ArtistAlbums(id) => client.artist_albums(id).await,
        ResourceCommand::TopTracks { id, country } => {
            client.artist_top_tracks(id, country.as_deref()).await
        }
        ResourceCommand::RelatedArtists(id) => client.related_artists(id).await,
    };

    match result {
        Ok(value) => print_json(&value),
        Err(e) => error!("Lookup failed. Err: {}", e),
    }
}
