use crate::{
    cli::{Providers, print_json},
    error,
    spotify::browse::BrowseClient,
};

#[derive(Debug, Clone)]
pub enum BrowseCommand {
    Categories,
    Category(String),
    CategoryPlaylists(String),
    CategoryPlaylist { id: String, name: String },
    NewReleases,
}

pub async fn browse(
    providers: &Providers,
    command: BrowseCommand,
    country: Option<String>,
    locale: Option<String>,
    limit: Option<u32>,
) {
    let client = BrowseClient::from_config(providers.app.clone());
    let country = country.as_deref();
    let locale = locale.as_deref();

    let result = match &command {
        BrowseCommand::Categories => client.categories(country, locale, limit).await,
        BrowseCommand::Category(id) => client.category(id, country, locale).await,
        BrowseCommand::CategoryPlaylists(id) => {
            client.category_playlists(id, country, limit).await
        }
        BrowseCommand::CategoryPlaylist { id, name } => {
            client.category_playlist(name, id, country, limit).await
        }
        BrowseCommand::NewReleases => client.new_releases(country, limit).await,
    };

    match result {
        Ok(value) => print_json(&value),
        Err(e) => error!("Browse request failed. Err: {}", e),
    }
}
