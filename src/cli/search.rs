use crate::{
    cli::{Providers, print_json},
    error,
    spotify::search::SearchClient,
    types::{SearchQuery, SearchType},
};

pub async fn search(
    providers: &Providers,
    query: SearchQuery,
    kinds: Vec<SearchType>,
    limit: Option<u32>,
) {
    let client = SearchClient::from_config(providers.app.clone());
    match client.search(&query, &kinds, limit).await {
        Ok(result) => print_json(&result),
        Err(e) => error!("Search failed. Err: {}", e),
    }
}
