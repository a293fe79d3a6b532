//! PokéAPI endpoints on top of the resilient fetch client.

pub mod models;

pub use models::{NamedResource, NamedResourceList, Pokemon};

use crate::client::{FetchClient, FetchOptions};
use crate::error::{FetchError, FetchResult};
use serde_json::Value;

/// Typed access to the PokéAPI v2 endpoints used by `pokefetch`.
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    client: FetchClient,
    use_cache: bool,
    retries: Option<u32>,
}

impl PokeApiClient {
    /// Wrap a client whose base URL points at PokéAPI v2.
    pub fn new(client: FetchClient) -> Self {
        Self {
            client,
            use_cache: true,
            retries: None,
        }
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Override the client's default retry budget for every call.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// The underlying fetch client.
    pub fn client(&self) -> &FetchClient {
        &self.client
    }

    fn options(&self) -> FetchOptions {
        let options = FetchOptions::new().use_cache(self.use_cache);
        match self.retries {
            Some(retries) => options.retries(retries),
            None => options,
        }
    }

    /// Build `/pokemon/{name}` from user input. Names are case-insensitive
    /// upstream, so they are normalised to lower case to share cache entries.
    fn pokemon_path(name_or_id: &str) -> FetchResult<String> {
        let name = name_or_id.trim().to_lowercase();
        if name.is_empty() {
            return Err(FetchError::InvalidRequest(
                "Pokémon name or id cannot be empty".to_string(),
            ));
        }
        Ok(format!("/pokemon/{}", urlencoding::encode(&name)))
    }

    /// Fetch the full, undecoded payload for one Pokémon.
    pub async fn get_pokemon_raw(&self, name_or_id: &str) -> FetchResult<Value> {
        let path = Self::pokemon_path(name_or_id)?;
        self.client.fetch(&path, self.options()).await
    }

    /// Fetch one Pokémon by name or national dex number.
    pub async fn get_pokemon(&self, name_or_id: &str) -> FetchResult<Pokemon> {
        let value = self.get_pokemon_raw(name_or_id).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// List Pokémon with pagination.
    ///
    /// # Arguments
    /// * `limit` - Maximum number of entries to return
    /// * `offset` - Number of entries to skip
    pub async fn list_pokemon(&self, limit: usize, offset: usize) -> FetchResult<NamedResourceList> {
        let path = format!("/pokemon?limit={}&offset={}", limit, offset);
        self.client.fetch_json(&path, self.options()).await
    }
}
