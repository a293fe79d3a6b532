//! Typed subset of PokéAPI payloads.
//!
//! Only the fields the CLI shows are decoded; the full payload is available as
//! raw JSON through `PokeApiClient::get_pokemon_raw`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Helper struct for deserializing `{"slot": 1, "type": {"name": "fire", ...}}`
#[derive(Debug, Deserialize)]
struct TypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

/// Helper struct for the sprite set; only the default front sprite is kept
#[derive(Debug, Deserialize)]
struct Sprites {
    #[serde(default)]
    front_default: Option<String>,
}

/// Flatten the `types` array into type names, ordered by slot
fn deserialize_types<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let slots: Vec<TypeSlot> = Vec::deserialize(deserializer)?;
    Ok(slots.into_iter().map(|slot| slot.kind.name).collect())
}

fn deserialize_sprite<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let sprites: Option<Sprites> = Option::deserialize(deserializer)?;
    Ok(sprites.and_then(|s| s.front_default))
}

/// A named link to another resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// One page of a resource listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedResourceList {
    /// Total number of resources across all pages
    pub count: u32,

    /// URL of the next page, if any
    #[serde(default)]
    pub next: Option<String>,

    /// URL of the previous page, if any
    #[serde(default)]
    pub previous: Option<String>,

    pub results: Vec<NamedResource>,
}

/// Summary of a single Pokémon.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Pokemon {
    /// National dex number
    pub id: u32,

    pub name: String,

    /// Height in decimetres
    #[serde(default)]
    pub height: u32,

    /// Weight in hectograms
    #[serde(default)]
    pub weight: u32,

    #[serde(default)]
    pub base_experience: Option<u32>,

    /// Type names in slot order (API field: types)
    #[serde(default, deserialize_with = "deserialize_types")]
    pub types: Vec<String>,

    /// Default front sprite (API field: sprites.front_default)
    #[serde(default, rename = "sprites", deserialize_with = "deserialize_sprite")]
    pub sprite_url: Option<String>,
}

impl fmt::Display for Pokemon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:03} {} [{}] {:.1} m, {:.1} kg",
            self.id,
            self.name,
            self.types.join("/"),
            self.height as f64 / 10.0,
            self.weight as f64 / 10.0
        )
    }
}
