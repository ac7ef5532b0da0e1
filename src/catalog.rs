//! PokeAPI catalog client and record flattening.
//!
//! Three lookups drive a report: the type listing (which Pokemon belong to
//! the requested type), the per-Pokemon detail record, and the species
//! record that names the generation. Each has its own timeout and its own
//! failure policy; only the detail fetch can cause an entry to be skipped.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::types::{CatalogEntry, FlatRecord};

/// Timeout for the type listing request
const LISTING_TIMEOUT_SECS: u64 = 60;
/// Timeout for a single detail fetch (detail records are large)
const DETAIL_TIMEOUT_SECS: u64 = 120;
/// Timeout for the species lookup (a miss only costs an empty cell)
const GENERATION_TIMEOUT_SECS: u64 = 10;

/// A named API resource pointer (name plus URL)
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct NamedResource {
    /// Resource name
    #[serde(default)]
    pub name: String,
    /// Resource URL
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ListingSlot {
    pokemon: NamedResource,
}

#[derive(Debug, Deserialize)]
struct TypeListing {
    #[serde(default)]
    pokemon: Vec<ListingSlot>,
}

/// One entry in a detail record's `types` list
#[derive(Clone, Debug, Deserialize)]
pub struct TypeRef {
    /// The referenced type
    #[serde(rename = "type", default)]
    pub kind: NamedResource,
}

/// One entry in a detail record's `stats` list
#[derive(Clone, Debug, Deserialize)]
pub struct StatValue {
    /// The referenced stat
    #[serde(default)]
    pub stat: NamedResource,
    /// Base value for the stat
    #[serde(default)]
    pub base_stat: i64,
}

/// One entry in a detail record's `abilities` list
#[derive(Clone, Debug, Deserialize)]
pub struct AbilityRef {
    /// The referenced ability
    #[serde(default)]
    pub ability: NamedResource,
}

/// Sprite URLs carried by a detail record
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Sprites {
    /// Default front-facing sprite, when one exists
    #[serde(default)]
    pub front_default: Option<String>,
}

/// Detail record for a single Pokemon
///
/// Every field defaults when absent; a sparse detail record flattens to a
/// row with empty cells rather than failing the entry.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PokemonDetail {
    /// Height in decimeters
    #[serde(default)]
    pub height: Option<i64>,
    /// Weight in hectograms
    #[serde(default)]
    pub weight: Option<i64>,
    /// Type slots in slot order
    #[serde(default)]
    pub types: Vec<TypeRef>,
    /// Per-stat base values
    #[serde(default)]
    pub stats: Vec<StatValue>,
    /// Ability slots in slot order
    #[serde(default)]
    pub abilities: Vec<AbilityRef>,
    /// Sprite URLs
    #[serde(default)]
    pub sprites: Sprites,
    /// Species pointer used for the generation lookup
    #[serde(default)]
    pub species: Option<NamedResource>,
}

impl PokemonDetail {
    /// URL of the species record, when the detail carries a usable one.
    pub fn species_url(&self) -> Option<&str> {
        self.species
            .as_ref()
            .map(|species| species.url.as_str())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct SpeciesRecord {
    #[serde(default)]
    generation: Option<NamedResource>,
}

/// Client for the PokeAPI catalog
#[derive(Clone, Debug)]
pub struct CatalogClient {
    http: Client,
    base: String,
}

impl CatalogClient {
    /// Create a client against the configured catalog API.
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base: config.catalog_api_base(),
        }
    }

    /// List catalog entries for an entity type.
    ///
    /// A failed listing is not an error here: the failure is logged and an
    /// empty list returned, leaving the no-entries decision to the caller.
    pub async fn list_entries(&self, entity_type: &str) -> Vec<CatalogEntry> {
        match self.try_list_entries(entity_type).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(entity_type, error = %e, "failed to fetch catalog listing");
                Vec::new()
            }
        }
    }

    async fn try_list_entries(&self, entity_type: &str) -> Result<Vec<CatalogEntry>> {
        let url = format!("{}/type/{}", self.base, entity_type);
        let response = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(LISTING_TIMEOUT_SECS))
            .send()
            .await?
            .error_for_status()?;
        let listing: TypeListing = response.json().await?;

        Ok(listing
            .pokemon
            .into_iter()
            .map(|slot| CatalogEntry {
                name: slot.pokemon.name,
                detail_url: slot.pokemon.url,
            })
            .collect())
    }

    /// Fetch the detail record behind a catalog entry.
    ///
    /// # Errors
    ///
    /// Returns a network error when the request fails, times out, answers
    /// with a non-success status or does not decode. Callers skip the entry
    /// in that case.
    pub async fn fetch_detail(&self, detail_url: &str) -> Result<PokemonDetail> {
        let response = self
            .http
            .get(detail_url)
            .timeout(Duration::from_secs(DETAIL_TIMEOUT_SECS))
            .send()
            .await?
            .error_for_status()?;
        let detail: PokemonDetail = response.json().await?;
        Ok(detail)
    }

    /// Resolve the generation name behind a species URL.
    ///
    /// Never fails: a missing URL or a failed lookup is logged and collapses
    /// to an empty string, which renders as an empty CSV cell.
    pub async fn fetch_generation(&self, species_url: Option<&str>) -> String {
        let Some(url) = species_url else {
            tracing::warn!("detail record has no species URL, leaving generation empty");
            return String::new();
        };

        match self.try_fetch_generation(url).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(url, error = %e, "failed to resolve generation");
                String::new()
            }
        }
    }

    async fn try_fetch_generation(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .timeout(Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .send()
            .await?
            .error_for_status()?;
        let species: SpeciesRecord = response.json().await?;
        Ok(species
            .generation
            .map(|generation| generation.name)
            .unwrap_or_default())
    }
}

/// Flatten a catalog entry, its detail record and generation name into one
/// report row.
///
/// Columns are inserted in a fixed order: identity first ("name", "url"),
/// then scalar attributes, then one column per stat under the stat's own
/// name, then "abilities". List-valued fields are joined with ", ". Missing
/// scalars become JSON null and render as empty CSV cells. Inserting an
/// existing key overwrites it, so a stat that shares a column name wins.
pub fn flatten(entry: &CatalogEntry, detail: &PokemonDetail, generation: &str) -> FlatRecord {
    use serde_json::Value;

    let mut record = FlatRecord::new();
    record.insert("name".to_string(), Value::String(entry.name.clone()));
    record.insert("url".to_string(), Value::String(entry.detail_url.clone()));
    record.insert(
        "height (dm)".to_string(),
        detail.height.map(Value::from).unwrap_or(Value::Null),
    );
    record.insert(
        "weight (hg)".to_string(),
        detail.weight.map(Value::from).unwrap_or(Value::Null),
    );
    record.insert(
        "sprite".to_string(),
        detail
            .sprites
            .front_default
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null),
    );
    record.insert(
        "generation".to_string(),
        Value::String(generation.to_string()),
    );
    record.insert(
        "types".to_string(),
        Value::String(join_names(detail.types.iter().map(|t| t.kind.name.as_str()))),
    );
    for stat in &detail.stats {
        record.insert(stat.stat.name.clone(), Value::from(stat.base_stat));
    }
    record.insert(
        "abilities".to_string(),
        Value::String(join_names(
            detail.abilities.iter().map(|a| a.ability.name.as_str()),
        )),
    );
    record
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}
