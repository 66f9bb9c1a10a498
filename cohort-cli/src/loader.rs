//! Ingestion of the external documents a caller provides: the
//! attribute catalog document (JSON/YAML), its optional customization
//! overlay, and the person table (CSV).
//!
//! None of this lives in `cohort-core` — the core never reads a file
//! Grounded in the original `cfg_loader.py` and
//! `read_csv.py`: same two-document catalog shape, same
//! activate-on-column-presence behavior for optional attributes.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use cohort_core::{Attribute, AttributeCatalog, Person};
use serde::Deserialize;

/// One attribute entry in the catalog document.
#[derive(Debug, Deserialize)]
struct AttributeEntry {
    name: String,
    #[serde(default)]
    description: String,
    selections: Vec<String>,
    /// Row key -> column key -> score. Looked up by name rather than map
    /// iteration order so the matrix rows line up with `selections`
    /// regardless of how the document orders its keys.
    compatibility_matrix: HashMap<String, HashMap<String, f64>>,
    default_weight: f64,
    #[serde(default)]
    enabled_by_default: bool,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    attributes: Vec<AttributeEntry>,
}

/// A value that may be absent, `null`, the literal string `"None"`, or a
/// real value — the overlay document's three ways of spelling "no
/// override" for a per-attribute weight or enabled flag.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Sentinel<T> {
    None(SentinelNoneString),
    Some(T),
}

/// Matches only the literal string `"None"`.
#[derive(Debug, Deserialize)]
enum SentinelNoneString {
    None,
}

impl<T> Sentinel<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Sentinel::None(_) => None,
            Sentinel::Some(v) => Some(v),
        }
    }
}

fn deserialize_sentinel_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Sentinel<T>>::deserialize(deserializer)?.and_then(Sentinel::into_option))
}

#[derive(Debug, Deserialize)]
struct OverlayEntry {
    name: String,
    #[serde(default, deserialize_with = "deserialize_sentinel_none")]
    weight: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_sentinel_none")]
    enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct OverlayDocument {
    customizations: Vec<OverlayEntry>,
}

/// A catalog document plus the people it produces, still in raw form: the
/// attribute definitions haven't been split into active/inactive yet
/// because that depends on which columns the person table carries (see
/// [`activate_columns_present_in`]).
pub struct RawCatalog {
    pub attributes: Vec<Attribute>,
    pub active_by_default: Vec<String>,
}

/// Parses a catalog document (JSON or YAML, detected by trying JSON first
/// trying JSON first, then YAML) into attribute definitions plus
/// the default active set.
pub fn load_catalog(path: &Path) -> Result<RawCatalog> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read catalog file {path:?}"))?;
    let doc: CatalogDocument = parse_json_or_yaml(&text)
        .with_context(|| format!("failed to parse catalog document {path:?}"))?;

    let mut attributes = Vec::with_capacity(doc.attributes.len());
    let mut active_by_default = Vec::new();

    for entry in doc.attributes {
        let matrix = entry
            .selections
            .iter()
            .map(|row_sel| {
                let row = entry.compatibility_matrix.get(row_sel).ok_or_else(|| {
                    anyhow::anyhow!(
                        "attribute '{}' compatibility matrix is missing a row for selection '{row_sel}'",
                        entry.name
                    )
                })?;
                entry
                    .selections
                    .iter()
                    .map(|col_sel| {
                        row.get(col_sel).copied().ok_or_else(|| {
                            anyhow::anyhow!(
                                "attribute '{}' compatibility matrix is missing entry ['{row_sel}']['{col_sel}']",
                                entry.name
                            )
                        })
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        if entry.enabled_by_default {
            active_by_default.push(entry.name.clone());
        }

        let attribute = Attribute::new(
            entry.name,
            entry.description,
            entry.selections,
            matrix,
            entry.default_weight,
            entry.enabled_by_default,
        )
        .context("attribute validation failed while loading the catalog document")?;
        attributes.push(attribute);
    }

    Ok(RawCatalog {
        attributes,
        active_by_default,
    })
}

/// Applies an overlay document's per-attribute weight/enabled overrides.
/// A sentinel `"None"` (or an absent key) leaves that attribute's
/// default untouched.
pub fn apply_overlay(raw: &mut RawCatalog, path: &Path) -> Result<()> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read overlay file {path:?}"))?;
    let overlay: OverlayDocument = parse_json_or_yaml(&text)
        .with_context(|| format!("failed to parse overlay document {path:?}"))?;

    for customization in overlay.customizations {
        let attribute = raw
            .attributes
            .iter_mut()
            .find(|a| a.name() == customization.name)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "overlay customization names unknown attribute '{}'",
                    customization.name
                )
            })?;

        if let Some(weight) = customization.weight {
            attribute
                .set_weight(weight)
                .with_context(|| format!("overlay weight override for '{}'", attribute.name()))?;
        }
        if let Some(enabled) = customization.enabled {
            let name = attribute.name().to_string();
            raw.active_by_default.retain(|n| n != &name);
            if enabled {
                raw.active_by_default.push(name);
            }
        }
    }

    Ok(())
}

/// Mirrors the source's `activate_optional_attributes`: any attribute
/// whose name appears as a CSV header column is activated even if it
/// wasn't enabled by default.
pub fn activate_columns_present_in(raw: &RawCatalog, csv_headers: &csv::StringRecord) -> Vec<String> {
    let mut active: Vec<String> = raw.active_by_default.clone();
    for attribute in &raw.attributes {
        if csv_headers.iter().any(|h| h == attribute.name()) && !active.contains(&attribute.name().to_string()) {
            active.push(attribute.name().to_string());
        }
    }
    active
}

pub fn build_catalog(raw: RawCatalog, active: Vec<String>) -> Result<AttributeCatalog> {
    AttributeCatalog::build(raw.attributes, &active).context("failed to build attribute catalog")
}

/// Loads the person table: one row per person, plus a selection column
/// and a `"{attribute} Flexibility"` column per active attribute. Per
/// an empty flexibility cell means "default"
/// (10, fully flexible), not the literal 0 the original CSV loader wrote
/// (which `Person::update_flexibility` would reject).
pub fn load_people(path: &Path, catalog: &AttributeCatalog) -> Result<Vec<Person>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open person table {path:?}"))?;

    let mut people = Vec::new();
    for result in reader.deserialize::<HashMap<String, String>>() {
        let row = result.context("failed to parse a row of the person table")?;

        let name = row
            .get("name")
            .ok_or_else(|| anyhow::anyhow!("person row is missing a 'name' column"))?
            .clone();
        let identifier: i64 = row
            .get("identifier")
            .ok_or_else(|| anyhow::anyhow!("person row is missing an 'identifier' column"))?
            .parse()
            .with_context(|| format!("person '{name}' has a non-numeric identifier"))?;

        let mut person = Person::new(name.clone(), identifier);

        for attribute in catalog.active() {
            let selection_col = attribute.name();
            let flexibility_col = format!("{} Flexibility", attribute.name());

            if let Some(selection) = row.get(selection_col) {
                if !selection.is_empty() {
                    person
                        .update_selection(attribute, selection.clone())
                        .with_context(|| format!("person '{name}', attribute '{selection_col}'"))?;
                }
            }

            if let Some(flex_cell) = row.get(&flexibility_col) {
                if !flex_cell.is_empty() {
                    let score: u8 = flex_cell
                        .parse()
                        .with_context(|| format!("person '{name}' has a non-numeric '{flexibility_col}'"))?;
                    person
                        .update_flexibility(attribute, score)
                        .with_context(|| format!("person '{name}', attribute '{selection_col}'"))?;
                }
                // empty cell: leave unset, Person::get_flexibility defaults to 10.
            }
        }

        people.push(person);
    }

    Ok(people)
}

/// Reads just the header row, for `activate_columns_present_in`.
pub fn read_csv_headers(path: &Path) -> Result<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open person table {path:?}"))?;
    let headers = reader
        .headers()
        .with_context(|| format!("failed to read header row of {path:?}"))?;
    Ok(headers.clone())
}

fn parse_json_or_yaml<T: for<'de> Deserialize<'de>>(text: &str) -> Result<T> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str(text)
            .map_err(|yaml_err| anyhow::anyhow!("not valid JSON ({json_err}) or YAML ({yaml_err})")),
    }
}
