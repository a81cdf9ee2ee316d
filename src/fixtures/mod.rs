//! Fixtures
//!
//! YAML-backed attribute matrices and pre-existing variation rows for tests
//! and demos, loaded from the `fixtures/` directory.

use std::{collections::BTreeMap, fs, path::PathBuf, str::FromStr};

use rust_decimal::Decimal;
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    attributes::{Attribute, AttributePair},
    ids::{ProductId, RemoteVariationId},
    storefront::records::VariationRecord,
    variations::{Dimensions, VariationFields, set::VariationSet},
};

/// Fixture parsing errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid decimal value (weight or dimension)
    #[error("Invalid decimal value: {0}")]
    InvalidDecimal(String),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Product attributes
    attributes: Vec<Attribute>,

    /// Parent product of the variation rows
    parent: Option<ProductId>,

    /// Pre-existing durable variation rows
    records: Vec<VariationRecord>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            attributes: Vec::new(),
            parent: None,
            records: Vec::new(),
        }
    }

    /// Load a named fixture set: attributes always, variation rows when the
    /// set has any.
    ///
    /// # Errors
    ///
    /// Returns an error if a fixture file cannot be read or parsed.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();
        fixture.load_attributes(name)?;

        let variations_path = fixture.variations_path(name);
        if variations_path.exists() {
            fixture.load_variations(name)?;
        }

        Ok(fixture)
    }

    /// Load attributes from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_attributes(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("attributes").join(format!("{name}.yml"));
        let contents = fs::read_to_string(file_path)?;
        let parsed: AttributesFixture = serde_norway::from_str(&contents)?;

        self.attributes = parsed
            .attributes
            .into_iter()
            .map(|attribute| Attribute {
                name: attribute.name,
                options: attribute.options,
                variation: attribute.variation,
                visible: attribute.visible,
            })
            .collect();

        Ok(self)
    }

    /// Load pre-existing variation rows from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_variations(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = fs::read_to_string(self.variations_path(name))?;
        let parsed: VariationsFixture = serde_norway::from_str(&contents)?;

        let parent = ProductId(parsed.parent);
        self.parent = Some(parent);

        self.records = parsed
            .variations
            .into_iter()
            .map(|variation| variation.into_record(parent))
            .collect::<Result<_, _>>()?;

        Ok(self)
    }

    /// The loaded attributes.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// The parent product of the loaded variation rows, if any were loaded.
    pub fn parent(&self) -> Option<ProductId> {
        self.parent
    }

    /// The loaded durable variation rows.
    pub fn records(&self) -> &[VariationRecord] {
        &self.records
    }

    /// Build an editable set from the loaded rows, all `Synced`.
    #[must_use]
    pub fn variation_set(&self) -> VariationSet {
        VariationSet::from_records(self.records.clone())
    }

    fn variations_path(&self, name: &str) -> PathBuf {
        self.base_path.join("variations").join(format!("{name}.yml"))
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct AttributesFixture {
    attributes: Vec<AttributeFixture>,
}

#[derive(Debug, Deserialize)]
struct AttributeFixture {
    name: String,

    #[serde(default)]
    options: Vec<String>,

    #[serde(default)]
    variation: bool,

    #[serde(default = "default_true")]
    visible: bool,
}

#[derive(Debug, Deserialize)]
struct VariationsFixture {
    parent: u64,
    variations: Vec<VariationFixture>,
}

#[derive(Debug, Deserialize)]
struct VariationFixture {
    id: u64,

    /// Attribute name -> chosen option
    pairs: BTreeMap<String, String>,

    #[serde(default)]
    sku: String,

    #[serde(default)]
    regular_price: Option<u64>,

    #[serde(default)]
    sale_price: Option<u64>,

    #[serde(default)]
    stock_quantity: Option<i64>,

    #[serde(default)]
    weight: Option<String>,

    #[serde(default)]
    description: String,

    #[serde(default = "default_true")]
    published: bool,
}

impl VariationFixture {
    fn into_record(self, parent: ProductId) -> Result<VariationRecord, FixtureError> {
        let weight = self
            .weight
            .map(|raw| {
                Decimal::from_str(&raw)
                    .map_err(|_parse| FixtureError::InvalidDecimal(raw.clone()))
            })
            .transpose()?;

        let pairs: SmallVec<[AttributePair; 4]> = self
            .pairs
            .into_iter()
            .map(|(name, option)| AttributePair { name, option })
            .collect();

        Ok(VariationRecord {
            id: RemoteVariationId(self.id),
            parent,
            pairs,
            fields: VariationFields {
                regular_price: self.regular_price,
                sale_price: self.sale_price,
                sku: self.sku,
                stock_quantity: self.stock_quantity,
                stock_status: crate::variations::StockStatus::default(),
                weight,
                dimensions: Dimensions::default(),
                tax_status: crate::variations::TaxStatus::default(),
                tax_class: String::new(),
                description: self.description,
                published: self.published,
                image: None,
            },
        })
    }
}
