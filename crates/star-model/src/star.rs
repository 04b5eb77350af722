//! Dimension and fact definitions for the property-purchase star schema.
//!
//! A [`StarModel`] describes everything the engine needs to know about the
//! target schema: which raw columns are dropped up front, which columns form
//! each dimension's natural key, which transaction columns survive into
//! the fact table, and the type every one of those columns is stored as.

use std::collections::BTreeMap;
use std::fmt;

use polars::prelude::{DataType, Schema};
use serde::{Deserialize, Serialize};

/// Name of the fact table produced for property purchases.
pub const FACT_PROPERTY_PURCHASE: &str = "fact_property_purchase";
/// Name of the property dimension table.
pub const DIM_PROPERTY: &str = "dim_property";
/// Name of the location dimension table.
pub const DIM_LOCATION: &str = "dim_location";
/// Name of the customer financials dimension table.
pub const DIM_CUSTOMER_FINANCIALS: &str = "dim_customer_financials";

/// Column that never propagates into the model.
pub const PREVIOUS_OWNERS: &str = "previous_owners";

/// How a table sink must persist a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Add this run's rows to the accumulated history.
    Append,
    /// Replace whatever the table held before.
    Overwrite,
}

impl WriteMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage type of a model column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Whole numbers, stored as `Int64`.
    Integer,
    /// Amounts and ratios, stored as `Float64`.
    Decimal,
    /// Stored as `String`.
    Text,
}

impl ColumnType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Text => "text",
        }
    }

    pub fn data_type(self) -> DataType {
        match self {
            Self::Integer => DataType::Int64,
            Self::Decimal => DataType::Float64,
            Self::Text => DataType::String,
        }
    }

    /// Whether a column of `found` converts to this type without losing
    /// values. Integers widen to decimals, never the other way round.
    pub fn accepts(self, found: &DataType) -> bool {
        if matches!(found, DataType::Null) {
            return true;
        }
        let integer = matches!(
            found,
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
        );
        match self {
            Self::Integer => integer,
            Self::Decimal => integer || matches!(found, DataType::Float32 | DataType::Float64),
            Self::Text => matches!(found, DataType::String),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, ordered set of columns forming a dimension's natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDef {
    /// Short human-readable name ("Property", "Location", ...).
    pub name: String,
    /// Output table name.
    pub table: String,
    /// Surrogate key column added to the dimension and carried by facts.
    pub key_column: String,
    /// Natural-key columns, in output order.
    pub columns: Vec<String>,
}

impl DimensionDef {
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        key_column: impl Into<String>,
        columns: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            key_column: key_column.into(),
            columns: columns.iter().map(|column| (*column).to_string()).collect(),
        }
    }

    /// Dimension table columns: natural key followed by the surrogate key.
    pub fn output_columns(&self) -> Vec<String> {
        let mut columns = self.columns.clone();
        columns.push(self.key_column.clone());
        columns
    }

    pub fn property() -> Self {
        Self::new(
            "Property",
            DIM_PROPERTY,
            "property_type_key",
            &[
                "property_type",
                "furnishing_status",
                "rooms",
                "bathrooms",
                "garage",
                "garden",
                "property_size_sqft",
            ],
        )
    }

    pub fn location() -> Self {
        Self::new(
            "Location",
            DIM_LOCATION,
            "location_key",
            &[
                "country",
                "city",
                "crime_cases_reported",
                "legal_cases_on_property",
                "neighbourhood_rating",
                "connectivity_score",
            ],
        )
    }

    pub fn customer_financials() -> Self {
        Self::new(
            "Customer Financials",
            DIM_CUSTOMER_FINANCIALS,
            "customer_financial_key",
            &[
                "customer_salary",
                "loan_amount",
                "loan_tenure_years",
                "monthly_expenses",
                "emi_to_income_ratio",
            ],
        )
    }
}

/// Transaction-level columns carried by the fact table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactDef {
    pub table: String,
    pub columns: Vec<String>,
}

impl FactDef {
    pub fn property_purchase() -> Self {
        Self {
            table: FACT_PROPERTY_PURCHASE.to_string(),
            columns: ["property_id", "price", "down_payment", "decision"]
                .iter()
                .map(|column| (*column).to_string())
                .collect(),
        }
    }
}

/// Identity of one output table and the write mode it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTable {
    Fact(String),
    Dimension(String),
}

impl OutputTable {
    pub fn name(&self) -> &str {
        match self {
            Self::Fact(name) | Self::Dimension(name) => name,
        }
    }

    /// Facts accumulate across runs; dimensions are rebuilt wholesale.
    ///
    /// Dimension surrogate keys are not stable between runs, so appending
    /// dimension rows would leave the same natural key under several keys.
    pub const fn write_mode(&self) -> WriteMode {
        match self {
            Self::Fact(_) => WriteMode::Append,
            Self::Dimension(_) => WriteMode::Overwrite,
        }
    }
}

/// The complete target schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarModel {
    pub fact: FactDef,
    pub dimensions: Vec<DimensionDef>,
    /// Columns removed from every batch before anything else happens.
    pub dropped_columns: Vec<String>,
    /// Stored type of every fact and dimension column.
    pub column_types: BTreeMap<String, ColumnType>,
}

impl Default for StarModel {
    fn default() -> Self {
        Self::property_purchase()
    }
}

impl StarModel {
    pub fn property_purchase() -> Self {
        Self {
            fact: FactDef::property_purchase(),
            dimensions: vec![
                DimensionDef::property(),
                DimensionDef::location(),
                DimensionDef::customer_financials(),
            ],
            dropped_columns: vec![PREVIOUS_OWNERS.to_string()],
            column_types: property_purchase_types(),
        }
    }

    /// Type of `column`, if the model declares one.
    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.column_types.get(column).copied()
    }

    /// Declared types of the required columns, in required-column order.
    pub fn input_schema(&self) -> Schema {
        let mut schema = Schema::default();
        for column in self.required_columns() {
            if let Some(column_type) = self.column_type(column) {
                schema.with_column(column.into(), column_type.data_type());
            }
        }
        schema
    }

    #[must_use]
    pub fn with_dropped_columns(mut self, columns: Vec<String>) -> Self {
        self.dropped_columns = columns;
        self
    }

    /// Every column an input batch must carry after projection.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.fact.columns.iter().map(String::as_str).collect();
        for dimension in &self.dimensions {
            for column in &dimension.columns {
                if !columns.contains(&column.as_str()) {
                    columns.push(column);
                }
            }
        }
        columns
    }

    /// Fact table columns: transaction columns then one key per dimension.
    pub fn fact_columns(&self) -> Vec<String> {
        let mut columns = self.fact.columns.clone();
        columns.extend(self.dimensions.iter().map(|dim| dim.key_column.clone()));
        columns
    }

    /// Output tables in write order: the fact table first, then dimensions.
    pub fn output_tables(&self) -> Vec<OutputTable> {
        let mut tables = vec![OutputTable::Fact(self.fact.table.clone())];
        tables.extend(
            self.dimensions
                .iter()
                .map(|dim| OutputTable::Dimension(dim.table.clone())),
        );
        tables
    }

    pub fn dimension(&self, table: &str) -> Option<&DimensionDef> {
        self.dimensions.iter().find(|dim| dim.table == table)
    }
}

fn property_purchase_types() -> BTreeMap<String, ColumnType> {
    use ColumnType::{Decimal, Integer, Text};

    [
        ("property_id", Integer),
        ("price", Decimal),
        ("down_payment", Decimal),
        ("decision", Integer),
        ("property_type", Text),
        ("furnishing_status", Text),
        ("rooms", Integer),
        ("bathrooms", Integer),
        ("garage", Integer),
        ("garden", Integer),
        ("property_size_sqft", Integer),
        ("country", Text),
        ("city", Text),
        ("crime_cases_reported", Integer),
        ("legal_cases_on_property", Integer),
        ("neighbourhood_rating", Integer),
        ("connectivity_score", Integer),
        ("customer_salary", Decimal),
        ("loan_amount", Decimal),
        ("loan_tenure_years", Integer),
        ("monthly_expenses", Decimal),
        ("emi_to_income_ratio", Decimal),
    ]
    .into_iter()
    .map(|(column, column_type)| (column.to_string(), column_type))
    .collect()
}
