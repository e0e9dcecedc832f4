use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::selection::{Attribute, Insight};

/// One row of the fuel-consumption table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    #[serde(rename = "Make")]
    pub make: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Transmission")]
    pub transmission: String,
    #[serde(rename = "Engine_Size_L_", deserialize_with = "nullable_float")]
    pub engine_size: Option<f64>,
    #[serde(rename = "Cylinders", deserialize_with = "nullable_int")]
    pub cylinders: Option<u32>,
    #[serde(rename = "CO2_Emissions_g_km_", deserialize_with = "nullable_float")]
    pub co2_emissions: Option<f64>,
    #[serde(rename = "Fuel_Consumption_Comb__L_100_km_", deserialize_with = "nullable_float")]
    pub fuel_combined: Option<f64>,
    #[serde(rename = "Fuel_Consumption_City__L_100_km_", deserialize_with = "nullable_float")]
    pub fuel_city: Option<f64>,
    #[serde(rename = "Fuel_Consumption_Hwy__L_100_km_", deserialize_with = "nullable_float")]
    pub fuel_highway: Option<f64>,
}

/// Cell spellings read as a missing value, in addition to an empty cell
const NULL_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn nullable_cell<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(cell) if NULL_TOKENS.contains(&cell) => Ok(None),
        Some(cell) => cell.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn nullable_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    // inf and friends parse as floats but are not plottable
    let value: Option<f64> = nullable_cell(deserializer)?;
    Ok(value.filter(|v| v.is_finite()))
}

fn nullable_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    nullable_cell(deserializer)
}

impl Record {
    /// Value of a metric column, `None` for a missing cell
    pub fn metric(&self, insight: Insight) -> Option<f64> {
        match insight {
            Insight::Co2Emissions => self.co2_emissions,
            Insight::FuelCombined => self.fuel_combined,
            Insight::FuelCity => self.fuel_city,
            Insight::FuelHighway => self.fuel_highway,
        }
    }

    /// Grouping key for an attribute column
    pub fn category(&self, attribute: Attribute) -> Option<String> {
        match attribute {
            Attribute::Make => Some(self.make.clone()),
            Attribute::Model => Some(self.model.clone()),
            Attribute::Transmission => Some(self.transmission.clone()),
            Attribute::EngineSize => self.engine_size.map(|v| format!("{:.1}", v)),
            Attribute::Cylinders => self.cylinders.map(|v| v.to_string()),
        }
    }
}

/// An ordered, read-only collection of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Parse a CSV table with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let records = rdr.deserialize().collect::<Result<Vec<Record>, _>>()?;
        Ok(Self { records })
    }

    pub fn from_path(path: &Path) -> Result<Self, csv::Error> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Derive a new dataset holding the rows that match `pred`
    pub fn narrow<F>(&self, pred: F) -> Dataset
    where
        F: Fn(&Record) -> bool,
    {
        Dataset {
            records: self.records.iter().filter(|r| pred(r)).cloned().collect(),
        }
    }

    /// Distinct values of a string column, sorted ascending
    pub fn distinct<F>(&self, key: F) -> Vec<String>
    where
        F: Fn(&Record) -> &str,
    {
        self.records
            .iter()
            .map(|r| key(r).to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
