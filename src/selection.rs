// Selection model: what the sidebar offers and how choices constrain each other

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{DashboardError, DashboardResult};

/// The measured quantity plotted on the y-axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Insight {
    #[default]
    Co2Emissions,
    FuelCombined,
    FuelCity,
    FuelHighway,
}

impl Insight {
    pub const ALL: [Insight; 4] = [
        Insight::Co2Emissions,
        Insight::FuelCombined,
        Insight::FuelCity,
        Insight::FuelHighway,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Insight::Co2Emissions => "CO2 Emissions",
            Insight::FuelCombined => "Fuel Consumption Combined",
            Insight::FuelCity => "Fuel Consumption City",
            Insight::FuelHighway => "Fuel Consumption Highway",
        }
    }

    /// Column holding this metric in the source table
    pub fn field(self) -> &'static str {
        match self {
            Insight::Co2Emissions => "CO2_Emissions_g_km_",
            Insight::FuelCombined => "Fuel_Consumption_Comb__L_100_km_",
            Insight::FuelCity => "Fuel_Consumption_City__L_100_km_",
            Insight::FuelHighway => "Fuel_Consumption_Hwy__L_100_km_",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartType {
    #[default]
    Bar,
    Histogram,
    Scatter,
    Box,
    Violin,
}

impl ChartType {
    pub fn label(self) -> &'static str {
        match self {
            ChartType::Bar => "Bar Graph",
            ChartType::Histogram => "Histogram",
            ChartType::Scatter => "Scatter Plot",
            ChartType::Box => "Box Plot",
            ChartType::Violin => "Violin Plot",
        }
    }

    /// Whether the chart is drawn against a grouping attribute.
    ///
    /// Drives both the attribute selector and the "by ..." title clause.
    pub fn groups_by_attribute(self) -> bool {
        match self {
            ChartType::Histogram => false,
            ChartType::Bar | ChartType::Scatter | ChartType::Box | ChartType::Violin => true,
        }
    }
}

/// Dashboard flavor; only `Extended` can draw violins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    Classic,
    #[default]
    Extended,
}

impl Variant {
    pub fn label(self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::Extended => "extended",
        }
    }
}

/// Categorical column used for grouping / the x-axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Make,
    Transmission,
    EngineSize,
    Cylinders,
    Model,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Make,
        Attribute::Transmission,
        Attribute::EngineSize,
        Attribute::Cylinders,
        Attribute::Model,
    ];

    /// Column name, also used as the display label
    pub fn field(self) -> &'static str {
        match self {
            Attribute::Make => "Make",
            Attribute::Transmission => "Transmission",
            Attribute::EngineSize => "Engine_Size_L_",
            Attribute::Cylinders => "Cylinders",
            Attribute::Model => "Model",
        }
    }

    /// Numeric columns get a continuous color scale and x-axis
    pub fn is_numeric(self) -> bool {
        matches!(self, Attribute::EngineSize | Attribute::Cylinders)
    }
}

/// An attribute, or the "N/A" placeholder shown while the selector is disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeChoice {
    NotApplicable,
    Attribute(Attribute),
}

impl AttributeChoice {
    pub const SENTINEL: &'static str = "N/A";

    pub fn attribute(self) -> Option<Attribute> {
        match self {
            AttributeChoice::NotApplicable => None,
            AttributeChoice::Attribute(a) => Some(a),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AttributeChoice::NotApplicable => Self::SENTINEL,
            AttributeChoice::Attribute(a) => a.field(),
        }
    }
}

/// Manufacturer + model narrowing, only meaningful when grouping by Model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelFilter {
    /// `None` falls back to the first manufacturer in sorted order
    pub make: Option<String>,
    pub models: BTreeSet<String>,
}

impl ModelFilter {
    pub fn new<I, S>(make: Option<String>, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            make,
            models: models.into_iter().map(Into::into).collect(),
        }
    }
}

/// Everything the user picked for one interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub insight: Insight,
    pub chart_type: ChartType,
    pub attribute: AttributeChoice,
    pub model_filter: Option<ModelFilter>,
}

impl Selection {
    /// Build a normalized selection for `variant`.
    ///
    /// Histograms always carry the `N/A` attribute and no model filter;
    /// the model filter is dropped for any attribute other than Model.
    pub fn new(
        variant: Variant,
        insight: Insight,
        chart_type: ChartType,
        attribute: Option<Attribute>,
        model_filter: Option<ModelFilter>,
    ) -> DashboardResult<Self> {
        if !available_chart_types(variant).contains(&chart_type) {
            return Err(DashboardError::UnsupportedChartType {
                chart: chart_type,
                variant,
            });
        }

        let attribute = if is_attribute_selection_enabled(chart_type) {
            match attribute {
                Some(a) => AttributeChoice::Attribute(a),
                None => return Err(DashboardError::MissingAttribute { chart: chart_type }),
            }
        } else {
            AttributeChoice::NotApplicable
        };

        let model_filter = match attribute {
            AttributeChoice::Attribute(Attribute::Model) => Some(model_filter.unwrap_or_default()),
            _ => None,
        };

        Ok(Self {
            insight,
            chart_type,
            attribute,
            model_filter,
        })
    }

    pub fn title(&self) -> String {
        title_for(
            self.chart_type,
            self.insight.label(),
            self.attribute.label(),
            self.chart_type.groups_by_attribute(),
        )
    }
}

pub fn available_chart_types(variant: Variant) -> Vec<ChartType> {
    match variant {
        Variant::Classic => vec![
            ChartType::Bar,
            ChartType::Histogram,
            ChartType::Scatter,
            ChartType::Box,
        ],
        Variant::Extended => vec![
            ChartType::Bar,
            ChartType::Histogram,
            ChartType::Scatter,
            ChartType::Box,
            ChartType::Violin,
        ],
    }
}

pub fn is_attribute_selection_enabled(chart_type: ChartType) -> bool {
    chart_type.groups_by_attribute()
}

pub fn available_attributes(enabled: bool) -> Vec<AttributeChoice> {
    if enabled {
        Attribute::ALL.iter().copied().map(AttributeChoice::Attribute).collect()
    } else {
        vec![AttributeChoice::NotApplicable]
    }
}

pub fn title_for(
    chart_type: ChartType,
    insight_label: &str,
    attribute: &str,
    attribute_relevant: bool,
) -> String {
    if attribute_relevant {
        format!("{} for {} by {}", chart_type, insight_label, attribute)
    } else {
        format!("{} for {}", chart_type, insight_label)
    }
}

// -----------------------------------------------------------------------------
// Display / parsing
// -----------------------------------------------------------------------------

macro_rules! display_and_serialize_label {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }
    )*};
}

display_and_serialize_label!(Insight, ChartType, Variant, AttributeChoice);

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

impl Serialize for Attribute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.field())
    }
}

/// Lowercase and drop separators so "Bar Graph", "bar-graph" and "bar_graph" compare equal
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn unknown(kind: &'static str, value: &str) -> DashboardError {
    DashboardError::UnknownOption {
        kind,
        value: value.to_string(),
    }
}

impl FromStr for Insight {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "co2" | "co2emissions" | "co2emissionsgkm" => Ok(Insight::Co2Emissions),
            "combined" | "fuelconsumptioncombined" | "fuelconsumptioncombl100km" => {
                Ok(Insight::FuelCombined)
            }
            "city" | "fuelconsumptioncity" | "fuelconsumptioncityl100km" => Ok(Insight::FuelCity),
            "highway" | "hwy" | "fuelconsumptionhighway" | "fuelconsumptionhwyl100km" => {
                Ok(Insight::FuelHighway)
            }
            _ => Err(unknown("insight", s)),
        }
    }
}

impl FromStr for ChartType {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "bar" | "bargraph" => Ok(ChartType::Bar),
            "histogram" | "hist" => Ok(ChartType::Histogram),
            "scatter" | "scatterplot" => Ok(ChartType::Scatter),
            "box" | "boxplot" => Ok(ChartType::Box),
            "violin" | "violinplot" => Ok(ChartType::Violin),
            _ => Err(unknown("chart type", s)),
        }
    }
}

impl FromStr for Attribute {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "make" => Ok(Attribute::Make),
            "transmission" => Ok(Attribute::Transmission),
            "enginesize" | "enginesizel" => Ok(Attribute::EngineSize),
            "cylinders" => Ok(Attribute::Cylinders),
            "model" => Ok(Attribute::Model),
            _ => Err(unknown("attribute", s)),
        }
    }
}

impl FromStr for Variant {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "classic" => Ok(Variant::Classic),
            "extended" => Ok(Variant::Extended),
            _ => Err(unknown("variant", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CHARTS: [ChartType; 5] = [
        ChartType::Bar,
        ChartType::Histogram,
        ChartType::Scatter,
        ChartType::Box,
        ChartType::Violin,
    ];

    #[test]
    fn test_histogram_disables_attribute() {
        assert!(!is_attribute_selection_enabled(ChartType::Histogram));
        let attrs = available_attributes(is_attribute_selection_enabled(ChartType::Histogram));
        assert_eq!(attrs, vec![AttributeChoice::NotApplicable]);
        assert_eq!(attrs[0].label(), "N/A");
    }

    #[test]
    fn test_other_charts_offer_five_attributes_in_order() {
        for chart in ALL_CHARTS.iter().filter(|c| **c != ChartType::Histogram) {
            assert!(is_attribute_selection_enabled(*chart));
            let labels: Vec<&str> = available_attributes(is_attribute_selection_enabled(*chart))
                .iter().map(|a| a.label()).collect();
            assert_eq!(
                labels,
                vec!["Make", "Transmission", "Engine_Size_L_", "Cylinders", "Model"]
            );
        }
    }

    #[test]
    fn test_chart_types_per_variant() {
        assert_eq!(available_chart_types(Variant::Classic).len(), 4);
        assert!(!available_chart_types(Variant::Classic).contains(&ChartType::Violin));
        assert_eq!(available_chart_types(Variant::Extended), ALL_CHARTS.to_vec());
    }

    #[test]
    fn test_title_with_attribute() {
        let title = title_for(ChartType::Bar, "CO2 Emissions", "Make", true);
        assert_eq!(title, "Bar Graph for CO2 Emissions by Make");
    }

    #[test]
    fn test_title_for_histogram() {
        let sel = Selection::new(
            Variant::Extended,
            Insight::Co2Emissions,
            ChartType::Histogram,
            Some(Attribute::Make),
            None,
        )
        .unwrap();
        assert_eq!(sel.attribute, AttributeChoice::NotApplicable);
        assert_eq!(sel.title(), "Histogram for CO2 Emissions");
    }

    #[test]
    fn test_violin_title_has_by_clause() {
        let sel = Selection::new(
            Variant::Extended,
            Insight::FuelCity,
            ChartType::Violin,
            Some(Attribute::Cylinders),
            None,
        )
        .unwrap();
        assert_eq!(sel.title(), "Violin Plot for Fuel Consumption City by Cylinders");
    }

    #[test]
    fn test_classic_rejects_violin() {
        let result = Selection::new(
            Variant::Classic,
            Insight::Co2Emissions,
            ChartType::Violin,
            Some(Attribute::Make),
            None,
        );
        assert!(matches!(
            result,
            Err(DashboardError::UnsupportedChartType { chart: ChartType::Violin, .. })
        ));
    }

    #[test]
    fn test_missing_attribute() {
        let result = Selection::new(Variant::Extended, Insight::Co2Emissions, ChartType::Box, None, None);
        assert!(matches!(result, Err(DashboardError::MissingAttribute { .. })));
    }

    #[test]
    fn test_model_filter_only_kept_for_model() {
        let filter = ModelFilter::new(Some("Audi".to_string()), ["A4"]);
        let sel = Selection::new(
            Variant::Extended,
            Insight::Co2Emissions,
            ChartType::Bar,
            Some(Attribute::Make),
            Some(filter.clone()),
        )
        .unwrap();
        assert_eq!(sel.model_filter, None);

        let sel = Selection::new(
            Variant::Extended,
            Insight::Co2Emissions,
            ChartType::Bar,
            Some(Attribute::Model),
            Some(filter.clone()),
        )
        .unwrap();
        assert_eq!(sel.model_filter, Some(filter));
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("Bar Graph".parse::<ChartType>().unwrap(), ChartType::Bar);
        assert_eq!("violin".parse::<ChartType>().unwrap(), ChartType::Violin);
        assert_eq!("CO2 Emissions".parse::<Insight>().unwrap(), Insight::Co2Emissions);
        assert_eq!("hwy".parse::<Insight>().unwrap(), Insight::FuelHighway);
        assert_eq!("Engine_Size_L_".parse::<Attribute>().unwrap(), Attribute::EngineSize);
        assert_eq!("engine-size".parse::<Attribute>().unwrap(), Attribute::EngineSize);
        assert!("pie".parse::<ChartType>().is_err());
    }

    #[test]
    fn test_label_roundtrip() {
        for insight in Insight::ALL {
            assert_eq!(insight.label().parse::<Insight>().unwrap(), insight);
            assert_eq!(insight.field().parse::<Insight>().unwrap(), insight);
        }
        for chart in ALL_CHARTS {
            assert_eq!(chart.label().parse::<ChartType>().unwrap(), chart);
        }
    }
}
