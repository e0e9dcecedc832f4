// Dashboard runtime: one full recomputation per interaction

use serde::Serialize;

use crate::chart::ChartSpec;
use crate::data::Dataset;
use crate::dispatch::dispatch;
use crate::error::{DashboardError, DashboardResult};
use crate::filter;
use crate::selection::{
    available_attributes, available_chart_types, is_attribute_selection_enabled, Attribute,
    AttributeChoice, ChartType, Insight, Selection, Variant,
};

/// What the main panel shows for a successful interaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub title: String,
    pub chart: ChartSpec,
}

/// Result of one interaction: a chart, or the message shown in its place
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Chart(View),
    Error(String),
}

/// Widget state of the sidebar for a given selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarState {
    pub variant: Variant,
    pub insights: Vec<Insight>,
    pub insight: Insight,
    pub chart_types: Vec<ChartType>,
    pub chart_type: ChartType,
    pub attribute_enabled: bool,
    pub attributes: Vec<AttributeChoice>,
    pub attribute: AttributeChoice,
    /// Make/model selectors only appear when grouping by Model
    pub model_filter_visible: bool,
    pub makes: Vec<String>,
    pub make: Option<String>,
    pub models: Vec<String>,
    pub selected_models: Vec<String>,
}

pub struct Dashboard<'a> {
    data: &'a Dataset,
    variant: Variant,
}

impl<'a> Dashboard<'a> {
    pub fn new(data: &'a Dataset, variant: Variant) -> Self {
        Self { data, variant }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Describe every sidebar widget for the current selection
    pub fn sidebar(&self, selection: &Selection) -> SidebarState {
        let attribute_enabled = is_attribute_selection_enabled(selection.chart_type);
        let model_filter_visible = selection.attribute == AttributeChoice::Attribute(Attribute::Model);

        let (makes, make, models, selected_models) = if model_filter_visible {
            let make = filter::chosen_make(self.data, selection.model_filter.as_ref());
            let models = make
                .as_deref()
                .map(|m| filter::model_options(self.data, m))
                .unwrap_or_default();
            let selected = selection
                .model_filter
                .as_ref()
                .map(|f| f.models.iter().cloned().collect())
                .unwrap_or_default();
            (filter::make_options(self.data), make, models, selected)
        } else {
            (Vec::new(), None, Vec::new(), Vec::new())
        };

        SidebarState {
            variant: self.variant,
            insights: Insight::ALL.to_vec(),
            insight: selection.insight,
            chart_types: available_chart_types(self.variant),
            chart_type: selection.chart_type,
            attribute_enabled,
            attributes: available_attributes(attribute_enabled),
            attribute: selection.attribute,
            model_filter_visible,
            makes,
            make,
            models,
            selected_models,
        }
    }

    /// Filter, title and dispatch for one selection
    pub fn view(&self, selection: &Selection) -> DashboardResult<View> {
        if !available_chart_types(self.variant).contains(&selection.chart_type) {
            return Err(DashboardError::UnsupportedChartType {
                chart: selection.chart_type,
                variant: self.variant,
            });
        }

        let data = filter::filter(self.data, selection.attribute, selection.model_filter.as_ref())?;
        let title = selection.title();
        let chart = dispatch(
            &data,
            selection.attribute,
            selection.insight,
            selection.chart_type,
            &title,
        )?;

        Ok(View { title, chart })
    }

    /// Like [`Dashboard::view`], with validation failures turned into the inline message
    pub fn render(&self, selection: &Selection) -> DashboardResult<Outcome> {
        match self.view(selection) {
            Ok(view) => Ok(Outcome::Chart(view)),
            Err(DashboardError::Validation(err)) => Ok(Outcome::Error(err.to_string())),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::sample;
    use crate::selection::ModelFilter;

    fn select(chart: ChartType, attribute: Option<Attribute>, mf: Option<ModelFilter>) -> Selection {
        Selection::new(Variant::Extended, Insight::Co2Emissions, chart, attribute, mf).unwrap()
    }

    #[test]
    fn test_render_chart() {
        let data = sample();
        let dash = Dashboard::new(&data, Variant::Extended);
        let outcome = dash.render(&select(ChartType::Bar, Some(Attribute::Make), None)).unwrap();
        match outcome {
            Outcome::Chart(view) => {
                assert_eq!(view.title, "Bar Graph for CO2 Emissions by Make");
                assert_eq!(view.chart.title, view.title);
            }
            Outcome::Error(msg) => panic!("unexpected error: {}", msg),
        }
    }

    #[test]
    fn test_render_without_models_shows_message() {
        let data = sample();
        let dash = Dashboard::new(&data, Variant::Extended);
        let outcome = dash.render(&select(ChartType::Box, Some(Attribute::Model), None)).unwrap();
        assert_eq!(outcome, Outcome::Error("Please select at least one model.".to_string()));
    }

    #[test]
    fn test_render_model_selection() {
        let data = sample();
        let dash = Dashboard::new(&data, Variant::Extended);
        let mf = ModelFilter::new(Some("Audi".to_string()), ["A4", "A6"]);
        let view = dash.view(&select(ChartType::Scatter, Some(Attribute::Model), Some(mf))).unwrap();
        let keys: Vec<&str> = view.chart.groups.iter().map(|g| g.key.as_str()).collect();
        // The A4 row with an empty CO2 cell is dropped, the other A4 remains
        assert_eq!(keys, vec!["A4", "A6"]);
    }

    #[test]
    fn test_models_outside_make_render_empty_chart() {
        let data = sample();
        let dash = Dashboard::new(&data, Variant::Extended);
        let mf = ModelFilter::new(Some("Audi".to_string()), ["Camry"]);
        match dash.render(&select(ChartType::Bar, Some(Attribute::Model), Some(mf))).unwrap() {
            Outcome::Chart(view) => {
                assert_eq!(view.title, "Bar Graph for CO2 Emissions by Model");
                assert!(view.chart.groups.is_empty());
            }
            Outcome::Error(msg) => panic!("unexpected error: {}", msg),
        }
    }

    #[test]
    fn test_classic_dashboard_rejects_violin() {
        let data = sample();
        let dash = Dashboard::new(&data, Variant::Classic);
        let result = dash.view(&select(ChartType::Violin, Some(Attribute::Make), None));
        assert!(matches!(result, Err(DashboardError::UnsupportedChartType { .. })));
    }

    #[test]
    fn test_identical_selection_identical_view() {
        let data = sample();
        let dash = Dashboard::new(&data, Variant::Extended);
        let sel = select(ChartType::Histogram, None, None);
        assert_eq!(dash.view(&sel).unwrap(), dash.view(&sel).unwrap());
    }

    #[test]
    fn test_sidebar_histogram() {
        let data = sample();
        let dash = Dashboard::new(&data, Variant::Classic);
        let state = dash.sidebar(&select(ChartType::Histogram, None, None));
        assert!(!state.attribute_enabled);
        assert_eq!(state.attributes, vec![AttributeChoice::NotApplicable]);
        assert!(!state.model_filter_visible);
        assert!(state.makes.is_empty());
        assert_eq!(state.chart_types.len(), 4);
    }

    #[test]
    fn test_sidebar_model_defaults_to_first_make() {
        let data = sample();
        let dash = Dashboard::new(&data, Variant::Extended);
        let state = dash.sidebar(&select(ChartType::Bar, Some(Attribute::Model), None));
        assert!(state.model_filter_visible);
        assert_eq!(state.makes, vec!["Audi", "BMW", "Toyota"]);
        assert_eq!(state.make.as_deref(), Some("Audi"));
        assert_eq!(state.models, vec!["A4", "A6"]);
        assert!(state.selected_models.is_empty());
    }

    #[test]
    fn test_sidebar_serializes_labels() {
        let data = sample();
        let dash = Dashboard::new(&data, Variant::Extended);
        let state = dash.sidebar(&select(ChartType::Violin, Some(Attribute::EngineSize), None));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["chart_type"], "Violin Plot");
        assert_eq!(json["attribute"], "Engine_Size_L_");
        assert_eq!(json["insights"][1], "Fuel Consumption Combined");
    }
}
