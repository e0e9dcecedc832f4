use crate::data::Dataset;
use crate::error::{DashboardResult, ValidationError};
use crate::selection::{Attribute, AttributeChoice, ModelFilter};

/// Manufacturers present in the dataset, sorted ascending
pub fn make_options(data: &Dataset) -> Vec<String> {
    data.distinct(|r| &r.make)
}

/// Models sold under `make`, sorted ascending
pub fn model_options(data: &Dataset, make: &str) -> Vec<String> {
    data.narrow(|r| r.make == make).distinct(|r| &r.model)
}

/// The manufacturer preselected in the make dropdown
pub fn default_make(data: &Dataset) -> Option<String> {
    make_options(data).into_iter().next()
}

/// Resolve which manufacturer a model filter applies to
pub fn chosen_make(data: &Dataset, filter: Option<&ModelFilter>) -> Option<String> {
    filter
        .and_then(|f| f.make.clone())
        .or_else(|| default_make(data))
}

/// Narrow the dataset for the current attribute selection.
///
/// Only grouping by Model filters anything: rows are restricted to the chosen
/// manufacturer, then to the chosen models. An empty model set is rejected
/// before any chart can be built.
pub fn filter(
    data: &Dataset,
    attribute: AttributeChoice,
    model_filter: Option<&ModelFilter>,
) -> DashboardResult<Dataset> {
    if attribute != AttributeChoice::Attribute(Attribute::Model) {
        return Ok(data.clone());
    }

    let make = chosen_make(data, model_filter).unwrap_or_default();
    let by_make = data.narrow(|r| r.make == make);

    let models = match model_filter {
        Some(f) if !f.models.is_empty() => &f.models,
        _ => {
            log::warn!("No models selected for make '{}'", make);
            return Err(ValidationError::NoModelsSelected.into());
        }
    };

    let narrowed = by_make.narrow(|r| models.contains(&r.model));
    log::debug!(
        "Filtered {} rows to {} ({} / {} models)",
        data.len(),
        narrowed.len(),
        make,
        models.len()
    );
    Ok(narrowed)
}
