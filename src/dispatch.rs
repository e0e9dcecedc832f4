// Chart dispatcher: selection + filtered rows -> ChartSpec

use std::collections::HashMap;

use crate::chart::{ChartSpec, ColorEncoding, Geometry, GroupData, PaletteKind, XAxis};
use crate::data::Dataset;
use crate::error::{DashboardError, DashboardResult};
use crate::selection::{Attribute, AttributeChoice, ChartType, Insight};
use crate::stats;

pub const HISTOGRAM_BINS: usize = 30;

/// Build the chart request for one chart type.
///
/// `title` is passed through untouched. Histograms ignore `x`; every other
/// chart type needs an attribute and colors by it.
pub fn dispatch(
    data: &Dataset,
    x: AttributeChoice,
    y: Insight,
    chart_type: ChartType,
    title: &str,
) -> DashboardResult<ChartSpec> {
    log::debug!(
        "Dispatching {} over {} rows (x: {}, y: {})",
        chart_type,
        data.len(),
        x,
        y.field()
    );

    let attribute = || {
        x.attribute()
            .ok_or(DashboardError::MissingAttribute { chart: chart_type })
    };

    // One arm per chart type, no fallback
    let (x_axis, palette, groups) = match chart_type {
        ChartType::Histogram => {
            let (palette, groups) = histogram_groups(data, y)?;
            (XAxis::Continuous, palette, groups)
        }
        ChartType::Bar => {
            let a = attribute()?;
            grouped(data, a, y, chart_type, bar_palette(a), bar_geometry)?
        }
        ChartType::Scatter => {
            let a = attribute()?;
            grouped(data, a, y, chart_type, bar_palette(a), points_geometry)?
        }
        ChartType::Box => grouped(data, attribute()?, y, chart_type, PaletteKind::Set2, box_geometry)?,
        ChartType::Violin => {
            grouped(data, attribute()?, y, chart_type, PaletteKind::Plotly, violin_geometry)?
        }
    };

    let (x_label, y_label, by) = match chart_type {
        ChartType::Histogram => (y.label().to_string(), "count".to_string(), None),
        _ => (x.label().to_string(), y.label().to_string(), Some(x.label().to_string())),
    };

    Ok(ChartSpec {
        title: title.to_string(),
        chart_type,
        x_field: x,
        y_field: y.field().to_string(),
        x_label,
        y_label,
        x_axis,
        color: ColorEncoding { by, palette },
        groups,
    })
}

/// Numeric attributes get a continuous scale, categorical ones a qualitative palette
fn bar_palette(attribute: Attribute) -> PaletteKind {
    if attribute.is_numeric() {
        PaletteKind::Viridis
    } else {
        PaletteKind::Plotly
    }
}

fn histogram_groups(data: &Dataset, y: Insight) -> DashboardResult<(PaletteKind, Vec<GroupData>)> {
    // Nulls are dropped before binning
    let values: Vec<f64> = data.records().iter().filter_map(|r| r.metric(y)).collect();
    let palette = PaletteKind::Set2;
    if values.is_empty() {
        log::debug!("No values for {}, histogram stays empty", y.field());
        return Ok((palette, Vec::new()));
    }

    let (edges, counts) = stats::histogram(&values, HISTOGRAM_BINS);
    let key = y.field().to_string();
    let color = palette.assign(std::slice::from_ref(&key))[&key].clone();

    Ok((
        palette,
        vec![GroupData {
            key,
            color,
            geometry: Geometry::Bins { edges, counts },
        }],
    ))
}

/// Values of one x category, with the position it is drawn at
struct Category<'a> {
    position: f64,
    values: &'a [f64],
}

type GeometryFn = fn(&Category<'_>) -> Option<Geometry>;

/// Split rows by attribute value and build one colored group per value
fn grouped(
    data: &Dataset,
    attribute: Attribute,
    y: Insight,
    chart_type: ChartType,
    palette: PaletteKind,
    build: GeometryFn,
) -> DashboardResult<(XAxis, PaletteKind, Vec<GroupData>)> {
    let mut raw: HashMap<String, Vec<f64>> = HashMap::new();
    for record in data.records() {
        if let (Some(key), Some(value)) = (record.category(attribute), record.metric(y)) {
            raw.entry(key).or_default().push(value);
        }
    }
    if raw.is_empty() {
        log::debug!("No rows with both {} and {}", attribute, y.field());
    }

    let keys = sorted_categories(raw.keys().cloned().collect());
    let colors = palette.assign(&keys);

    // Scatter keeps numeric attributes on a real number line
    let continuous = chart_type == ChartType::Scatter && attribute.is_numeric();
    let x_axis = if continuous {
        XAxis::Continuous
    } else {
        XAxis::Categorical { categories: keys.clone() }
    };

    let mut groups = Vec::with_capacity(keys.len());
    for (idx, key) in keys.iter().enumerate() {
        let position = if continuous {
            key.parse::<f64>().unwrap_or(idx as f64)
        } else {
            idx as f64
        };
        let category = Category { position, values: &raw[key] };
        if let Some(geometry) = build(&category) {
            groups.push(GroupData {
                key: key.clone(),
                color: colors[key].clone(),
                geometry,
            });
        }
    }

    Ok((x_axis, palette, groups))
}

/// Sort numerically when every key is a number, lexicographically otherwise
fn sorted_categories(mut keys: Vec<String>) -> Vec<String> {
    let all_numeric = keys.iter().all(|s| s.parse::<f64>().is_ok());
    if all_numeric {
        keys.sort_by(|a, b| {
            let fa = a.parse::<f64>().unwrap_or(0.0);
            let fb = b.parse::<f64>().unwrap_or(0.0);
            fa.total_cmp(&fb)
        });
    } else {
        keys.sort();
    }
    keys
}

fn bar_geometry(c: &Category) -> Option<Geometry> {
    Some(Geometry::Bar {
        x: c.position,
        height: c.values.iter().sum(),
    })
}

fn points_geometry(c: &Category) -> Option<Geometry> {
    Some(Geometry::Points {
        x: vec![c.position; c.values.len()],
        y: c.values.to_vec(),
    })
}

fn box_geometry(c: &Category) -> Option<Geometry> {
    stats::box_stats(c.values).map(|stats| Geometry::Box { x: c.position, stats })
}

fn violin_geometry(c: &Category) -> Option<Geometry> {
    let inner_box = stats::box_stats(c.values)?;
    let bandwidth = stats::silverman_bandwidth(c.values);
    let (density_y, density) = stats::compute_kde(c.values, bandwidth);
    Some(Geometry::Violin {
        x: c.position,
        density_y,
        density,
        inner_box,
        points: c.values.to_vec(),
    })
}
