use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;

use crate::chart::{BoxStats, ChartSpec, Geometry, XAxis};
use crate::palette::parse_hex;
use crate::{OutputFormat, RenderOptions};

/// Half the slot width given to a bar, box or violin on a categorical axis
const HALF_WIDTH: f64 = 0.4;

/// Turns a chart request into an encoded artifact
pub trait Renderer {
    fn render(&self, spec: &ChartSpec) -> Result<Vec<u8>>;
}

/// Emits the chart request itself as pretty JSON
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, spec: &ChartSpec) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(spec).context("Failed to serialize chart")?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Draws charts with plotters as PNG or SVG
pub struct PlottersRenderer {
    options: RenderOptions,
}

impl PlottersRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl Renderer for PlottersRenderer {
    fn render(&self, spec: &ChartSpec) -> Result<Vec<u8>> {
        let (width, height) = (self.options.width, self.options.height);
        match self.options.format {
            OutputFormat::Png => {
                let mut buffer = vec![0u8; rgb_buffer_len(width, height)?];
                {
                    let root = BitMapBackend::with_buffer(&mut buffer, (width, height))
                        .into_drawing_area();
                    draw_chart(&root, spec)?;
                    root.present().context("Failed to present drawing")?;
                }
                encode_png(&buffer, width, height)
            }
            OutputFormat::Svg => {
                let mut svg = String::new();
                {
                    let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
                    draw_chart(&root, spec)?;
                    root.present().context("Failed to present drawing")?;
                }
                Ok(svg.into_bytes())
            }
            OutputFormat::Json => JsonRenderer.render(spec),
        }
    }
}

/// Pick the renderer matching the requested output format
pub fn renderer_for(options: &RenderOptions) -> Box<dyn Renderer> {
    match options.format {
        OutputFormat::Json => Box::new(JsonRenderer),
        OutputFormat::Png | OutputFormat::Svg => Box::new(PlottersRenderer::new(options.clone())),
    }
}

/// Bytes needed for an RGB canvas of the given size
fn rgb_buffer_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(3))
        .with_context(|| format!("Canvas of {}x{} pixels is too large", width, height))
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }
    Ok(png_bytes)
}

/// Compute padded axis ranges for a spec; a chart with nothing to draw gets unit axes
fn axis_ranges(spec: &ChartSpec) -> (Range<f64>, Range<f64>) {
    let Some(((x_min, x_max), (y_min, y_max))) = spec.extent() else {
        return (0.0..1.0, 0.0..1.0);
    };

    let x_range = match &spec.x_axis {
        XAxis::Categorical { categories } if !categories.is_empty() => {
            -0.5..(categories.len() as f64 - 0.5)
        }
        _ => pad_range(x_min, x_max),
    };

    (x_range, pad_range(y_min, y_max))
}

fn pad_range(min: f64, max: f64) -> Range<f64> {
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

fn draw_chart<DB>(root: &DrawingArea<DB, Shift>, spec: &ChartSpec) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    let (x_range, y_range) = axis_ranges(spec);

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(&spec.title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    let categories: &[String] = match &spec.x_axis {
        XAxis::Categorical { categories } => categories,
        XAxis::Continuous => &[],
    };

    // Ticks land on integer positions; anything in between stays blank
    let category_label = |x: &f64| -> String {
        let idx = x.round();
        if (x - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < categories.len() {
            categories[idx as usize].clone()
        } else {
            String::new()
        }
    };

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(spec.x_label.as_str()).y_desc(spec.y_label.as_str());
    if !categories.is_empty() {
        mesh.x_labels(categories.len())
            .x_label_formatter(&category_label)
            .disable_x_mesh();
    }
    mesh.draw().context("Failed to draw mesh")?;

    for group in &spec.groups {
        let color = parse_color(&group.color);
        let anno = match &group.geometry {
            Geometry::Bar { x, height } => chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(x - HALF_WIDTH, 0.0), (x + HALF_WIDTH, *height)],
                    color.filled(),
                )))
                .context("Failed to draw bar")?,
            Geometry::Bins { edges, counts } => chart
                .draw_series(edges.windows(2).zip(counts).map(|(edge, &count)| {
                    Rectangle::new([(edge[0], 0.0), (edge[1], count as f64)], color.mix(0.85).filled())
                }))
                .context("Failed to draw histogram")?,
            Geometry::Points { x, y } => chart
                .draw_series(
                    x.iter()
                        .zip(y)
                        .map(|(&px, &py)| Circle::new((px, py), 3, color.mix(0.8).filled())),
                )
                .context("Failed to draw point series")?,
            Geometry::Box { x, stats } => {
                draw_box(&mut chart, *x, HALF_WIDTH, stats, color, true)?;
                chart
                    .draw_series(stats.outliers.iter().map(|&v| Circle::new((*x, v), 3, color.filled())))
                    .context("Failed to draw outliers")?
            }
            Geometry::Violin {
                x,
                density_y,
                density,
                inner_box,
                points,
            } => {
                let mut outline: Vec<(f64, f64)> = density_y
                    .iter()
                    .zip(density)
                    .map(|(&y, &d)| (x + d * HALF_WIDTH, y))
                    .collect();
                outline.extend(
                    density_y
                        .iter()
                        .zip(density)
                        .rev()
                        .map(|(&y, &d)| (x - d * HALF_WIDTH, y)),
                );
                chart
                    .draw_series(std::iter::once(Polygon::new(outline, color.mix(0.5).filled())))
                    .context("Failed to draw violin")?;
                draw_box(&mut chart, *x, HALF_WIDTH * 0.15, inner_box, color, false)?;
                chart
                    .draw_series(points.iter().enumerate().map(|(i, &v)| {
                        Circle::new((x + jitter(i), v), 2, color.mix(0.7).filled())
                    }))
                    .context("Failed to draw violin points")?
            }
        };

        if spec.color.by.is_some() {
            anno.label(group.key.as_str()).legend(move |(lx, ly)| {
                Rectangle::new([(lx, ly - 5), (lx + 10, ly + 5)], color.filled())
            });
        }
    }

    if spec.color.by.is_some() && !spec.groups.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .context("Failed to draw legend")?;
    }

    Ok(())
}

/// Whiskers, caps, box and median line for a single vertical box plot
fn draw_box<DB>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<plotters::coord::types::RangedCoordf64, plotters::coord::types::RangedCoordf64>>,
    x: f64,
    half_width: f64,
    stats: &BoxStats,
    color: RGBColor,
    with_caps: bool,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let cap_half = half_width * 0.4;
    let stroke = color.stroke_width(2);

    let mut lines = vec![
        vec![(x, stats.lower_whisker), (x, stats.q1)],
        vec![(x, stats.q3), (x, stats.upper_whisker)],
    ];
    if with_caps {
        lines.push(vec![(x - cap_half, stats.lower_whisker), (x + cap_half, stats.lower_whisker)]);
        lines.push(vec![(x - cap_half, stats.upper_whisker), (x + cap_half, stats.upper_whisker)]);
    }
    chart
        .draw_series(lines.into_iter().map(|pts| PathElement::new(pts, stroke)))
        .context("Failed to draw whiskers")?;

    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(x - half_width, stats.q3), (x + half_width, stats.q1)],
            color.mix(0.6).filled(),
        )))
        .context("Failed to draw box")?;

    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(x - half_width, stats.median), (x + half_width, stats.median)],
            WHITE.stroke_width(2),
        )))
        .context("Failed to draw median")?;

    Ok(())
}

/// Deterministic horizontal spread for strip points
fn jitter(i: usize) -> f64 {
    let unit = ((i * 7919) % 101) as f64 / 100.0;
    (unit - 0.5) * HALF_WIDTH * 0.6
}

/// Parse a `#rrggbb` string or a basic color name
fn parse_color(color_str: &str) -> RGBColor {
    if let Some((r, g, b)) = parse_hex(color_str) {
        return RGBColor(r, g, b);
    }
    match color_str {
        "red" => RED,
        "green" => GREEN,
        "blue" => BLUE,
        "black" => BLACK,
        "white" => WHITE,
        _ => BLUE,
    }
}
