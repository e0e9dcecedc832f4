use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use co2dash::graph::renderer_for;
use co2dash::{
    loader, Attribute, ChartType, Dashboard, Insight, ModelFilter, OutputFormat, Outcome,
    RenderOptions, Selection, Variant,
};

#[derive(Parser, Debug)]
#[command(name = "co2dash")]
#[command(about = "Explore vehicle fuel consumption and CO2 emissions from nco2.csv", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the chart for a selection
    Render {
        #[command(flatten)]
        selection: SelectionArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the sidebar widget state for a selection as JSON
    Sidebar {
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

#[derive(clap::Args, Debug)]
struct SelectionArgs {
    /// Metric to plot (e.g. "CO2 Emissions", co2, combined, city, highway)
    #[arg(long, default_value = "CO2 Emissions")]
    insight: Insight,

    /// Graph type (e.g. "Bar Graph", histogram, scatter, box, violin)
    #[arg(long, default_value = "Bar Graph")]
    chart: ChartType,

    /// Attribute for the x-axis; ignored for histograms [default: Make]
    #[arg(long)]
    attribute: Option<Attribute>,

    /// Manufacturer to pick models from when the attribute is Model
    #[arg(long)]
    make: Option<String>,

    /// Model to include when the attribute is Model (repeatable)
    #[arg(long = "model")]
    models: Vec<String>,

    /// Dashboard flavor: classic (no violin) or extended
    #[arg(long, default_value = "extended")]
    variant: Variant,
}

impl SelectionArgs {
    fn to_selection(&self) -> Result<Selection> {
        let model_filter = ModelFilter::new(self.make.clone(), self.models.iter().cloned());
        let selection = Selection::new(
            self.variant,
            self.insight,
            self.chart,
            Some(self.attribute.unwrap_or(Attribute::Make)),
            Some(model_filter),
        )?;
        Ok(selection)
    }
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Base render options as JSON, e.g. '{"width": 1024, "type": "svg"}'
    #[arg(long)]
    options: Option<String>,

    /// Output format: png, svg or json
    #[arg(long, value_parser = parse_format)]
    format: Option<OutputFormat>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Write to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl OutputArgs {
    fn render_options(&self) -> Result<RenderOptions> {
        let mut options = match &self.options {
            Some(json) => serde_json::from_str(json).context("Invalid --options JSON")?,
            None => RenderOptions::default(),
        };
        if let Some(format) = self.format {
            options.format = format;
        }
        if let Some(width) = self.width {
            options.width = width;
        }
        if let Some(height) = self.height {
            options.height = height;
        }
        Ok(options)
    }
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    match s.to_ascii_lowercase().as_str() {
        "png" => Ok(OutputFormat::Png),
        "svg" => Ok(OutputFormat::Svg),
        "json" => Ok(OutputFormat::Json),
        other => Err(format!("unknown format '{}' (expected png, svg or json)", other)),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let data = loader::load().context("Failed to load dataset")?;

    match args.command {
        Command::Render { selection, output } => {
            let dashboard = Dashboard::new(data, selection.variant);
            let selection = selection.to_selection()?;

            let view = match dashboard.render(&selection)? {
                Outcome::Chart(view) => view,
                Outcome::Error(message) => {
                    eprintln!("{}", message);
                    std::process::exit(1);
                }
            };

            let options = output.render_options()?;
            log::info!("Rendering '{}' as {:?}", view.title, options.format);
            let bytes = renderer_for(&options)
                .render(&view.chart)
                .context("Failed to render chart")?;
            write_output(output.output.as_deref(), &bytes)?;
        }
        Command::Sidebar { selection } => {
            let dashboard = Dashboard::new(data, selection.variant);
            let state = dashboard.sidebar(&selection.to_selection()?);
            let mut json = serde_json::to_vec_pretty(&state).context("Failed to serialize sidebar")?;
            json.push(b'\n');
            write_output(None, &json)?;
        }
    }

    Ok(())
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    if let Some(path) = path {
        return std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()));
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(bytes)
        .context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
