use blockflow::io::{load_gray_image, render_flow_overlay};
use blockflow::{compute_flow, FlowConfig, FlowField};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Blockflow CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
struct FlowConfigJson {
    patch_r: usize,
    search_r: usize,
    #[serde(default = "default_sigma")]
    sigma: f32,
    #[serde(default = "default_thr")]
    thr: f32,
    #[serde(default = "default_distance_penalty")]
    distance_penalty: f64,
    #[serde(default)]
    parallel: bool,
    #[serde(default)]
    visualize: bool,
}

fn default_sigma() -> f32 {
    blockflow::flow::DEFAULT_SIGMA
}

fn default_thr() -> f32 {
    blockflow::flow::DEFAULT_THRESHOLD
}

fn default_distance_penalty() -> f64 {
    blockflow::flow::DEFAULT_DISTANCE_PENALTY
}

impl From<FlowConfigJson> for FlowConfig {
    fn from(value: FlowConfigJson) -> Self {
        Self {
            sigma: value.sigma,
            thr: value.thr,
            distance_penalty: value.distance_penalty,
            parallel: value.parallel,
            visualize: value.visualize,
            ..FlowConfig::new(value.patch_r, value.search_r)
        }
    }
}

fn default_overlay_step() -> usize {
    4
}

fn default_overlay_scale() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
struct Config {
    image1_path: String,
    image2_path: String,
    #[serde(default)]
    output_path: Option<String>,
    #[serde(default)]
    overlay_path: Option<String>,
    #[serde(default = "default_overlay_step")]
    overlay_step: usize,
    #[serde(default = "default_overlay_scale")]
    overlay_scale: f32,
    flow: FlowConfigJson,
}

#[derive(Debug, Serialize)]
struct Summary {
    mean_magnitude: f32,
    max_magnitude: f32,
    nonzero_vectors: usize,
}

#[derive(Debug, Serialize)]
struct Output<'a> {
    width: usize,
    height: usize,
    summary: Summary,
    vx: &'a [f32],
    vy: &'a [f32],
    reliability: &'a [f32],
}

fn summarize(field: &FlowField) -> Summary {
    let mut sum = 0.0f32;
    let mut max = 0.0f32;
    let mut nonzero = 0usize;
    for (&vx, &vy) in field.vx().data().iter().zip(field.vy().data()) {
        let mag = vx.hypot(vy);
        sum += mag;
        max = max.max(mag);
        if mag > 0.0 {
            nonzero += 1;
        }
    }
    let count = field.vx().data().len().max(1);
    Summary {
        mean_magnitude: sum / count as f32,
        max_magnitude: max,
        nonzero_vectors: nonzero,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("blockflow=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image1_path.is_empty() || config.image2_path.is_empty() {
        return Err("image1_path and image2_path must be set in the config".into());
    }

    let image1 = load_gray_image(&config.image1_path)?;
    let image2 = load_gray_image(&config.image2_path)?;
    let flow_cfg = FlowConfig::from(config.flow);
    let field = compute_flow(image1.view(), image2.view(), &flow_cfg)?;
    tracing::info!(
        width = field.width(),
        height = field.height(),
        "flow field computed"
    );

    if flow_cfg.visualize {
        let path = config
            .overlay_path
            .as_deref()
            .ok_or("overlay_path must be set when flow.visualize is true")?;
        let overlay = render_flow_overlay(
            image1.view(),
            &field,
            config.overlay_step,
            config.overlay_scale,
        )?;
        overlay.save(path)?;
    }

    let output = Output {
        width: field.width(),
        height: field.height(),
        summary: summarize(&field),
        vx: field.vx().data(),
        vy: field.vy().data(),
        reliability: field.reliability().data(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
