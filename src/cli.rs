use crate::adapter::{build_scene, fit_view};
use crate::config::load_config;
use crate::layout_dump::write_layout_dump;
use crate::model::FamilyGraph;
use crate::render::{render_svg, write_output_svg};
use crate::session::{LoadState, Session};
use crate::store::MemoryStore;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use futures::executor::block_on;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "ftl", version, about = "Lay out and render a family tree snapshot")]
pub struct Args {
    /// Graph snapshot (JSON or JSON5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. SVG and JSON default to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme preset, themeVariables, layout, render)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Ignore persisted positions and lay out every person automatically
    #[arg(long = "autoLayout")]
    pub auto_layout: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let input = read_input(args.input.as_deref())?;
    let mut graph = FamilyGraph::from_json(&input)?;
    if args.auto_layout {
        strip_positions(&mut graph);
    }

    let mut session = Session::new(MemoryStore::with_graph(graph), config.layout.clone());
    block_on(session.reload());
    if let LoadState::Error(message) = session.load_state() {
        return Err(anyhow::anyhow!("failed to load snapshot: {message}"));
    }

    let scene = build_scene(session.graph(), session.layout(), &config.theme);
    let viewport = if session.take_fit_request() {
        fit_view(scene.bounds(), config.render.width, config.render.height, &config.render)
    } else {
        Default::default()
    };
    debug!(?viewport, "viewport fitted");
    info!(
        persons = scene.nodes.len(),
        edges = scene.edges.len(),
        format = ?args.output_format,
        "rendering family tree"
    );

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&scene, viewport, &config.theme, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&render_svg(&scene, viewport, &config.theme, &config.render), &output, &config)?;
        }
        OutputFormat::Json => {
            write_layout_dump(args.output.as_deref(), session.layout(), viewport)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &crate::config::Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &crate::config::Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn strip_positions(graph: &mut FamilyGraph) {
    for person in &mut graph.nodes {
        person.position = None;
    }
}
