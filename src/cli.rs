use crate::catalog::{CatalogSnapshot, is_json5_path, load_relations, parse_catalog};
use crate::config::{Config, load_config};
use crate::filter::FilterState;
use crate::layout::{TechTreeFrame, Viewport, compute_frame};
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::render::{write_output_png, write_output_svg};
use crate::session::ViewMode;
use crate::theme::Theme;
use crate::{RenderOptions, effective_expansion, render_with_options};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "techtree",
    version,
    about = "Render a vehicle catalog as a tech tree or card list"
)]
pub struct Args {
    /// Catalog file (.json or .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (themeVariables, techTree, session)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Viewport height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    #[arg(long = "view", value_enum, default_value = "tree")]
    pub view: ViewArg,

    /// Only show these nations (repeatable)
    #[arg(long = "nation")]
    pub nations: Vec<String>,

    #[arg(long = "class")]
    pub class: Option<String>,

    /// Only show these battle ratings (repeatable)
    #[arg(long = "rating")]
    pub ratings: Vec<String>,

    /// Case-insensitive match against name, rank and notes
    #[arg(long = "search")]
    pub search: Option<String>,

    /// Open the stack headed by this vehicle (repeatable)
    #[arg(long = "expand")]
    pub expand: Vec<String>,

    #[arg(long = "expand-all")]
    pub expand_all: bool,

    /// Relation edges in a separate JSON file
    #[arg(long = "links")]
    pub links: Option<PathBuf>,

    /// Named theme, overrides the config file
    #[arg(long = "theme")]
    pub theme: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    /// Layout dump for debugging
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewArg {
    Tree,
    List,
}

impl From<ViewArg> for ViewMode {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Tree => ViewMode::Tree,
            ViewArg::List => ViewMode::List,
        }
    }
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = resolve_config(&args)?;

    let (input, json5) = read_input(args.input.as_deref())?;
    let mut catalog = parse_catalog(&input, json5)?;
    if let Some(links) = args.links.as_deref() {
        catalog = catalog.with_relations(load_relations(links)?);
    }
    catalog.apply_builtin_thumbnails();
    tracing::debug!(
        vehicles = catalog.vehicles.len(),
        links = catalog.relations.as_ref().map(Vec::len),
        "catalog loaded"
    );

    let options = build_render_options(&args, &config, &catalog);
    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_with_options(&catalog, &options);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_with_options(&catalog, &options);
            write_output_png(&svg, &output, &config.render, &options.theme)?;
        }
        OutputFormat::Json => {
            let filtered = options.filter.apply(&catalog);
            let frame = compute_frame(
                &catalog,
                &filtered,
                &effective_expansion(&catalog, &options),
                options.viewport,
                &options.layout,
            );
            write_output_json(&frame, args.output.as_deref())?;
        }
    }
    Ok(())
}

fn write_output_json(frame: &TechTreeFrame, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => write_layout_dump(path, &frame.layout, &frame.connectors),
        None => {
            let dump = LayoutDump::from_layout(&frame.layout, &frame.connectors);
            println!("{}", serde_json::to_string_pretty(&dump)?);
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(name) = args.theme.as_deref() {
        config.theme =
            Theme::by_name(name).ok_or_else(|| anyhow::anyhow!("unknown theme `{name}`"))?;
        config.render.background = config.theme.background.clone();
    }
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    Ok(config)
}

fn build_render_options(args: &Args, config: &Config, catalog: &CatalogSnapshot) -> RenderOptions {
    let mut filter = FilterState::default();
    for nation in &args.nations {
        filter.nations.insert(nation.clone());
    }
    if filter.nations.is_empty()
        && let Some(nation) = config.session.default_nation.as_deref()
        && catalog.vehicles.iter().any(|vehicle| vehicle.nation == nation)
    {
        filter.nations.insert(nation.to_string());
    }
    filter.class = args.class.clone();
    filter.ratings.extend(args.ratings.iter().cloned());
    filter.search = args.search.clone().unwrap_or_default();

    RenderOptions {
        filter,
        expansion: args.expand.iter().map(String::as_str).collect(),
        expand_all: args.expand_all,
        view: args.view.into(),
        viewport: Viewport::new(config.render.width, config.render.height),
        ..RenderOptions::from_config(config)
    }
}

fn read_input(path: Option<&Path>) -> Result<(String, bool)> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok((buf, false));
        }
        let content = std::fs::read_to_string(path)?;
        return Ok((content, is_json5_path(path)));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, false))
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
