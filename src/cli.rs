use crate::config::{Config, load_config};
use crate::ir::ConnectionKind;
use crate::layout::compute_layout_with_rng;
use crate::layout_dump::{layout_dump_json, write_layout_dump};
use crate::library::{JsonFileStore, Library, LibraryDocument, MemoryStore, TrackStore};
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::synthetic::benchmark_routing;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "DJGRAPH_LOG";

#[derive(Parser, Debug)]
#[command(name = "djgraph", version, about = "Lay out and route a graph of track connections")]
pub struct Args {
    /// Library JSON file ({"tracks": [...], "connections": [...]}) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Seed for the layout jitter
    #[arg(long)]
    pub seed: Option<u64>,

    /// Record a connection between two "Title - Artist" entries before rendering
    #[arg(long, num_args = 2, value_names = ["TRACK_A", "TRACK_B"])]
    pub connect: Option<Vec<String>>,

    /// Connection type for --connect
    #[arg(long, value_enum, default_value = "transition")]
    pub kind: KindArg,

    /// Delete a connection by id before rendering
    #[arg(long)]
    pub delete: Option<String>,

    /// Remove every track and connection from the library
    #[arg(long)]
    pub clear: bool,

    /// Route a synthetic NODES:EDGES graph and report timing instead of rendering
    #[arg(long, value_name = "NODES:EDGES")]
    pub benchmark: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum KindArg {
    Transition,
    Mashup,
}

impl From<KindArg> for ConnectionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Transition => ConnectionKind::Transition,
            KindArg::Mashup => ConnectionKind::Mashup,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if let Some(size) = args.benchmark.as_deref() {
        let (nodes, edges) = parse_benchmark_size(size)?;
        let report = benchmark_routing(nodes, edges, &mut rng, &config.routing);
        println!(
            "routed {} of {} edges across {} nodes in {:.2}ms ({:.0} edges/s), path length improvement {:.1}%",
            report.optimized.len(),
            report.edge_count,
            report.node_count,
            report.duration.as_secs_f64() * 1000.0,
            report.edges_per_second,
            report.improvement_percent
        );
        return Ok(());
    }

    let graph = match args.input.as_deref() {
        Some(path) if path != Path::new("-") => {
            let mut library = Library::new(JsonFileStore::open(path)?);
            apply_mutations(&mut library, &args)?;
            library.graph(Utc::now())?
        }
        _ => {
            let doc = read_stdin_document()?;
            let mut library = Library::new(MemoryStore::from_document(doc));
            apply_mutations(&mut library, &args)?;
            library.graph(Utc::now())?
        }
    };

    let layout = compute_layout_with_rng(&graph, &config.layout, &config.routing, &mut rng);
    tracing::info!(
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        "layout computed"
    );
    write_layout(&layout, &config, &args)
}

fn write_layout(layout: &crate::layout::Layout, config: &Config, args: &Args) -> Result<()> {
    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(layout, &config.theme, &config.routing, &config.render);
            write_output_svg(&svg, args.output.as_deref())
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(layout, &config.theme, &config.routing, &config.render);
            write_output_png(&svg, &output, &config.render)
        }
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => write_layout_dump(path, layout, config.routing.curvature),
            None => {
                println!("{}", layout_dump_json(layout, config.routing.curvature)?);
                Ok(())
            }
        },
    }
}

fn apply_mutations<S: TrackStore>(library: &mut Library<S>, args: &Args) -> Result<()> {
    if args.clear {
        library.clear_all()?;
    }
    if let Some(id) = args.delete.as_deref() {
        library.delete_connection(id)?;
    }
    if let Some(pair) = args.connect.as_deref() {
        if let [track_a, track_b] = pair {
            let conn = library.add_connection(track_a, track_b, args.kind.into())?;
            tracing::info!(
                id = %conn.id,
                from = %conn.track_a,
                to = %conn.track_b,
                "connection recorded"
            );
        }
    }
    Ok(())
}

fn read_stdin_document() -> Result<LibraryDocument> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    if buf.trim().is_empty() {
        return Ok(LibraryDocument::default());
    }
    serde_json::from_str(&buf).context("stdin is not a library document")
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn parse_benchmark_size(raw: &str) -> Result<(usize, usize)> {
    let (nodes, edges) = raw
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("benchmark expects NODES:EDGES, got `{raw}`"))?;
    let nodes = nodes.trim().parse::<usize>().context("invalid node count")?;
    let edges = edges.trim().parse::<usize>().context("invalid edge count")?;
    Ok((nodes, edges))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_benchmark_size() {
        assert_eq!(parse_benchmark_size("100:250").unwrap(), (100, 250));
        assert_eq!(parse_benchmark_size(" 5 : 0 ").unwrap(), (5, 0));
        assert!(parse_benchmark_size("100").is_err());
        assert!(parse_benchmark_size("a:b").is_err());
    }

    #[test]
    fn args_accept_connect_pair() {
        let args = Args::try_parse_from([
            "djgraph",
            "-i",
            "library.json",
            "--connect",
            "Strobe - deadmau5",
            "Opus - Eric Prydz",
            "--kind",
            "mashup",
            "-e",
            "json",
        ])
        .unwrap();
        assert_eq!(args.connect.as_ref().map(Vec::len), Some(2));
        assert!(matches!(args.kind, KindArg::Mashup));
        assert!(matches!(args.output_format, OutputFormat::Json));
    }

    #[test]
    fn mutations_apply_in_order() {
        let mut library = Library::new(MemoryStore::new());
        let args = Args::try_parse_from(["djgraph", "--connect", "A - X", "B - Y"]).unwrap();
        apply_mutations(&mut library, &args).unwrap();
        let args =
            Args::try_parse_from(["djgraph", "--clear", "--connect", "C - Z", "D - W"]).unwrap();
        apply_mutations(&mut library, &args).unwrap();
        let tracks = library.store().list_tracks().unwrap();
        let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c-z", "d-w"]);
        let connections = library.store().list_connections().unwrap();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].kind, ConnectionKind::Transition);
    }
}
