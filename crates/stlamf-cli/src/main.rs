use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use stlamf_core::config::load_config;
use stlamf_core::document::{DocumentBuilder, Unit};
use stlamf_core::mesh::Mesh;
use stlamf_core::profile::{self, ProfileAssignment, ResolveOptions};
use stlamf_core::report::ConversionReport;
use stlamf_core::{amf, archive, Document};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stlamf")]
#[command(about = "Merge STL meshes into one AMF document, optionally with per-object profiles.")]
struct Cli {
    /// STL files. With --custom_config every file is followed by a profile name.
    #[arg(value_name = "FILE | FILE PROFILE", required = true, num_args = 1..)]
    files: Vec<String>,
    /// Destination of the AMF document (`-` for stdout). Defaults to the first
    /// input with an `.amf` extension.
    #[arg(long = "output_path", visible_alias = "output-path", value_name = "PATH")]
    output_path: Option<PathBuf>,
    /// Read FILE PROFILE pairs instead of plain files.
    #[arg(long = "custom_config", visible_alias = "custom-config")]
    custom_config: bool,
    /// YAML or JSON file mapping profile names to settings.
    #[arg(long = "config_path", visible_alias = "config-path", value_name = "PATH")]
    config_path: Option<PathBuf>,
    /// Profile applied to every file (ignored with --custom_config).
    #[arg(long, value_name = "NAME", conflicts_with = "custom_config")]
    profile: Option<String>,
    #[arg(long, default_value_t = Unit::Millimeter)]
    unit: Unit,
    /// Add a constellation instancing every object.
    #[arg(long)]
    constellation: bool,
    /// Wrap the markup in a ZIP container.
    #[arg(long)]
    zip: bool,
    /// Write a JSON summary of the conversion.
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    convert(&cli)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn convert(cli: &Cli) -> Result<()> {
    let config = match &cli.config_path {
        Some(path) => Some(load_config(path).context("load configuration")?),
        None => None,
    };

    let options = ResolveOptions {
        custom_config: cli.custom_config,
        global_profile: cli.profile.clone(),
    };
    let assignment =
        profile::resolve(&cli.files, &options, config.as_ref()).context("resolve profiles")?;
    for source in assignment.sources() {
        ensure_input_file(source.path())?;
    }

    let meshes = read_meshes(&assignment)?;
    let document = DocumentBuilder::new()
        .unit(cli.unit)
        .constellation(cli.constellation)
        .build(meshes, &assignment)
        .context("build AMF document")?;

    let report = ConversionReport::from_document(&document);
    info!(
        objects = report.objects.len(),
        materials = report.materials.len(),
        triangles = report.total_triangles(),
        "document built"
    );

    let output = output_path(cli);
    match &output {
        Some(path) => write_file(&document, path, cli.zip)?,
        None => write_stdout(&document, cli.zip)?,
    }

    if let Some(path) = &cli.summary {
        let json = serde_json::to_string_pretty(&report).context("serialize summary")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        std::fs::write(path, &json).with_context(|| format!("write summary: {path:?}"))?;
    }

    Ok(())
}

/// Parses every input on the rayon pool. Results come back in input order, so
/// the first failing file on the command line is the one reported.
fn read_meshes(assignment: &ProfileAssignment) -> Result<Vec<Mesh>> {
    let results: Vec<_> = assignment
        .entries()
        .par_iter()
        .map(|entry| stlamf_stl::read_stl(entry.source.clone()))
        .collect();

    let mut meshes = Vec::with_capacity(results.len());
    for (entry, result) in assignment.entries().iter().zip(results) {
        let mesh = result.with_context(|| format!("parse STL: {:?}", entry.source.path))?;
        debug!(
            path = ?entry.source.path,
            triangles = mesh.triangle_count(),
            profile = entry.profile.as_ref().map(|p| p.name.as_str()),
            "read mesh"
        );
        meshes.push(mesh);
    }
    Ok(meshes)
}

fn output_path(cli: &Cli) -> Option<PathBuf> {
    match &cli.output_path {
        Some(path) if path.as_os_str() == "-" => None,
        Some(path) => Some(path.clone()),
        None => Some(Path::new(&cli.files[0]).with_extension("amf")),
    }
}

/// Writes into a temporary file next to `path` and renames it into place, so an
/// existing output is never left half-written.
fn write_file(document: &Document, path: &Path, zip: bool) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).with_context(|| format!("create output directory: {dir:?}"))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temporary file in {dir:?}"))?;
    if zip {
        let entry = entry_name(Some(path));
        archive::write_zipped(document, &mut tmp, &entry)
            .with_context(|| format!("write output: {path:?}"))?;
    } else {
        amf::write_amf(document, &mut tmp).with_context(|| format!("write output: {path:?}"))?;
    }
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("sync output: {path:?}"))?;
    tmp.persist(path)
        .with_context(|| format!("write output: {path:?}"))?;
    info!(path = ?path, "wrote AMF");
    Ok(())
}

fn write_stdout(document: &Document, zip: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    if zip {
        let mut buf = Cursor::new(Vec::new());
        archive::write_zipped(document, &mut buf, &entry_name(None)).context("write output")?;
        lock.write_all(buf.get_ref()).context("write output")?;
        lock.flush().context("write output")?;
    } else {
        amf::write_amf(document, lock).context("write output")?;
    }
    Ok(())
}

fn entry_name(path: Option<&Path>) -> String {
    path.and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .map(|s| format!("{s}.amf"))
        .unwrap_or_else(|| "model.amf".to_string())
}

fn ensure_input_file(input: &Path) -> Result<()> {
    match std::fs::metadata(input) {
        Ok(meta) => {
            if meta.is_file() {
                Ok(())
            } else {
                bail!("input is not a file: {input:?}");
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            bail!("input not found: {input:?} (cwd: {cwd:?}).");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}
