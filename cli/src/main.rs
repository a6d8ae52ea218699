#![expect(clippy::print_stderr, clippy::print_stdout)]
use crate::cli::{Args, Command};
use anyhow::{Context, bail};
use clap::Parser;
use oxrdf::{BlankNode, Graph, NamedNode, Term};
use oxrdfio::{RdfFormat, RdfParser};
use oxshex::{
    BatchOptions, FixedAssociation, ShapeLabel, ShapeMap, ShapeMapShape, ShapesSchema,
    ShexValidator, ValidationLimits,
};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

mod cli;

pub fn main() -> anyhow::Result<ExitCode> {
    let matches = Args::parse();
    match matches.command {
        Command::Validate {
            schema,
            data,
            format,
            base,
            shape_map,
            node,
            shape,
            bail,
            debug,
            max_recursion_depth,
            max_search_space,
        } => {
            init_tracing(debug);

            let start = Instant::now();
            let schema = load_schema(&schema)?;
            debug!(elapsed = ?start.elapsed(), shapes = schema.len(), "Loaded schema");

            let start = Instant::now();
            let graph = load_graph(&data, format.as_deref(), base.as_deref())?;
            debug!(elapsed = ?start.elapsed(), triples = graph.len(), "Loaded data");

            let associations = if let Some(shape_map) = shape_map {
                let json = fs::read_to_string(&shape_map)
                    .with_context(|| format!("Failed to read {}", shape_map.display()))?;
                ShapeMap::from_json_str(&json)
                    .with_context(|| format!("Invalid shape map {}", shape_map.display()))?
                    .resolve(&graph)
            } else if let Some(node) = node {
                let shape = if let Some(shape) = shape {
                    ShapeMapShape::Label(parse_label(&shape)?)
                } else {
                    ShapeMapShape::Start
                };
                vec![FixedAssociation::new(parse_term(&node)?, shape)]
            } else {
                bail!("Either a shape map or a node to validate is required")
            };

            let mut limits = ValidationLimits::default();
            if let Some(depth) = max_recursion_depth {
                limits = limits.with_max_recursion_depth(depth);
            }
            if let Some(size) = max_search_space {
                limits = limits.with_max_search_space(size);
            }

            let start = Instant::now();
            let mut validator = ShexValidator::with_limits(&schema, &graph, limits);
            let report =
                validator.validate_shape_map(&associations, BatchOptions { fail_fast: bail });
            debug!(elapsed = ?start.elapsed(), pairs = report.len(), "Validated");

            for result in &report {
                if result.status.is_conformant() {
                    if debug {
                        println!("{result}");
                    }
                } else {
                    eprintln!("{result}");
                }
            }
            let conforms = report.conforms();
            if debug {
                println!("Result: {}", if conforms { "passed" } else { "failed" });
            }
            Ok(if conforms {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

/// Logs to stderr, filtered by `RUST_LOG` unless `--debug` is set.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("oxshex=debug,oxshex_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_schema(path: &Path) -> anyhow::Result<ShapesSchema> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let schema = ShapesSchema::from_shexj_reader(BufReader::new(file))
        .with_context(|| format!("Invalid ShExJ schema {}", path.display()))?;
    schema
        .check_patterns()
        .with_context(|| format!("Invalid pattern in schema {}", path.display()))?;
    if let Err(e) = schema.validate_refs() {
        warn!("{e}, nodes referring to it will not conform");
    }
    Ok(schema)
}

fn load_graph(path: &Path, format: Option<&str>, base: Option<&str>) -> anyhow::Result<Graph> {
    let format = if let Some(format) = format {
        rdf_format_from_name(format)?
    } else {
        rdf_format_from_path(path)?
    };
    let base = if let Some(base) = base {
        base.to_owned()
    } else {
        file_iri(path)?
    };
    let parser = RdfParser::from_format(format)
        .with_base_iri(&base)
        .with_context(|| format!("Invalid base IRI {base}"))?;
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut graph = Graph::new();
    for quad in parser.for_reader(BufReader::new(file)) {
        let quad = quad.with_context(|| format!("Failed to parse {}", path.display()))?;
        graph.insert(quad.as_ref());
    }
    Ok(graph)
}

fn file_iri(path: &Path) -> anyhow::Result<String> {
    let path = fs::canonicalize(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    match Url::from_file_path(&path) {
        Ok(url) => Ok(url.into()),
        Err(()) => bail!("Not able to build a file IRI for {}", path.display()),
    }
}

fn format_from_path<T>(
    path: &Path,
    from_extension: impl FnOnce(&str) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    if let Some(ext) = path.extension().and_then(OsStr::to_str) {
        from_extension(ext).map_err(|e| {
            e.context(format!(
                "Not able to guess the file format from file name extension '{ext}'"
            ))
        })
    } else {
        bail!(
            "The path {} has no extension to guess a file format from",
            path.display()
        )
    }
}

fn rdf_format_from_path(path: &Path) -> anyhow::Result<RdfFormat> {
    format_from_path(path, |ext| {
        RdfFormat::from_extension(ext)
            .with_context(|| format!("The file extension '{ext}' is unknown"))
    })
}

fn rdf_format_from_name(name: &str) -> anyhow::Result<RdfFormat> {
    if let Some(t) = RdfFormat::from_extension(name) {
        return Ok(t);
    }
    if let Some(t) = RdfFormat::from_media_type(name) {
        return Ok(t);
    }
    bail!("The file format '{name}' is unknown")
}

/// `_:id` is a blank node, anything else must be an absolute IRI.
fn parse_term(value: &str) -> anyhow::Result<Term> {
    Ok(if let Some(id) = value.strip_prefix("_:") {
        BlankNode::new(id)
            .with_context(|| format!("Invalid blank node {value}"))?
            .into()
    } else {
        NamedNode::new(value)
            .with_context(|| format!("Invalid IRI {value}"))?
            .into()
    })
}

fn parse_label(value: &str) -> anyhow::Result<ShapeLabel> {
    Ok(match parse_term(value)? {
        Term::NamedNode(node) => node.into(),
        Term::BlankNode(node) => node.into(),
        term => bail!("{term} is not a valid shape label"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_term() {
        assert_eq!(
            parse_term("http://example.com/s").unwrap(),
            Term::from(NamedNode::new_unchecked("http://example.com/s"))
        );
        assert_eq!(
            parse_term("_:b1").unwrap(),
            Term::from(BlankNode::new_unchecked("b1"))
        );
        parse_term("not an iri").unwrap_err();
    }

    #[test]
    fn test_format_guessing() {
        assert_eq!(
            rdf_format_from_path(Path::new("data.ttl")).unwrap(),
            RdfFormat::Turtle
        );
        assert_eq!(
            rdf_format_from_name("application/n-triples").unwrap(),
            RdfFormat::NTriples
        );
        rdf_format_from_path(Path::new("data")).unwrap_err();
        rdf_format_from_name("foo").unwrap_err();
    }
}
