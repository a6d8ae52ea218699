use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "oxshex")]
/// ShEx validation of RDF files
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate nodes of an RDF file against a ShEx schema
    ///
    /// Each (node, shape) pair that does not conform is reported on the standard error
    /// as `<node>@<shape> failed` and the process exits with status 1.
    Validate {
        /// ShExJ file containing the schema
        #[arg(short = 'x', long, value_hint = ValueHint::FilePath)]
        schema: PathBuf,
        /// RDF file containing the data
        ///
        /// All graphs of a dataset file are merged into a single graph.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        data: PathBuf,
        /// The format of the data file
        ///
        /// It can be an extension like "nt" or a MIME type like "application/n-triples".
        ///
        /// By default the format is guessed from the data file extension.
        #[arg(long, required = false)]
        format: Option<String>,
        /// Base IRI of the data file
        ///
        /// By default the `file:` IRI of the data file is used.
        #[arg(long, value_hint = ValueHint::Url)]
        base: Option<String>,
        /// JSON shape map listing the (node, shape) pairs to validate
        #[arg(short = 'm', long, value_hint = ValueHint::FilePath, conflicts_with_all = ["node", "shape"], required_unless_present = "node")]
        shape_map: Option<PathBuf>,
        /// IRI or blank node (`_:id`) to validate
        #[arg(short, long)]
        node: Option<String>,
        /// Shape to validate the node against
        ///
        /// By default the start shape of the schema is used.
        #[arg(short, long, requires = "node")]
        shape: Option<String>,
        /// Stop after the first pair that does not conform
        #[arg(short, long)]
        bail: bool,
        /// Log the validation steps and print the pairs that conform
        #[arg(long)]
        debug: bool,
        /// Maximal nesting of shape references
        #[arg(long)]
        max_recursion_depth: Option<usize>,
        /// Maximal number of arc assignments tried for a single shape
        #[arg(long)]
        max_search_space: Option<usize>,
    },
}
