//! Command-line interface for xmlhint

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs::File;
#[cfg(feature = "cli")]
use std::io::{BufWriter, Write};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use xmlhint::loaders::{load_bindings, load_value_table};
#[cfg(feature = "cli")]
use xmlhint::{HintGenerator, ScriptOptions, TypeRef};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xmlhint")]
#[command(author, version, about = "XML autocompletion hint generator", long_about = None)]
struct Cli {
    /// Log traversal details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the hint script for a root type
    Generate {
        /// Path to the binding schema (JSON)
        #[arg(short, long, value_name = "SCHEMA")]
        schema: PathBuf,

        /// Type to start from
        #[arg(short, long, value_name = "TYPE")]
        root: String,

        /// Attribute value table (JSON) for attributes that are not boolean or enum
        #[arg(long, value_name = "FILE")]
        values: Option<PathBuf>,

        /// Variable the hints are assigned to
        #[arg(long, default_value = "tags")]
        variable: String,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the types that can be used as a root
    Roots {
        /// Path to the binding schema (JSON)
        #[arg(short, long, value_name = "SCHEMA")]
        schema: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            schema,
            root,
            values,
            variable,
            pretty,
            output,
        } => cmd_generate(schema, root, values, variable, pretty, output),
        Commands::Roots { schema, json } => cmd_roots(schema, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn init_logging(verbose: bool) {
    let default = if verbose { "xmlhint=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn cmd_generate(
    schema_path: PathBuf,
    root: String,
    values: Option<PathBuf>,
    variable: String,
    pretty: bool,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = load_bindings(&schema_path)?;
    let root = TypeRef::new(root);
    if registry.get(&root).is_none() {
        return Err(format!("Unknown type: {}", root).into());
    }

    let mut generator = HintGenerator::new(registry);
    if let Some(values_path) = values {
        generator = generator.with_value_factory(load_value_table(&values_path)?);
    }

    let hints = generator
        .hints_for(&root)
        .ok_or_else(|| format!("Type '{}' has no root element, no hints available", root))?;

    let options = ScriptOptions::new().with_variable(variable).with_pretty(pretty);

    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(&path)?);
            hints.write_script(&mut writer, &options)?;
            writeln!(writer)?;
            writer.flush()?;
            eprintln!("Wrote {} tags to {}", hints.registry().len(), path.display());
        }
        None => println!("{}", hints.try_to_script(&options)?),
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_roots(schema_path: PathBuf, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let registry = load_bindings(&schema_path)?;

    let roots: Vec<(String, String)> = registry
        .iter()
        .filter_map(|b| b.tag_name().map(|tag| (b.name.to_string(), tag)))
        .collect();

    if json_output {
        let map: serde_json::Map<String, serde_json::Value> = roots
            .into_iter()
            .map(|(ty, tag)| (ty, serde_json::Value::String(tag)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        println!("=== Root Elements ({}) ===", roots.len());
        for (ty, tag) in roots {
            println!("  {} : <{}>", ty, tag);
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
