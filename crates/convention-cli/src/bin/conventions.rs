use clap::{Parser, ValueEnum};
use convention_cli::{parse_macros, render_text, undefined_calls};
use convention_engine::{compile_str, CompileOptions};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The bidding-system document (YAML)
    #[arg(env = "CONVENTIONS_FILE")]
    file: PathBuf,

    /// Only show the position reached by this sequence (e.g. 1NT-P-2C or 1NT/2C)
    #[arg(short, long)]
    sequence: Option<String>,

    /// YAML file of macros applied ahead of the document's own
    #[arg(short, long)]
    define: Option<PathBuf>,

    /// Keep illegal and empty positions
    #[arg(long)]
    no_prune: bool,

    /// Leave relay steps unspliced
    #[arg(long)]
    no_steps: bool,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CONVENTIONS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut options = CompileOptions {
        splice_steps: !args.no_steps,
        prune: !args.no_prune,
        ..CompileOptions::default()
    };
    if let Some(path) = &args.define {
        debug!(path = %path.display(), "loading global macros");
        options.global_macros = parse_macros(&fs::read_to_string(path)?)?;
    }

    debug!(path = %args.file.display(), "compiling");
    let tree = compile_str(&fs::read_to_string(&args.file)?, &options)?;

    let id = match &args.sequence {
        Some(sequence) => tree
            .lookup(sequence)
            .ok_or_else(|| format!("no position for sequence {sequence}"))?,
        None => tree.root(),
    };
    let view = tree.view(id);

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        Format::Text => {
            print!("{}", render_text(&view));
            if args.sequence.is_some() {
                let undefined: Vec<String> = undefined_calls(&tree, id)
                    .into_iter()
                    .map(|call| call.render())
                    .collect();
                if !undefined.is_empty() {
                    println!("\nUndefined: {}", undefined.join(" "));
                }
            }
        }
    }
    Ok(())
}

fn main() {
    init_tracing();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
