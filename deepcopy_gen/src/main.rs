use clap::{Parser, Subcommand};
use deepcopy_gen::cmds;
use deepcopy_gen::codegen::{DEFAULT_POOL_HEADER, DeepcopyGeneratorOptions};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "deepcopy-gen")]
#[command(about = "Deep-copy function generator for registry-described C types", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Generate deep-copy functions from registry type definitions */
    Codegen {
        /* Input YAML registry files */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Output directory for generated code */
        #[arg(
            short = 'o',
            long = "output",
            value_name = "DIR",
            default_value = "generated"
        )]
        output_dir: PathBuf,

        /* Base name of the generated .h/.cpp pair */
        #[arg(long = "basename", default_value = "deepcopy")]
        basename: String,

        /* Prefix of every generated function name */
        #[arg(long = "prefix", default_value = "deepcopy_")]
        prefix: String,

        /* Name of the pool class passed to every copy function */
        #[arg(long = "pool-type", default_value = "Pool")]
        pool_type: String,

        /* Wrap generated declarations and definitions in this namespace */
        #[arg(long = "namespace")]
        namespace: Option<String>,

        /* Extra header includes, e.g. types.h or <vulkan/vulkan.h> */
        #[arg(long = "include", value_name = "HEADER")]
        includes: Vec<String>,

        /* Only generate for these types and what they reach */
        #[arg(long = "root", value_name = "TYPE")]
        roots: Vec<String>,

        /* Also write the pool runtime header */
        #[arg(long = "emit-runtime")]
        emit_runtime: bool,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /* Analyze registry definitions and show how each member is copied */
    Analyze {
        /* Input YAML registry files */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Print the report as JSON */
        #[arg(long = "json")]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Codegen {
            files,
            output_dir,
            basename,
            prefix,
            pool_type,
            namespace,
            includes,
            roots,
            emit_runtime,
            verbose,
        } => {
            init_tracing(verbose);
            let options = DeepcopyGeneratorOptions {
                prefix,
                pool_type,
                namespace,
                includes,
                pool_header: DEFAULT_POOL_HEADER.to_string(),
                basename,
                roots,
                ..Default::default()
            };
            cmds::codegen::run(files, output_dir, options, emit_runtime, verbose)?;
        }

        Commands::Analyze { files, json } => {
            init_tracing(false);
            cmds::analyze::run(files, json)?;
        }
    }

    Ok(())
}
