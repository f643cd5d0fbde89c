//! Request Templates CLI
//!
//! Usage:
//!   request-templates --config <FILE> [OPTIONS] <COMMAND>
//!
//! Options:
//!   -v, --verbose             Log resolution steps to stderr
//!   --log-format pretty|json  Log line format when verbose
//!
//! Commands:
//!   list                      List registered commands and groups
//!   schema <NAME>             Print the arguments a command requires
//!   describe <NAME>           Show group chain and placeholder locations
//!   compose <NAME> -a k=v     Print the resolved request descriptor

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use request_templates::logging::{self, Profile};
use request_templates::template::{merge_command, resolve_group_names};
use request_templates::{
    argument_schema, compose, Arguments, ResolveError, TemplateMap, TemplateRegistry, VendorConfig,
};

#[derive(Parser)]
#[command(name = "request-templates")]
#[command(about = "Resolve vendor command templates into request descriptors")]
struct Cli {
    /// Vendor configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    config: PathBuf,

    /// Output format for descriptors
    #[arg(short, long, value_enum, default_value_t = Format::Toml)]
    format: Format,

    /// Log resolution steps to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Log line format when verbose
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List registered commands and groups
    List,
    /// Print the arguments a command requires
    Schema { name: String },
    /// Show a command's group chain and where each placeholder comes from
    Describe { name: String },
    /// Print the resolved request descriptor for a command
    Compose {
        name: String,
        /// Argument as name=value (repeatable)
        #[arg(short, long = "arg", value_parser = parse_argument)]
        args: Vec<(String, String)>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Toml,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn profile(self) -> Profile {
        match self {
            LogFormat::Pretty => Profile::Development,
            LogFormat::Json => Profile::Production,
        }
    }
}

fn parse_argument(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got '{}'", s)),
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        logging::init(cli.log_format.profile());
    }

    let registry = load_registry(&cli.config);

    let result = match &cli.command {
        Command::List => {
            print_list(&registry);
            Ok(())
        }
        Command::Schema { name } => argument_schema(&registry, name).map(|schema| {
            for variable in schema.iter() {
                println!("{}", variable);
            }
        }),
        Command::Describe { name } => describe(&registry, name),
        Command::Compose { name, args } => {
            let args: Arguments = args.iter().cloned().collect();
            compose(&registry, name, &args)
                .map(|request| print_fields(request.fields(), cli.format))
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn load_registry(path: &Path) -> TemplateRegistry {
    let loaded = VendorConfig::from_file(path).and_then(VendorConfig::into_registry);
    match loaded {
        Ok(registry) => registry,
        Err(e) => {
            let source = fs::read_to_string(path).unwrap_or_default();
            eprintln!(
                "Error loading config '{}':\n{}",
                path.display(),
                e.format(&source, &path.display().to_string())
            );
            process::exit(1);
        }
    }
}

fn print_list(registry: &TemplateRegistry) {
    println!("commands:");
    for name in registry.command_names() {
        println!("  {}", name);
    }
    println!("groups:");
    for name in registry.group_names() {
        println!("  {}", name);
    }
}

fn describe(registry: &TemplateRegistry, name: &str) -> Result<(), ResolveError> {
    let template = registry.command(name)?;
    let schema = argument_schema(registry, name)?;
    let merged = merge_command(registry, name)?;

    let chain: Vec<&str> = resolve_group_names(template)
        .into_iter()
        .filter(|group| registry.contains_group(group))
        .collect();
    println!("command: {}", name);
    println!("groups: {}", chain.join(" -> "));
    println!("placeholders:");
    for entry in schema.entries() {
        println!(
            "  {{{}}} at {} ({})",
            entry.placeholder.variable, entry.placeholder.path, entry.origin
        );
    }
    println!("template:");
    print_fields(&merged, Format::Toml);
    Ok(())
}

fn print_fields(fields: &TemplateMap, format: Format) {
    let rendered = match format {
        Format::Toml => toml::to_string_pretty(fields).map_err(|e| e.to_string()),
        Format::Json => serde_json::to_string_pretty(fields).map_err(|e| e.to_string()),
    };
    match rendered {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error rendering descriptor: {}", e);
            process::exit(1);
        }
    }
}
