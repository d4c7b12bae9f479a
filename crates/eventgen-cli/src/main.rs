//! eventgen CLI.
//!
//! Generates Ballerina WebSocket listeners, dispatchers and clients from
//! AsyncAPI documents.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic};

use eventgen_compiler::{GenerationMode, Generator, GeneratorConfig, NumberType};

mod logging;
mod ui;

#[derive(Parser)]
#[command(name = "eventgen", version)]
#[command(about = "eventgen - generates Ballerina services and clients from AsyncAPI documents")]
struct Cli {
    /// Verbose logging (EVENTGEN_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Ballerina sources from an AsyncAPI document
    Generate {
        /// AsyncAPI document (.yaml, .yml or .json)
        spec: PathBuf,

        /// Output directory for generated sources
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Generate a client instead of a service
        #[arg(long)]
        client: bool,

        /// Make every record field optional and nullable
        #[arg(long)]
        nullable: bool,

        /// Ballerina type for untyped JSON numbers
        #[arg(long, value_enum, default_value_t = NumberArg::Decimal)]
        number: NumberArg,

        /// File whose text is prepended to every generated source
        #[arg(long)]
        license: Option<PathBuf>,
    },

    /// Validate an AsyncAPI document without generating code
    Check {
        /// AsyncAPI document (.yaml, .yml or .json)
        spec: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum NumberArg {
    Decimal,
    Float,
}

impl From<NumberArg> for NumberType {
    fn from(arg: NumberArg) -> Self {
        match arg {
            NumberArg::Decimal => NumberType::Decimal,
            NumberArg::Float => NumberType::Float,
        }
    }
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    ui::print_compact_header(env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Generate {
            spec,
            output,
            client,
            nullable,
            number,
            license,
        } => {
            let license_header = license.as_deref().map(read_license).transpose()?;
            let config = GeneratorConfig {
                spec_path: spec,
                out_dir: output,
                mode: if client {
                    GenerationMode::Client
                } else {
                    GenerationMode::Service
                },
                nullable,
                number_type: number.into(),
                license_header,
            };
            generate(config)
        }
        Commands::Check { spec } => check(spec),
    }
}

fn read_license(path: &Path) -> miette::Result<String> {
    let text = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read license header {}", path.display()))?;
    Ok(text.trim_end().to_string())
}

/// Run the full pipeline and print what was written.
fn generate(config: GeneratorConfig) -> miette::Result<()> {
    let start = Instant::now();
    let spinner = ui::spinner(&format!("Generating from {}...", config.spec_path.display()));

    let generator = Generator::new(config);
    let result = match generator.generate() {
        Ok(result) => result,
        Err(e) => {
            spinner.finish_and_clear();
            ui::nope_header();
            return Err(e.into());
        }
    };
    spinner.finish_and_clear();

    ui::success_banner("GENERATED");

    let out_dir = &generator.config().out_dir;
    ui::box_header("ARTIFACTS");
    ui::box_line("");
    ui::tree_dir("", &out_dir.display().to_string());
    for (i, file) in result.files.iter().enumerate() {
        ui::tree_item(
            "  ",
            &ui::file_link(&out_dir.join(file)),
            artifact_description(file),
            i + 1 == result.files.len(),
        );
    }
    ui::box_line("");
    ui::box_footer();
    println!();

    match generator.config().mode {
        GenerationMode::Service => println!(
            "    {} schemas {} {} service types {} {} remote functions",
            result.schemas,
            ui::symbols::DOT,
            result.service_types,
            ui::symbols::DOT,
            result.remote_functions
        ),
        GenerationMode::Client => println!("    {} schemas", result.schemas),
    }
    println!();

    ui::timing("Done", start.elapsed().as_millis());
    println!();

    ui::box_header(&format!("{} What's Next", ui::symbols::ARROW));
    ui::box_line("");
    ui::box_line(&format!("   cd {} && bal build", out_dir.display()));
    ui::box_line("");
    ui::box_footer();
    println!();

    Ok(())
}

/// Load, extract and validate; print the service types that would be generated.
fn check(spec: PathBuf) -> miette::Result<()> {
    let spinner = ui::spinner(&format!("Checking {}...", spec.display()));

    let generator = Generator::new(GeneratorConfig {
        spec_path: spec,
        ..GeneratorConfig::default()
    });

    let model = match generator.check() {
        Ok(model) => model,
        Err(e) => {
            spinner.finish_and_clear();
            ui::nope_header();
            return Err(e.into());
        }
    };
    spinner.finish_and_clear();

    ui::looking_good();
    println!();
    ui::info(&format!(
        "{} schemas {} {} service types {} {} remote functions",
        model.schemas.len(),
        ui::symbols::DOT,
        model.service_types.len(),
        ui::symbols::DOT,
        model.remote_function_count()
    ));
    ui::dim(&format!("    dispatch key: {}", model.event_path.display_path()));
    println!();

    let max_handlers = model
        .service_types
        .iter()
        .map(|s| s.remote_functions.len())
        .max()
        .unwrap_or(1);
    for service_type in &model.service_types {
        ui::service_type_line(
            &service_type.service_type_name,
            service_type.remote_functions.len(),
            max_handlers,
        );
    }
    println!();

    Ok(())
}

fn artifact_description(file: &str) -> Option<&'static str> {
    match file {
        "data_types.bal" => Some("records and type aliases"),
        "service_types.bal" => Some("service object types"),
        "listener.bal" => Some("WebSocket listener"),
        "dispatcher_service.bal" => Some("event dispatcher"),
        "client.bal" => Some("client"),
        "utils.bal" => Some("client utilities"),
        "tests/test.bal" => Some("client test stubs"),
        "Config.toml" => Some("configurable values"),
        _ => None,
    }
}
