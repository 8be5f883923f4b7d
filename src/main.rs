use anyhow::Result;
use clap::Parser;
use crossterm::style::{style, Stylize};
use service_loader::{samples, LoaderConfig, ServiceCatalog, ServiceLoader};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser, Debug)]
#[command(name = "service-loader")]
#[command(about = "Ordered startup and shutdown of registered application services")]
#[command(version)]
#[command(long_about = "Discovers the registered services, starts them one at a time in \
ascending sort order and shuts them down again on SIGINT/SIGTERM. Services can be disabled \
through the configuration file without touching code.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "services.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting any service")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// List registered services and exit
    #[arg(long, help = "List discovered services with their sort order, kind and state")]
    list: bool,

    /// Emit the service listing as JSON
    #[arg(long, requires = "list", help = "Print the --list output as JSON")]
    json: bool,

    /// Add a service identity to the disabled list
    #[arg(long, value_name = "IDENTITY", help = "Disable a service and save the configuration")]
    disable: Vec<String>,

    /// Remove a service identity from the disabled list
    #[arg(long, value_name = "IDENTITY", help = "Enable a service and save the configuration")]
    enable: Vec<String>,

    /// Start all services even when auto-start is off
    #[arg(long, help = "Start all services regardless of auto_start_on_boot")]
    start: bool,

    /// Dry run mode - discover but don't start services
    #[arg(long, help = "Perform dry run - discover services but don't start them")]
    dry_run: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, value_name = "DIR", help = "Directory for daily rolling log files")]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle special modes that don't require full initialization
    if args.print_config {
        print_default_config();
        return Ok(());
    }

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = init_logging(&args)?;

    info!("Starting service loader v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    // Load and validate configuration
    let mut config = match LoaderConfig::load_from_file(&args.config) {
        Ok(config) => {
            info!("Configuration loaded successfully from: {}", args.config);
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                info!("Configuration validation successful");
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    if !args.disable.is_empty() || !args.enable.is_empty() {
        for identity in &args.disable {
            if config.set_disabled(identity, true) {
                info!("Disabled service {}", identity);
            }
        }
        for identity in &args.enable {
            if config.set_disabled(identity, false) {
                info!("Enabled service {}", identity);
            }
        }

        config.validate()?;
        config.save_to_file(&args.config)?;
        println!("✓ Saved {}", args.config);
        println!("  Disabled services: {:?}", config.disabled_services);
        return Ok(());
    }

    let catalog = samples::register(ServiceCatalog::new());
    let mut loader = ServiceLoader::new(catalog, config.into_shared());

    if args.list {
        loader.discover()?;
        print_services(&loader, args.json)?;
        return Ok(());
    }

    if args.dry_run {
        loader.discover()?;
        info!("Dry run mode - services discovered but not started");
        println!(
            "✓ Dry run completed successfully - {} service(s) discovered",
            loader.registry().len()
        );
        return Ok(());
    }

    // Boot hook; a failing start aborts the process
    loader.boot().await.map_err(|e| {
        error!("Failed to start services: {}", e);
        e
    })?;

    if args.start {
        loader.start_all().await.map_err(|e| {
            error!("Failed to start services: {}", e);
            e
        })?;
    }

    // Run until a shutdown signal arrives
    let exit_code = loader.run().await.map_err(|e| {
        error!("Service loader error during execution: {}", e);
        e
    })?;

    info!("Service loader exited with code: {}", exit_code);
    drop(_log_guard);

    // Exit with appropriate code for systemd
    std::process::exit(exit_code);
}

fn init_logging(args: &Args) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Determine log level based on flags
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    // Create environment filter
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("service_loader={}", log_level)));

    // Configure format based on options
    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    // Optional daily rolling log file
    let (file_layer, guard) = match &args.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "service-loader.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(file_layer)
        .with(env_filter)
        .init();

    Ok(guard)
}

/// Print the registry the way the inspection window shows it
fn print_services(loader: &ServiceLoader, json: bool) -> Result<()> {
    let services = loader.services();

    if json {
        println!("{}", serde_json::to_string_pretty(&services)?);
        return Ok(());
    }

    if services.is_empty() {
        println!("No services found");
        return Ok(());
    }

    for service in services {
        let indicator = style("●").with(service.state.indicator_color());
        let header = format!("{}\t{}", service.sort_order, service.identity);

        if service.disabled {
            println!("{} {} {}", indicator, style(header).dark_grey(), style("(disabled)").dark_grey());
        } else {
            println!("{} {}", indicator, style(header).bold());
        }

        println!("\tService Type\t{}", service.kind);
        println!("\tAsync\t\t{}", service.is_async);
        println!("\tState\t\t{}", service.state);
    }

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() {
    println!("# Service Loader Configuration File");
    println!("# This is the default configuration with all available options");
    println!();

    let default_config = r#"# Start every registered service when the process boots
auto_start_on_boot = false

# Identities of services that must never be started, e.g.
# disabled_services = ["service_loader::samples::InstancedService"]
disabled_services = []

[logging]
# Emit informational messages
messages = true
# Emit warnings
warnings = true
# Emit errors
errors = true
"#;

    println!("{}", default_config);
}
