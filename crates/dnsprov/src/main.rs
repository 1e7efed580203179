// # dnsprov - DNS provisioning for one domain
//
// This binary is a THIN integration layer:
// 1. Parse the command line and read the environment
// 2. Initialize logging and the runtime
// 3. Register providers and build the configured one
// 4. Run (or, in dry-run mode, plan) the provisioning engine
//
// All provisioning logic lives in dnsprov-core.
//
// ## Usage
//
// ```bash
// export AWS_ACCESS_KEY_ID=AKIA...
// export AWS_SECRET_ACCESS_KEY=...
//
// dnsprov example.com 203.0.113.5
// dnsprov example.com 203.0.113.5 --ttl 300 --dry-run
// ```
//
// ## Configuration
//
// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`: Credentials (required)
// - `AWS_SESSION_TOKEN`: Session token for temporary credentials
// - `DNSPROV_PROVIDER_TYPE`: Provider type (route53)
// - `DNSPROV_REGISTRAR_REGION`: Route 53 Domains region (default us-east-1)
// - `DNSPROV_ROUTE53_ENDPOINT`, `DNSPROV_DOMAINS_ENDPOINT`: Endpoint overrides
// - `DNSPROV_MODE`: `dry-run` to plan without changing anything
// - `DNSPROV_LOG_LEVEL`: trace, debug, info, warn, error (default info)

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use dnsprov_core::config::DEFAULT_REGISTRAR_REGION;
use dnsprov_core::{ProviderConfig, ProvisionConfig, Provisioner};
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Success
/// - 1: Usage or configuration error, or the address record upsert failed
/// - 2: Any other provisioning failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DnsprovExitCode {
    /// Provisioning completed (or the plan was printed)
    Success,
    /// Missing/invalid argument or configuration
    UsageError,
    /// The address record upsert failed
    RecordUpsertFailed,
    /// Unexpected failure in any other step
    ProvisionError,
}

impl DnsprovExitCode {
    fn code(self) -> u8 {
        match self {
            DnsprovExitCode::Success => 0,
            DnsprovExitCode::UsageError | DnsprovExitCode::RecordUpsertFailed => 1,
            DnsprovExitCode::ProvisionError => 2,
        }
    }

    /// Exit code for an engine error
    fn for_error(err: &dnsprov_core::Error) -> Self {
        match err {
            dnsprov_core::Error::RecordUpsert { .. } => DnsprovExitCode::RecordUpsertFailed,
            dnsprov_core::Error::Config(_) => DnsprovExitCode::UsageError,
            _ => DnsprovExitCode::ProvisionError,
        }
    }
}

impl From<DnsprovExitCode> for ExitCode {
    fn from(code: DnsprovExitCode) -> Self {
        ExitCode::from(code.code())
    }
}

#[derive(Parser, Debug)]
#[command(name = "dnsprov")]
#[command(about = "Provision a hosted zone, its delegation and an A record for one domain")]
#[command(version)]
struct Cli {
    /// Domain to provision (e.g. example.com)
    domain_name: String,

    /// IP address the A record should point at
    public_ip: String,

    /// TTL of the A record in seconds
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    ttl: u32,

    /// Print the planned changes without applying them
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DNSPROV_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Application configuration
///
/// Built from the command line plus environment variables.
struct Config {
    domain: String,
    public_ip: String,
    ttl: u32,
    dry_run: bool,
    provider_type: String,
    access_key_id: Option<String>,
    /// ⚠️ NEVER log this value
    secret_access_key: Option<String>,
    /// ⚠️ NEVER log this value
    session_token: Option<String>,
    registrar_region: String,
    route53_endpoint: Option<String>,
    domains_endpoint: Option<String>,
}

impl Config {
    /// Load configuration from the environment
    fn from_env(cli: Cli) -> Self {
        Self::from_lookup(cli, |key| env::var(key).ok())
    }

    /// Load configuration with an explicit variable lookup
    fn from_lookup(cli: Cli, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let dry_run_env = lookup("DNSPROV_MODE")
            .unwrap_or_default()
            .to_lowercase()
            == "dry-run";

        Self {
            domain: cli.domain_name,
            public_ip: cli.public_ip,
            ttl: cli.ttl,
            dry_run: cli.dry_run || dry_run_env,
            provider_type: non_empty("DNSPROV_PROVIDER_TYPE")
                .unwrap_or_else(|| "route53".to_string()),
            access_key_id: non_empty("AWS_ACCESS_KEY_ID"),
            secret_access_key: non_empty("AWS_SECRET_ACCESS_KEY"),
            session_token: non_empty("AWS_SESSION_TOKEN"),
            registrar_region: non_empty("DNSPROV_REGISTRAR_REGION")
                .unwrap_or_else(|| DEFAULT_REGISTRAR_REGION.to_string()),
            route53_endpoint: non_empty("DNSPROV_ROUTE53_ENDPOINT"),
            domains_endpoint: non_empty("DNSPROV_DOMAINS_ENDPOINT"),
        }
    }

    /// Validate the configuration
    ///
    /// Runs before any network call.
    fn validate(&self) -> Result<()> {
        if self.domain.is_empty() {
            anyhow::bail!("Domain name is required");
        }
        if self.public_ip.is_empty() {
            anyhow::bail!("Public IP is required");
        }

        match self.provider_type.as_str() {
            "route53" => {}
            _ => anyhow::bail!(
                "DNSPROV_PROVIDER_TYPE '{}' is not supported. \
                Supported providers: route53",
                self.provider_type
            ),
        }

        if self.access_key_id.is_none() {
            anyhow::bail!(
                "AWS_ACCESS_KEY_ID is required. \
                Set it via: export AWS_ACCESS_KEY_ID=your_key_id"
            );
        }
        if self.secret_access_key.is_none() {
            anyhow::bail!(
                "AWS_SECRET_ACCESS_KEY is required. \
                Set it via: export AWS_SECRET_ACCESS_KEY=your_secret"
            );
        }

        for (name, endpoint) in [
            ("DNSPROV_ROUTE53_ENDPOINT", &self.route53_endpoint),
            ("DNSPROV_DOMAINS_ENDPOINT", &self.domains_endpoint),
        ] {
            if let Some(url) = endpoint
                && !url.starts_with("https://")
                && !url.starts_with("http://")
            {
                anyhow::bail!("{} must use HTTP or HTTPS scheme. Got: {}", name, url);
            }
        }

        Ok(())
    }

    /// Engine configuration
    fn provision_config(&self) -> ProvisionConfig {
        let provider = ProviderConfig::Route53 {
            access_key_id: self.access_key_id.clone().unwrap_or_default(),
            secret_access_key: self.secret_access_key.clone().unwrap_or_default(),
            session_token: self.session_token.clone(),
            registrar_region: self.registrar_region.clone(),
            route53_endpoint: self.route53_endpoint.clone(),
            domains_endpoint: self.domains_endpoint.clone(),
        };

        let mut config = ProvisionConfig::new(self.domain.clone(), self.public_ip.clone(), provider);
        config.record.ttl = self.ttl;
        config.dry_run = self.dry_run;
        config
    }
}

/// Parse a log level name
fn parse_log_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Exit code for a command line parse failure
///
/// clap exits with 2 on usage errors; missing arguments exit 1 here.
fn exit_code_for_parse_error(kind: ErrorKind) -> DnsprovExitCode {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => DnsprovExitCode::Success,
        _ => DnsprovExitCode::UsageError,
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return exit_code_for_parse_error(e.kind()).into();
        }
    };

    // Initialize tracing
    let Some(log_level) = parse_log_level(&cli.log_level) else {
        eprintln!(
            "DNSPROV_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            cli.log_level
        );
        return DnsprovExitCode::UsageError.into();
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DnsprovExitCode::UsageError.into();
    }

    // Load and validate configuration
    let config = Config::from_env(cli);
    if let Err(e) = config.validate() {
        error!("{}", e);
        return DnsprovExitCode::UsageError.into();
    }

    let provision = config.provision_config();
    if let Err(e) = provision.validate() {
        error!("{}", e);
        return DnsprovExitCode::UsageError.into();
    }

    // One request at a time; no background tasks
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnsprovExitCode::ProvisionError.into();
        }
    };

    let result = rt.block_on(async {
        match run(&config.provider_type, provision).await {
            Ok(()) => DnsprovExitCode::Success,
            Err(e) => {
                error!("Provisioning failed: {}", e);
                DnsprovExitCode::for_error(&e)
            }
        }
    });

    result.into()
}

/// Build the provider and run the engine
async fn run(provider_type: &str, config: ProvisionConfig) -> dnsprov_core::Result<()> {
    let registry = dnsprov_core::ProviderRegistry::new();

    #[cfg(feature = "route53")]
    {
        info!("Registering Route 53 provider");
        dnsprov_provider_route53::register(&registry);
    }

    #[cfg(not(feature = "route53"))]
    warn!("Built without the route53 feature; no providers registered");

    info!("Provider type: {}", provider_type);
    let provider = registry.create_provider(&config.provider)?;
    let provisioner = Provisioner::new(provider, &config)?;

    if config.dry_run {
        warn!("Running in DRY-RUN mode - no changes will be made");
        let plan = provisioner.plan().await?;
        println!("{}", plan);
        info!("Plan complete: {} change(s) pending", plan.mutation_count());
        return Ok(());
    }

    let report = provisioner.run().await?;
    info!(
        "Provisioned {}: zone {}{}, delegation {}, record change {} ({})",
        provisioner.domain(),
        report.zone_id,
        if report.zone_created { " (created)" } else { "" },
        match &report.registrar_operation {
            Some(operation) => format!("updated by operation {}", operation),
            None => "already in sync".to_string(),
        },
        report.change.id,
        report.change.status
    );

    Ok(())
}
