//! Corvus - Reconnaissance Automation Pipeline CLI

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing_subscriber::EnvFilter;

use corvus::analyze::{self, DocumentCreator, GeminiAnalyzer};
use corvus::config::{self, Settings};
use corvus::deliver::{WebhookPayload, WebhookSink};
use corvus::enumerate::Enumerator;
use corvus::error::Result;
use corvus::lookup::LookupClient;
use corvus::models::{LookupBatch, ReportFile, ScanReport};
use corvus::pipeline::Pipeline;
use corvus::report;
use corvus::scan::PortScanner;

/// Corvus - Reconnaissance Automation Pipeline
#[derive(Parser)]
#[command(name = "corvus", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate subdomains of a domain via passive sources
    Enumerate {
        /// Target domain (e.g. example.com)
        domain: String,

        /// Emit per-name records with metadata instead of bare names
        #[arg(long)]
        records: bool,

        /// Output file path (JSON when set)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Port-scan a target and analyze its SSL/TLS endpoint
    Scan {
        /// Target domain or IP
        target: String,

        /// Port range to scan
        #[arg(short, long, default_value = "1-1000")]
        ports: String,

        /// Port for the SSL/TLS scan
        #[arg(long, default_value_t = 443)]
        ssl_port: u16,

        /// Output file path (default: <target>_nmap_<timestamp>.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Resolve names and query the lookup service for each address
    Lookup {
        /// Names to resolve and look up
        #[arg(required = true)]
        names: Vec<String>,

        /// Output file path for the JSON result
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Send report files to the configured webhook
    Deliver {
        /// Target domain the files belong to
        #[arg(short, long)]
        target_domain: String,

        /// Report files to attach
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Summarize report files with the AI analysis backend
    Analyze {
        /// Target domain the files belong to
        #[arg(short, long)]
        target_domain: String,

        /// Report files to analyze
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output file path for the analysis outcome
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run the full pipeline: enumerate, lookup, scan, deliver
    Pipeline {
        /// Target domain to scan
        domain: String,

        /// Output file path for the JSON result
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "corvus=debug" } else { "corvus=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    if let Some(path) = config_path {
        return config::load_settings(path);
    }
    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        config::load_settings(default_path)
    } else {
        Ok(Settings::from_env())
    }
}

fn read_report_files(paths: &[PathBuf]) -> Result<Vec<ReportFile>> {
    let mut files = Vec::new();
    for path in paths {
        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        files.push(ReportFile::new(name, content));
    }
    Ok(files)
}

fn print_banner() {
    let banner = r#"
    ╔═══════════════════════════════════════╗
    ║  CORVUS v0.1.0                        ║
    ║  Reconnaissance Automation Pipeline   ║
    ╚═══════════════════════════════════════╝
    "#;
    println!("{}", banner.cyan());
}

fn print_scan_summary(report: &ScanReport) {
    println!("\n{}", "  Scan Summary".bold());
    println!("  {}", "─".repeat(35));

    let mut builder = Builder::default();
    builder.push_record(["State", "Ports"]);

    if let Some(ports) = &report.port_scan {
        builder.push_record(["Open".to_string(), ports.open_ports.len().to_string()]);
        builder.push_record(["Closed".to_string(), ports.closed_ports.len().to_string()]);
        builder.push_record([
            "Filtered".to_string(),
            ports.filtered_ports.len().to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");

    if let Some(ports) = &report.port_scan {
        if !ports.open_ports.is_empty() {
            let listing: Vec<String> = ports.open_ports.iter().map(u16::to_string).collect();
            println!("\n  {} {}", "Open:".bold(), listing.join(", ").green());
            for (port, service) in &ports.services {
                println!("    {} {}", format!("{port}:").cyan(), service);
            }
        }
    }

    if let Some(ssl) = &report.ssl_scan {
        println!(
            "\n  {} {}",
            "SSL/TLS enabled:".bold(),
            ssl.ssl_enabled.to_string().cyan()
        );
        if !ssl.protocols.is_empty() {
            println!("  {} {}", "Protocols:".bold(), ssl.protocols.join(", "));
        }
    }

    if !report.errors.is_empty() {
        println!("\n  {}", "Errors:".red().bold());
        for error in &report.errors {
            println!("    - {error}");
        }
    }
}

fn print_lookup_summary(batch: &LookupBatch) {
    println!("\n{}", "  Lookup Summary".bold());
    println!("  {}", "─".repeat(35));
    println!(
        "  {} {}/{}",
        "Scanned:".bold(),
        batch.scanned.to_string().green(),
        batch.total
    );

    let mut builder = Builder::default();
    builder.push_record(["Name", "IP", "Org", "Ports"]);

    for (name, entry) in &batch.targets {
        if let Some(error) = &entry.error {
            builder.push_record([
                name.clone(),
                entry.ip.clone().unwrap_or_else(|| "-".to_string()),
                format!("error: {error}"),
                "-".to_string(),
            ]);
            continue;
        }
        let (org, ports) = entry
            .host
            .as_ref()
            .map(|host| {
                let listing: Vec<String> = host.ports.iter().map(u16::to_string).collect();
                (host.organization.clone(), listing.join(", "))
            })
            .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
        builder.push_record([
            name.clone(),
            entry.ip.clone().unwrap_or_else(|| "-".to_string()),
            org,
            ports,
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Enumerate {
            domain,
            records,
            output,
            verbose,
        } => {
            init_tracing(verbose);
            let settings = load_settings(None)?;
            let enumerator = Enumerator::new(&settings).await?;

            if records {
                let found = enumerator.enumerate_records(&domain).await?;
                println!(
                    "\n  {} {}",
                    "Subdomains with metadata:".bold(),
                    found.len().to_string().green()
                );
                for record in &found {
                    println!(
                        "    {} ({})",
                        record.name,
                        record.source.as_deref().unwrap_or("unknown")
                    );
                }
                if let Some(path) = output {
                    report::json::export(&found, &path)?;
                    println!("\n  {} {}", "Saved to:".bold(), path.display());
                }
            } else {
                let subdomains = enumerator.enumerate(&domain).await?;
                println!(
                    "\n  {} {}",
                    "Subdomains found:".bold(),
                    subdomains.len().to_string().green()
                );
                for subdomain in &subdomains {
                    println!("    {subdomain}");
                }
                if let Some(path) = output {
                    report::json::export(&subdomains, &path)?;
                    println!("\n  {} {}", "Saved to:".bold(), path.display());
                }
            }
        }

        Commands::Scan {
            target,
            ports,
            ssl_port,
            output,
            verbose,
        } => {
            init_tracing(verbose);
            print_banner();
            let settings = load_settings(None)?;
            let scanner = PortScanner::new(&settings).await?;

            let scan = scanner.full_scan(&target, &ports, ssl_port).await;
            print_scan_summary(&scan);

            let output_path = output.unwrap_or_else(|| {
                PathBuf::from(report::timestamped_name(&target, "nmap", "txt"))
            });
            report::text::write_scan_report(&scan, &output_path)?;
            println!(
                "\n  {} {}",
                "Report saved to:".bold(),
                output_path.display().to_string().green()
            );
        }

        Commands::Lookup {
            names,
            output,
            verbose,
        } => {
            init_tracing(verbose);
            let settings = load_settings(None)?;
            let client = LookupClient::new(&settings).await?;

            let batch = client.scan_names(&names).await?;
            print_lookup_summary(&batch);

            if let Some(path) = output {
                report::json::export(&batch, &path)?;
                println!("\n  {} {}", "Saved to:".bold(), path.display());
            }
        }

        Commands::Deliver {
            target_domain,
            files,
            verbose,
        } => {
            init_tracing(verbose);
            let settings = load_settings(None)?;
            let sink = WebhookSink::new(settings.webhook_url, settings.webhook_timeout_secs)?;

            let payload = WebhookPayload::new(&target_domain, read_report_files(&files)?);
            let outcome = sink.send(&payload).await;

            if outcome.is_success() {
                println!(
                    "  {} webhook accepted delivery (status {})",
                    "OK:".green().bold(),
                    outcome.code.unwrap_or_default()
                );
            } else {
                println!(
                    "  {} {}",
                    "Delivery failed:".red().bold(),
                    outcome.reason.as_deref().unwrap_or("unknown")
                );
            }
        }

        Commands::Analyze {
            target_domain,
            files,
            output,
            verbose,
        } => {
            init_tracing(verbose);
            let settings = load_settings(None)?;
            let analyzer = GeminiAnalyzer::new(&settings)?;
            let creator = DocumentCreator::new(&settings)?;

            let report_files = read_report_files(&files)?;
            let outcome =
                analyze::process_report_bundle(&analyzer, &creator, &report_files, &target_domain)
                    .await;

            match (&outcome.analysis, &outcome.error) {
                (Some(analysis), _) => {
                    println!("\n{analysis}");
                    if let Some(document) = &outcome.document {
                        println!("\n  {} {}", "Document:".bold(), document.title.green());
                    }
                }
                (None, Some(error)) => {
                    eprintln!("  {} {}", "Analysis failed:".red().bold(), error);
                }
                _ => {}
            }

            if let Some(path) = output {
                report::json::export(&outcome, &path)?;
                println!("\n  {} {}", "Saved to:".bold(), path.display());
            }
        }

        Commands::Pipeline {
            domain,
            output,
            config: config_path,
            verbose,
        } => {
            init_tracing(verbose);
            print_banner();
            let settings = load_settings(config_path.as_deref())?;

            println!("  {} {}\n", "Target:".bold(), domain.green());

            let pipeline = Pipeline::new(settings);
            let result = pipeline.run(&domain).await?;

            println!(
                "\n  {} {}",
                "Subdomains found:".bold(),
                result.subdomains_found.to_string().green()
            );
            if let Some(batch) = &result.lookup {
                print_lookup_summary(batch);
            }
            if let Some(scan) = &result.scan {
                print_scan_summary(scan);
            }
            if let Some(delivery) = &result.delivery {
                println!(
                    "\n  {} {}",
                    "Delivery:".bold(),
                    delivery.status.to_string().cyan()
                );
            }
            if !result.errors.is_empty() {
                println!("\n  {}", "Step errors:".red().bold());
                for error in &result.errors {
                    println!("    {} {}", format!("{}:", error.step).yellow(), error.message);
                }
            }
            println!(
                "\n  {} {:.2}s",
                "Completed in:".bold(),
                result.duration_secs
            );

            let output_path = output
                .unwrap_or_else(|| PathBuf::from(report::timestamped_name(&domain, "recon", "json")));
            report::json::export(&result, &output_path)?;
            println!(
                "  {} {}",
                "Result saved to:".bold(),
                output_path.display().to_string().green()
            );
        }
    }

    Ok(())
}
