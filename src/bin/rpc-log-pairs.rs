use clap::Parser;
use log::{info, warn};
use rpc_log_parser::payload::{is_gzip, reassemble};
use rpc_log_parser::report::{sort_by_sequence, write_matched_pairs, write_unmatched, Summary};
use rpc_log_parser::serialize::{write_mappings, write_pair_report};
use rpc_log_parser::{correlate, scan_file, ScanOutput, ScannerConfig};
use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

/// Match file chunk requests with their responses in RPC traffic dumps
#[derive(Parser, Debug)]
#[command(name = "rpc-log-pairs", version, about, long_about = None)]
struct Cli {
    /// Dump files to scan, in order
    #[arg(required = true)]
    logs: Vec<PathBuf>,

    /// Write all matched pairs with untruncated payloads to this file
    #[arg(short, long, default_value = "data_pairs.txt")]
    report: PathBuf,

    /// Also write a CSV mapping of resource ids to capture units
    #[arg(short, long)]
    mappings: Option<PathBuf>,

    /// Rebuild transferred objects into this directory, one `<resource_id>.bin` per object
    #[arg(short = 'x', long)]
    extract_dir: Option<PathBuf>,

    /// Number of payload hex characters shown in the pair listing
    #[arg(long, default_value_t = rpc_log_parser::report::DEFAULT_PREVIEW)]
    preview: usize,

    /// Type name opening a request block
    #[arg(long)]
    request_type: Option<String>,

    /// Type name of the nested structure holding the resource id
    #[arg(long)]
    location_type: Option<String>,

    /// Type name opening a result envelope
    #[arg(long)]
    envelope_type: Option<String>,

    /// Type name opening a response block
    #[arg(long)]
    response_type: Option<String>,

    /// Label tag of outbound capture units
    #[arg(long)]
    outbound_tag: Option<String>,

    /// Label tag of inbound capture units
    #[arg(long)]
    inbound_tag: Option<String>,
}

impl Cli {
    fn scanner_config(&self) -> ScannerConfig {
        let mut config = ScannerConfig::default();
        if let Some(s) = &self.request_type {
            config = config.with_request_type(s.as_str());
        }
        if let Some(s) = &self.location_type {
            config = config.with_location_type(s.as_str());
        }
        if let Some(s) = &self.envelope_type {
            config = config.with_envelope_type(s.as_str());
        }
        if let Some(s) = &self.response_type {
            config = config.with_response_type(s.as_str());
        }
        if let Some(s) = &self.outbound_tag {
            config = config.with_outbound_tag(s.as_str());
        }
        if let Some(s) = &self.inbound_tag {
            config = config.with_inbound_tag(s.as_str());
        }
        config
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("rpc-log-pairs: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = cli.scanner_config();

    let mut output = ScanOutput::default();
    for path in &cli.logs {
        output.extend(scan_file(path, &config)?);
    }

    let correlation = correlate(&output.requests, &output.responses);
    let mut pairs = correlation.pairs.clone();
    sort_by_sequence(&mut pairs);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out)?;
    write!(out, "{}", Summary::new(&output.requests, &output.responses, &correlation))?;
    write_matched_pairs(&mut out, &pairs, cli.preview)?;
    write_unmatched(&mut out, &correlation)?;
    out.flush()?;

    let mut report = BufWriter::new(File::create(&cli.report)?);
    write_pair_report(&mut report, &pairs)
        .map_err(|e| format!("cannot write {}: {:?}", cli.report.display(), e))?;
    report.flush()?;
    info!("pair report saved to {}", cli.report.display());

    if let Some(path) = &cli.mappings {
        let mut mappings = BufWriter::new(File::create(path)?);
        write_mappings(&mut mappings, &pairs)
            .map_err(|e| format!("cannot write {}: {:?}", path.display(), e))?;
        mappings.flush()?;
        info!("mappings saved to {}", path.display());
    }

    if let Some(dir) = &cli.extract_dir {
        extract_objects(dir, &pairs)?;
    }
    Ok(())
}

fn extract_objects(dir: &Path, pairs: &[rpc_log_parser::MatchedPair]) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    for (resource_id, data) in reassemble(pairs) {
        let path = dir.join(format!("{}.bin", resource_id));
        fs::write(&path, &data)?;
        if is_gzip(&data) {
            info!("{}: {} bytes (gzip)", path.display(), data.len());
        } else {
            warn!("{}: {} bytes, not a gzip stream", path.display(), data.len());
        }
    }
    Ok(())
}
