use std::{
    fs::File,
    io::{stdout, Cursor},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;
use spki::{der::Decode, SubjectPublicKeyInfoRef};
use windows_ct_logs::TrustList;

/// Where Windows Update publishes the current `authrootstl.cab`.
const AUTHROOTSTL_URL: &str =
    "http://ctldl.windowsupdate.com/msdownload/update/v3/static/trustedr/en/authrootstl.cab";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();

    match args.command {
        Commands::Ids(args) => ids(args),
        Commands::Dump(args) => dump(args),
        Commands::Fetch(args) => fetch(args),
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the base64 log ID of each CT log in the given CTL file.
    Ids(InputArgs),
    /// Dump the given CTL file's CT log list as JSON.
    Dump(InputArgs),
    /// Download the current CTL from Windows Update and print its CT logs.
    Fetch(FetchArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// The CTL file (in CAB or DER format)
    input: PathBuf,
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// The URL of the CAB archive to download
    #[arg(long, default_value = AUTHROOTSTL_URL)]
    url: String,

    /// Give up on the download after this many seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 120)]
    timeout: u64,

    /// Also write the downloaded archive to this file
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,

    /// Print JSON instead of log IDs
    #[arg(long)]
    json: bool,
}

/// Everything needed to retrieve the remote archive.
#[derive(Debug, Clone)]
struct FetchConfig {
    url: String,
    timeout: Duration,
}

impl From<&FetchArgs> for FetchConfig {
    fn from(args: &FetchArgs) -> Self {
        Self {
            url: args.url.clone(),
            timeout: Duration::from_secs(args.timeout),
        }
    }
}

impl FetchConfig {
    fn fetch_archive(&self) -> Result<Vec<u8>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        info!("retrieving {}", self.url);
        let response = client
            .get(&self.url)
            .send()
            .with_context(|| format!("failed to retrieve {}", self.url))?;
        if !response.status().is_success() {
            return Err(anyhow!("{}: {}", self.url, response.status()));
        }

        let body = response
            .bytes()
            .with_context(|| format!("failed to read {}", self.url))?;
        debug!("retrieved {} byte(s)", body.len());
        Ok(body.to_vec())
    }
}

/// The key algorithm of a log, for display only.
#[derive(Serialize)]
struct KeyAlgorithm {
    algorithm: String,
    parameters: Option<String>,
}

impl KeyAlgorithm {
    fn from_spki(spki: &[u8]) -> Option<Self> {
        let key = SubjectPublicKeyInfoRef::from_der(spki).ok()?;

        Some(Self {
            algorithm: key.algorithm.oid.to_string(),
            parameters: key
                .algorithm
                .parameters_oid()
                .ok()
                .map(|oid| oid.to_string()),
        })
    }
}

#[derive(Serialize)]
struct Dump<'a> {
    #[serde(flatten)]
    trust_list: &'a TrustList,
    key_algorithms: Vec<Option<KeyAlgorithm>>,
}

impl<'a> From<&'a TrustList> for Dump<'a> {
    fn from(trust_list: &'a TrustList) -> Self {
        let key_algorithms = trust_list
            .logs
            .iter()
            .map(|spki| KeyAlgorithm::from_spki(spki))
            .collect();

        Self {
            trust_list,
            key_algorithms,
        }
    }
}

fn load_ctl(input: &Path) -> Result<TrustList> {
    let file = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;

    match input.extension().and_then(|s| s.to_str()) {
        Some("der") | Some("stl") => {
            TrustList::from_der(file).context("failed to load CTL from PKCS#7")
        }
        Some("cab") => TrustList::from_cab(file).context("failed to load CTL from cabinet"),
        Some(other) => Err(anyhow!("unexpected file extension: {}", other)),
        None => Err(anyhow!("missing or invalid file extension")),
    }
}

fn print_ids(ctl: &TrustList) {
    for id in ctl.log_ids() {
        println!("{}", STANDARD.encode(id));
    }
}

fn print_json(ctl: &TrustList) -> Result<()> {
    serde_json::to_writer_pretty(stdout(), &Dump::from(ctl))?;
    println!();

    Ok(())
}

fn ids(args: InputArgs) -> Result<()> {
    let ctl = load_ctl(&args.input)?;
    print_ids(&ctl);

    Ok(())
}

fn dump(args: InputArgs) -> Result<()> {
    let ctl = load_ctl(&args.input)?;
    print_json(&ctl)
}

fn fetch(args: FetchArgs) -> Result<()> {
    let archive = FetchConfig::from(&args).fetch_archive()?;

    if let Some(path) = &args.save {
        std::fs::write(path, &archive)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    let ctl =
        TrustList::from_cab(Cursor::new(archive)).context("failed to load CTL from cabinet")?;
    info!(
        "CTL sequence number {} effective {}: {} CT log(s)",
        hex::encode(ctl.sequence_number.as_bytes()),
        ctl.effective_date,
        ctl.logs.len()
    );

    if args.json {
        print_json(&ctl)
    } else {
        print_ids(&ctl);
        Ok(())
    }
}
