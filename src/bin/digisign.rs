//! DigiSign command-line tool
//!
//! Generates keys, signs documents, and verifies signed documents against a
//! directory-backed key registry.
//!
//! Usage:
//!   digisign keygen --name alice
//!   digisign register alice alice.pub
//!   digisign sign report.pdf --key alice.key --user alice
//!   digisign verify report.pdf.signed --user alice
//!   digisign inspect report.pdf.signed

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use digisign::config::{DigiSignConfig, ARMORED_KEYS_ENV, REGISTRY_DIR_ENV};
use digisign::registry::DirectoryRegistry;
use digisign::signatures::{DocumentSigner, DocumentVerifier, KeyCodec, SignatureExtractor};

#[derive(Debug, Parser)]
#[command(name = "digisign")]
#[command(bin_name = "digisign")]
#[command(about = "Sign documents and verify signed documents", long_about = None)]
struct Cli {
    /// Key registry directory
    #[arg(long, global = true, env = REGISTRY_DIR_ENV)]
    registry: Option<PathBuf>,

    /// Write exported keys with PEM header/footer lines
    #[arg(long, global = true)]
    armor: bool,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a keypair as NAME.key and NAME.pub
    Keygen {
        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Base name of the key files
        #[arg(long, default_value = "digisign")]
        name: String,
    },
    /// Store a user's public key in the registry
    Register {
        username: String,
        public_key: PathBuf,
    },
    /// Write a signed copy of a document
    Sign {
        file: PathBuf,
        /// Private key file
        #[arg(long)]
        key: PathBuf,
        /// Signer's registry username
        #[arg(long)]
        user: String,
        /// Output path (default: <file>.signed)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Verify a signed document
    Verify {
        file: PathBuf,
        /// Claimed signer
        #[arg(long)]
        user: String,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the embedded signature package
    Inspect { file: PathBuf },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = DigiSignConfig::from_env();
    if let Some(dir) = cli.registry {
        config = config.with_registry_dir(dir);
    }
    if cli.armor {
        config = config.with_armored_keys(true);
    }
    log::debug!("Configuration: {:?} ({} / {})", config, REGISTRY_DIR_ENV, ARMORED_KEYS_ENV);

    match run(cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}

async fn run(command: Command, config: &DigiSignConfig) -> digisign::Result<ExitCode> {
    match command {
        Command::Keygen { out_dir, name } => {
            let codec = KeyCodec::with_config(config);
            let pair = KeyCodec::generate();

            fs::create_dir_all(&out_dir)?;
            let private_path = out_dir.join(format!("{}.key", name));
            let public_path = out_dir.join(format!("{}.pub", name));

            let mut private_file = create_key_file(&private_path, true)?;
            let mut public_file = match create_key_file(&public_path, false) {
                Ok(file) => file,
                Err(e) => {
                    drop(private_file);
                    fs::remove_file(&private_path)?;
                    return Err(e.into());
                },
            };
            private_file.write_all(codec.encode_private(&pair.private_key)?.as_bytes())?;
            public_file.write_all(codec.encode_public(&pair.public_key)?.as_bytes())?;

            println!("Private key: {}", private_path.display());
            println!("Public key:  {}", public_path.display());
            println!("Fingerprint: {}", pair.public_key.fingerprint()?);
        },
        Command::Register {
            username,
            public_key,
        } => {
            let encoded = fs::read_to_string(&public_key)?;
            // Reject anything that would fail verification later.
            KeyCodec::decode_public(&encoded)?;
            DirectoryRegistry::new(&config.registry_dir).register(&username, &encoded)?;
            println!("Registered '{}' in {}", username, config.registry_dir.display());
        },
        Command::Sign {
            file,
            key,
            user,
            out,
        } => {
            let encoded_key = fs::read_to_string(&key)?;
            let document = fs::File::open(&file)?;
            let private_key = KeyCodec::decode_private(&encoded_key)?;
            let signed = DocumentSigner::new().sign_reader(document, &private_key, &user)?;

            let out = out.unwrap_or_else(|| signed_path(&file));
            fs::write(&out, signed)?;
            println!("Signed copy written to {}", out.display());
        },
        Command::Verify { file, user, json } => {
            let document = fs::read(&file)?;
            let verifier = DocumentVerifier::new(DirectoryRegistry::new(&config.registry_dir));
            let result = verifier.verify(&document, &user).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.message);
                if let Some(details) = &result.details {
                    println!("  Signer:    {}", details.signer);
                    println!("  Signed at: {}", details.timestamp);
                    println!("  Algorithm: {}", details.algorithm);
                }
            }

            if !result.is_valid {
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Inspect { file } => {
            let document = fs::read(&file)?;
            match SignatureExtractor::extract(&document) {
                Some(package) => println!("{}", serde_json::to_string_pretty(&package)?),
                None => {
                    println!("{} is not signed", file.display());
                    return Ok(ExitCode::FAILURE);
                },
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

/// `<file>.signed`, keeping the original extension visible.
fn signed_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_owned();
    name.push(".signed");
    PathBuf::from(name)
}

/// Create a key file, failing if it already exists. Private keys are owner-only.
fn create_key_file(path: &Path, private: bool) -> io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(if private { 0o600 } else { 0o644 });
    }
    #[cfg(not(unix))]
    let _ = private;
    options.open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            io::Error::new(e.kind(), format!("{} already exists", path.display()))
        } else {
            e
        }
    })
}
