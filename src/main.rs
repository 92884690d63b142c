use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use clap::{Parser, Subcommand};
mod auth;
use identhash::{Algorithm, HashError, KdfParams, VerifyPolicy};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, clap::Args)]
struct KdfArgs {
    /// PRF digest: sha1, sha256 or sha512 (default: sha256)
    #[arg(long, env = "IDENTHASH_ALGORITHM")]
    algorithm: Option<Algorithm>,

    /// PBKDF2 iteration count (default: 10000)
    #[arg(long, env = "IDENTHASH_ITERATIONS")]
    iterations: Option<u32>,

    /// Salt length in bytes (default: 16)
    #[arg(long, env = "IDENTHASH_SALT_LEN")]
    salt_len: Option<usize>,

    /// Subkey length in bytes (default: 32)
    #[arg(long, env = "IDENTHASH_SUBKEY_LEN")]
    subkey_len: Option<usize>,
}

impl KdfArgs {
    fn to_kdf_params(&self) -> Result<KdfParams> {
        let default = KdfParams::default();

        Ok(KdfParams::new(
            self.algorithm.unwrap_or(default.algorithm()),
            self.iterations.unwrap_or(default.iterations()),
            self.salt_len.unwrap_or(default.salt_len()),
            self.subkey_len.unwrap_or(default.subkey_len()),
        )?)
    }
}

#[derive(Debug, clap::Args)]
struct PolicyArgs {
    /// Reject stored hashes with a shorter subkey (default: 32)
    #[arg(long, env = "IDENTHASH_MIN_SUBKEY_LEN")]
    min_subkey_len: Option<usize>,

    /// Reject stored hashes that demand more iterations than this
    #[arg(long, env = "IDENTHASH_MAX_ITERATIONS")]
    max_iterations: Option<u32>,
}

impl PolicyArgs {
    fn to_policy(&self) -> Result<VerifyPolicy> {
        let default = VerifyPolicy::default();

        Ok(VerifyPolicy::new(
            self.min_subkey_len.unwrap_or(default.min_subkey_len()),
            self.max_iterations.or(default.max_iterations()),
        )?)
    }
}

#[derive(Debug, clap::Args)]
#[group(required = true, multiple = false)]
struct HashInput {
    /// Base64-encoded stored hash
    hash: Option<String>,

    /// Read the base64-encoded stored hash from a file
    #[arg(long, value_name = "PATH")]
    hash_file: Option<PathBuf>,
}

impl HashInput {
    fn load(&self) -> Result<Vec<u8>> {
        let text = match (&self.hash, &self.hash_file) {
            (Some(h), _) => h.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            (None, None) => bail!("no stored hash given"),
        };

        STANDARD
            .decode(text.trim())
            .context("stored hash is not valid base64")
    }
}

#[derive(Debug, Parser)]
#[command(name = "identhash")]
#[command(
    version,
    about = "Create and verify versioned PBKDF2 password hashes."
)]
struct Cli {
    /// Log rejection reasons and parameters to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Hashes a password in the current format and prints it as base64
    Hash {
        #[command(flatten)]
        kdf: KdfArgs,
    },

    /// Verifies a password against a stored hash
    Verify {
        #[command(flatten)]
        input: HashInput,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Shows the parameters of a stored hash
    Inspect {
        #[command(flatten)]
        input: HashInput,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Tells whether a stored hash should be replaced with a fresh one
    NeedsRehash {
        #[command(flatten)]
        input: HashInput,

        #[command(flatten)]
        kdf: KdfArgs,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Hash { kdf } => {
            let params = kdf.to_kdf_params()?;
            let password = auth::read_new_password_with_confirmation()?;
            debug!(
                algorithm = %params.algorithm(),
                iterations = params.iterations(),
                salt_len = params.salt_len(),
                subkey_len = params.subkey_len(),
                "hashing password"
            );
            let hash = identhash::hash_password_with(
                password.as_bytes(),
                &params,
                &mut identhash::OsRandom,
            )?;
            println!("{}", STANDARD.encode(hash));
        }
        Commands::Verify { input, policy } => {
            let policy = policy.to_policy()?;
            let hash = input.load()?;
            let password = auth::read_password()?;
            match identhash::check(&hash, password.as_bytes(), &policy) {
                Ok(true) => println!("password matches"),
                Ok(false) => bail!("password does not match"),
                Err(e) => bail!("password does not match: {}", describe(&e)),
            }
        }
        Commands::Inspect { input, json } => {
            let info = identhash::inspect(&input.load()?)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("format:        {}", info.format);
                println!("algorithm:     {}", info.algorithm);
                println!("iterations:    {}", info.iterations);
                println!("salt length:   {}", info.salt_len);
                println!("subkey length: {}", info.subkey_len);
            }
        }
        Commands::NeedsRehash { input, kdf } => {
            let params = kdf.to_kdf_params()?;
            let hash = input.load()?;
            if identhash::needs_rehash(&hash, &params) {
                println!("yes");
            } else {
                println!("no");
            }
        }
    }

    Ok(())
}

fn describe(e: &HashError) -> &'static str {
    match e {
        HashError::UnknownFormat(_) => "unknown hash format",
        HashError::UnsupportedAlgorithm(_) => "unsupported algorithm",
        HashError::WeakParameters(_) => "stored hash is too weak",
        _ => "stored hash is malformed",
    }
}
