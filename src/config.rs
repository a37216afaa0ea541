//! Command-line configuration for cog-dumper.
//!
//! One subcommand per transport, all sharing the tile selection arguments:
//!
//! ```text
//! cog-dumper file --file cog.tif --xyz 1 2 0
//! cog-dumper http --server http://localhost:8080 --path data --resource cog.tif
//! cog-dumper s3 --bucket my-bucket --key cogs/cog.tif --info
//! ```
//!
//! # Environment Variables
//!
//! - `COG_HTTP_USER` - Basic auth user for the `http` command
//! - `COG_HTTP_PASSWORD` - Basic auth password for the `http` command
//! - `COG_S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services
//! - `COG_S3_REGION` - AWS region (default: us-east-1)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Default Values
// =============================================================================

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

// =============================================================================
// CLI Arguments
// =============================================================================

/// cog-dumper - Extract single tiles from Cloud Optimized GeoTIFFs.
///
/// Reads only the header, the directory chain and the requested tile using
/// byte-range requests against a local file, a web server or S3.
#[derive(Parser, Debug, Clone)]
#[command(name = "cog-dumper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Validate the selected command.
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::File(args) => args.validate(),
            Command::Http(args) => args.validate(),
            Command::S3(args) => args.validate(),
        }
    }
}

/// Transport to read the COG from.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Read a local file
    File(FileArgs),

    /// Read a web hosted file with HTTP range requests
    Http(HttpArgs),

    /// Read an S3 object with ranged GetObject requests
    S3(S3Args),
}

impl Command {
    /// Prefix of the default output file name.
    pub fn output_prefix(&self) -> &'static str {
        match self {
            Command::File(_) => "file",
            Command::Http(_) => "http",
            Command::S3(_) => "s3",
        }
    }

    /// Tile selection shared by every command.
    pub fn tile_args(&self) -> &TileArgs {
        match self {
            Command::File(args) => &args.tile,
            Command::Http(args) => &args.tile,
            Command::S3(args) => &args.tile,
        }
    }
}

// =============================================================================
// Tile Selection
// =============================================================================

/// Which tile to extract and where to write it.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TileArgs {
    /// Output file. Defaults to `<command>_<x>_<y>_<z><ext>` in the
    /// current directory.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Tile coordinates, where z is the overview level.
    #[arg(
        long,
        num_args = 3,
        value_names = ["X", "Y", "Z"],
        default_values_t = [0u32, 0, 0]
    )]
    pub xyz: Vec<u32>,

    /// Print the COG structure as JSON instead of writing a tile.
    #[arg(long, default_value_t = false)]
    pub info: bool,
}

impl TileArgs {
    /// The requested (x, y, z) triple.
    pub fn coordinates(&self) -> Result<(u32, u32, u32), String> {
        match self.xyz[..] {
            [x, y, z] => Ok((x, y, z)),
            _ => Err(format!(
                "--xyz takes exactly 3 values, got {}",
                self.xyz.len()
            )),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.coordinates().map(|_| ())
    }
}

// =============================================================================
// File Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct FileArgs {
    /// Input COG file.
    #[arg(long)]
    pub file: PathBuf,

    #[command(flatten)]
    pub tile: TileArgs,
}

impl FileArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.file.as_os_str().is_empty() {
            return Err("Input file is required. Set --file".to_string());
        }
        self.tile.validate()
    }
}

// =============================================================================
// HTTP Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct HttpArgs {
    /// Server URL, e.g. http://localhost:8080
    #[arg(long)]
    pub server: String,

    /// Path on the server between the host and the resource.
    #[arg(long)]
    pub path: Option<String>,

    /// Resource (file name) to read.
    #[arg(long)]
    pub resource: String,

    /// User for HTTP basic authentication.
    #[arg(long, env = "COG_HTTP_USER")]
    pub user: Option<String>,

    /// Password for HTTP basic authentication.
    #[arg(long, env = "COG_HTTP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(flatten)]
    pub tile: TileArgs,
}

impl HttpArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.server.starts_with("http://") || self.server.starts_with("https://")) {
            return Err(format!(
                "Server must be an http:// or https:// URL, got '{}'",
                self.server
            ));
        }

        if self.resource.is_empty() {
            return Err("Resource is required. Set --resource".to_string());
        }

        if self.password.is_some() && self.user.is_none() {
            return Err(
                "A password was provided without a user. Set --user or COG_HTTP_USER".to_string(),
            );
        }

        self.tile.validate()
    }
}

// =============================================================================
// S3 Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct S3Args {
    /// S3 bucket name.
    #[arg(long)]
    pub bucket: String,

    /// S3 object key.
    #[arg(long)]
    pub key: String,

    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    ///
    /// If not specified, uses the default AWS S3 endpoint.
    #[arg(long, env = "COG_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "COG_S3_REGION")]
    pub s3_region: String,

    #[command(flatten)]
    pub tile: TileArgs,
}

impl S3Args {
    pub fn validate(&self) -> Result<(), String> {
        if self.bucket.is_empty() {
            return Err("S3 bucket name is required. Set --bucket".to_string());
        }
        if self.key.is_empty() {
            return Err("S3 key is required. Set --key".to_string());
        }
        self.tile.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
