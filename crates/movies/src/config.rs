//! Configuration the core never sees directly - this binary validates it
//! from the environment and CLI flags, then hands the core an open pool
//! and a poster directory (spec.md §6).

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "movies-mcp-server",
    version,
    about = "MCP server exposing a movie/actor catalog over stdio"
)]
pub struct Args {
    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub image: ImageConfig,
}

impl Args {
    pub fn from_env() -> Self {
        Self::parse()
    }
}

/// `host`/`port`/`user`/`password`/`sslmode` round out the connection
/// option table for parity with a networked backend; the sqlite pool this
/// binary builds only consumes `name` and `migrations_path`.
#[derive(ClapArgs, Debug, Clone)]
pub struct DatabaseConfig {
    #[arg(long, env = "DATABASE_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(long, env = "DATABASE_PORT", default_value_t = 5432)]
    pub port: u16,

    #[arg(long, env = "DATABASE_USER", default_value = "movies")]
    pub user: String,

    #[arg(long, env = "DATABASE_PASSWORD", default_value = "")]
    pub password: String,

    #[arg(long, env = "DATABASE_NAME", default_value = "movies.db")]
    pub name: String,

    #[arg(long, env = "DATABASE_SSLMODE", default_value = "disable")]
    pub sslmode: String,

    #[arg(long, env = "DATABASE_MAX_OPEN_CONNS", default_value_t = 10)]
    pub max_open_conns: u32,

    #[arg(long, env = "DATABASE_MAX_IDLE_CONNS", default_value_t = 5)]
    pub max_idle_conns: u32,

    #[arg(long, env = "DATABASE_CONN_MAX_LIFETIME_SECS", default_value_t = 1800)]
    pub conn_max_lifetime_secs: u64,

    #[arg(long, env = "DATABASE_MIGRATIONS_PATH", default_value = "crates/movies_db/migrations")]
    pub migrations_path: PathBuf,
}

impl DatabaseConfig {
    pub fn pool_config(&self) -> movies_db::PoolConfig {
        movies_db::PoolConfig {
            url: format!("sqlite://{}?mode=rwc", self.name),
            max_open_conns: self.max_open_conns,
            max_idle_conns: self.max_idle_conns,
            conn_max_lifetime_secs: self.conn_max_lifetime_secs,
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ServerConfig {
    #[arg(long, env = "SERVER_NAME", default_value = "movies-mcp-server")]
    pub name: String,

    #[arg(long, env = "SERVER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "SERVER_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ImageConfig {
    #[arg(long, env = "IMAGE_MAX_SIZE_BYTES", default_value_t = 5_242_880)]
    pub max_size_bytes: u64,

    #[arg(
        long,
        env = "IMAGE_ALLOWED_TYPES",
        value_delimiter = ',',
        default_value = "image/jpeg,image/png"
    )]
    pub allowed_types: Vec<String>,

    #[arg(long, env = "IMAGE_ENABLE_THUMBNAILS", default_value_t = false)]
    pub enable_thumbnails: bool,

    #[arg(long, env = "IMAGE_THUMBNAIL_SIZE", default_value_t = 256)]
    pub thumbnail_size: u32,

    #[arg(long, env = "IMAGE_POSTER_DIR", default_value = "posters")]
    pub poster_dir: PathBuf,
}
