use std::net::IpAddr;

use clap::{Args, Parser, Subcommand};
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "praxis", about = "Run the lab course management service")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    Run(Run),
    Seed(Seed),
}

#[derive(Debug, Clone, Args)]
#[group(multiple = true, required = false)]
pub(crate) struct Db {
    #[arg(long, help = "Min connections")]
    pub(crate) db_min_connections: Option<u32>,

    #[arg(long, help = "Max connections")]
    pub(crate) db_max_connections: Option<u32>,
}

#[derive(Debug, Clone, Args)]
#[group(multiple = true, required = false)]
pub(crate) struct Auth {
    #[arg(long, required = true)]
    pub(crate) oidc_issuer_url: Url,

    #[arg(long = "aud", value_delimiter = ',')]
    pub(crate) audience: Vec<String>,

    #[arg(long, default_value = "role", help = "Claim carrying the STUDENT/TEACHER role")]
    pub(crate) role_claim: String,

    #[arg(long)]
    pub(crate) origins: Vec<String>,
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct Run {
    #[arg(long)]
    pub(crate) host: Option<IpAddr>,

    #[arg(short, long)]
    pub(crate) port: Option<u16>,

    #[arg(long, env = "DATABASE_URL")]
    pub(crate) database_url: Url,

    #[command(flatten)]
    pub(crate) auth: Auth,

    #[command(flatten)]
    pub(crate) db: Db,
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct Seed {
    #[arg(long, env = "DATABASE_URL")]
    pub(crate) database_url: Url,

    #[arg(long, help = "Also create demo accounts with access tokens")]
    pub(crate) demo: bool,
}
