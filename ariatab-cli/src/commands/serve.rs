//! `ariatab serve`

use ariatab_core::StaticServer;
use clap::Args;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use super::RunStatus;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Directory to serve
    #[arg(long)]
    pub root: PathBuf,

    /// Port to listen on (0 picks a free one)
    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,
}

pub async fn run(args: ServeArgs) -> anyhow::Result<RunStatus> {
    let server = StaticServer::start(args.root, SocketAddr::new(args.bind, args.port)).await?;
    println!("Serving {} at {}", server.root().display(), server.base_url()?);
    println!("Press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    server.shutdown().await;
    Ok(RunStatus::Passed)
}
