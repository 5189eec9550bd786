mod command;

use clap::Parser;

pub use self::command::{CommandRunner, Commands};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Redis connection uri
    #[arg(short, long, env = "REDIS_URI")]
    pub redis_uri: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
