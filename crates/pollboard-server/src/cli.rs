use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "pollboard-server", about = "Self-hosted polls web server")]
pub struct Args {
    /// Path to the TOML config file.
    #[arg(short, long, default_value = "pollboard.toml")]
    pub config: String,
}
