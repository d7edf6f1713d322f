//! `gatepay init`: initialize a new node configuration.

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory).
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

const DEFAULT_CONFIG: &str = r#"# Gatepay Node Configuration

[gateway]
environment = "sandbox"
merchant_id = "your-merchant-id"
public_key = "your-public-key"
private_key = "your-private-key"

[api]
listen_addr = "127.0.0.1"
port = 9401

[storage]
data_dir = "./data"

[logging]
level = "info"
format = "text"

[[processors]]
name = "gateway-triggered"
recurring = false
on_transition_refused = "propagate"

[[processors]]
name = "gateway-triggered-recurring"
recurring = true
on_transition_refused = "propagate"
"#;

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    let config_path = args.dir.join("gatepay.toml");

    if config_path.exists() {
        anyhow::bail!("configuration file already exists at {}", config_path.display());
    }

    std::fs::create_dir_all(&args.dir)?;
    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    println!("Initialized Gatepay node at {}", config_path.display());
    println!("Edit gatepay.toml to set your merchant credentials.");
    println!("Run 'gatepay-node' to start the node.");

    let data_dir = args.dir.join("data");
    std::fs::create_dir_all(&data_dir)?;

    Ok(())
}
