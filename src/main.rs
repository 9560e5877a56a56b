mod config;
mod error;
mod listener;
mod payload;
mod response;
mod server;

fn main() -> anyhow::Result<()> {
    server::main()?;
    Ok(())
}
