fn main() -> anyhow::Result<()> {
    surety_cli::run()?;
    Ok(())
}
