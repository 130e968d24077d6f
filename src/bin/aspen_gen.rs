fn main() -> anyhow::Result<()> {
    aspen::cli::run_cli()
}
