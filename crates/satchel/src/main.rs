fn main() -> anyhow::Result<()> {
    satchel::cli::run()
}
