use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = texcerpt::cli::Cli::parse();
    texcerpt::init(cli.log_level());

    texcerpt::cli::run(cli)
}
