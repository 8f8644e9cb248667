use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "signtext",
    version,
    about = "Extract structured contact data from signboard, menu, and receipt photos"
)]
struct Cli {
    /// Image file to read
    image: Option<String>,

    /// Tesseract language hint (e.g. eng+tam)
    #[arg(short = 'l', long = "languages")]
    languages: Option<String>,

    /// Emit the full result as JSON
    #[arg(long = "json")]
    json: bool,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Show installed tesseract languages and exit
    #[arg(long = "list-langs")]
    list_langs: bool,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    signtext::logging::init(cli.verbose)?;

    let output = signtext::run(signtext::Config {
        image: cli.image,
        languages: cli.languages,
        settings_path: cli.read_settings,
        json: cli.json,
        list_langs: cli.list_langs,
    })
    .await?;

    println!("{}", output);
    Ok(())
}
