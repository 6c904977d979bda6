mod app;
mod config;
mod db;
mod error;
mod game;
mod models;
mod wiki;

use app::App;
use config::Config;
use error::Result;
use models::GameCode;

const USAGE: &str = "Usage: falloutdle <command>

Commands:
  --ingest [CODE]   crawl the wiki (all games, or one game code such as FO3) and store characters
  --fetch <TITLE>   fetch and parse one wiki page without storing it
  --show <TITLE>    print a stored character (by wiki title or name)
  --list            list stored characters
  --today           print today's character, selecting one if needed";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (info and above unless RUST_LOG says otherwise)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str);
    let argument = args.get(2).map(String::as_str);

    if command.is_none() {
        println!("{}", USAGE);
        return Ok(());
    }

    // Load configuration
    let config = Config::load()?;
    let app = App::new(&config).await?;

    let result = match (command, argument) {
        (Some("--ingest"), code) => {
            let games = match code {
                Some(code) => vec![code.parse::<GameCode>()?],
                None => GameCode::ALL.to_vec(),
            };
            match app.ingest(&games).await {
                Ok(summary) => {
                    println!(
                        "Stored {} characters from {} categories ({} failed)",
                        summary.stored, summary.categories, summary.failed_categories
                    );
                    println!(
                        "{} pages skipped, {} duplicates, {} failed to store",
                        summary.skipped_pages, summary.duplicates, summary.store_failures
                    );
                    app.repository
                        .count_characters()
                        .await
                        .map(|total| println!("{} characters in the database", total))
                }
                Err(e) => Err(e),
            }
        }
        (Some("--fetch"), Some(title)) => app
            .fetch_character(title)
            .await
            .map(|character| print!("{}", character)),
        (Some("--show"), Some(title)) => app
            .show_character(title)
            .await
            .map(|character| print!("{}", character)),
        (Some("--list"), _) => list_characters(&app).await,
        (Some("--today"), _) => {
            let daily = app.daily();
            daily.get_today().await.map(|character| print!("{}", character))
        }
        _ => {
            println!("{}", USAGE);
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!("{}", e);
    }
    result
}

async fn list_characters(app: &App) -> Result<()> {
    for character in app.repository.get_all_characters().await? {
        let marker = if character.played_at.is_some() { "*" } else { " " };
        println!("{} {}", marker, character.compact());
    }
    Ok(())
}
