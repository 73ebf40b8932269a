use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use paperscout::{
    cli::{Cli, Command, SearchArgs},
    config::Config,
    embedding::OpenAiEmbedding,
    engine::SearchEngine,
    error::Result,
    paper::Paper,
    source::SemanticScholar,
};

const LOG_ENV_VAR: &str = "PAPERSCOUT_LOG";

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var(LOG_ENV_VAR) {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Search(args) => cmd_search(args).await?,
        Command::Completions(args) => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(
                args.shell,
                &mut command,
                name,
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

async fn cmd_search(args: SearchArgs) -> Result<()> {
    let config = Config::from_env()?;

    let source = SemanticScholar::new(config.ss_api_key.clone())?;
    let embedding = OpenAiEmbedding::new(
        config.embedding_url.clone(),
        config.embedding_api_key.clone(),
        config.embedding_model.clone(),
    )?;
    let engine = SearchEngine::new(source, embedding)
        .with_default_top_k(config.default_top_k);

    let results = engine
        .search(&args.query, args.count, !args.heuristic)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        format_human(&results);
    }

    Ok(())
}

/// Format results for human-readable terminal output.
fn format_human(results: &[Paper]) {
    if results.is_empty() {
        println!("No results found.");
        return;
    }

    for (i, paper) in results.iter().enumerate() {
        println!("{:>3}. [{:.3}] {}", i + 1, paper.score, paper.title);
        if !paper.authors.is_empty() {
            println!("     {}", paper.authors.join(", "));
        }
        let mut details = vec![paper.source.clone()];
        if let Some(date) = paper.published_date {
            details.push(date.to_string());
        }
        if let Some(citations) = paper.citation_count {
            details.push(format!("{citations} citations"));
        }
        println!("     {}", details.join(" · "));
    }
    println!("\n{} result(s)", results.len());
}
