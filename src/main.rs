use std::io::{self, Read};

use anyhow::Result;
use clap::Parser;
use llm_translate::TranslateError;

#[derive(Parser, Debug)]
#[command(
    name = "llm-translate",
    version,
    about = "Translate text or look up terms with a local Ollama model"
)]
struct Cli {
    /// Text to translate (omit to read stdin)
    text: Option<String>,

    /// Path to a config TOML layered over the default locations
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    /// translate or dictionary
    #[arg(short = 'm', long = "mode", value_parser = ["translate", "dictionary"])]
    mode: Option<String>,

    /// Source language. Use "auto" to detect.
    #[arg(short = 'f', long = "from")]
    source_lang: Option<String>,

    /// Target language
    #[arg(short = 't', long = "to")]
    target_lang: Option<String>,

    /// Tone preset (e.g. casual, formal)
    #[arg(long = "tone")]
    tone: Option<String>,

    /// Additional style instructions passed to the model verbatim
    #[arg(long = "tone-instructions")]
    tone_instructions: Option<String>,

    /// Language for notes and explanations
    #[arg(long = "explain-lang")]
    explain_lang: Option<String>,

    /// Regenerate with a hint
    #[arg(long = "rerun", value_parser = ["retry", "more_literal", "more_natural"])]
    rerun: Option<String>,

    /// Sampling seed for reproducible output
    #[arg(long = "seed")]
    seed: Option<i64>,

    /// Sampling temperature override
    #[arg(long = "temperature")]
    temperature: Option<f64>,

    /// Print the result as JSON
    #[arg(long = "json")]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long = "pretty")]
    pretty: bool,

    /// Print the raw provider response on errors
    #[arg(long = "debug")]
    debug: bool,

    /// Append model name and latency to human-readable output
    #[arg(long = "with-using-model", conflicts_with = "json")]
    with_using_model: bool,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    llm_translate::logging::init(cli.verbose)?;

    let input = match cli.text {
        Some(text) => Some(text),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
    };

    let debug = cli.debug;
    let result = llm_translate::run(
        llm_translate::Config {
            settings_path: cli.config,
            mode: cli.mode,
            source_lang: cli.source_lang,
            target_lang: cli.target_lang,
            tone: cli.tone,
            tone_instructions: cli.tone_instructions,
            explain_lang: cli.explain_lang,
            rerun: cli.rerun,
            seed: cli.seed,
            temperature: cli.temperature,
            json: cli.json,
            pretty: cli.pretty,
            with_using_model: cli.with_using_model,
        },
        input,
    )
    .await;

    match result {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(err) => {
            if debug {
                if let Some(raw) = err
                    .downcast_ref::<TranslateError>()
                    .and_then(TranslateError::raw_response)
                {
                    eprintln!("=== raw_response ===");
                    eprintln!("{}", raw);
                    eprintln!("=== end raw_response ===");
                }
            }
            Err(err)
        }
    }
}
