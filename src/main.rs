use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;

use wordnik::{Client, Config, DefinitionsOptions, PhrasesOptions, RelatedWordsOptions};

/// Look words up on Wordnik.
///
/// The API key comes from WORDNIK_API_KEY or the config file.
#[derive(Debug, Parser)]
#[command(name = "wordnik", version)]
struct Cli {
    /// Override the API base URI.
    #[arg(long, global = true)]
    base_uri: Option<String>,

    /// Override the request timeout, in seconds.
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Definitions {
        word: String,
        #[arg(long, default_value_t = 10)]
        count: u32,
        #[arg(long)]
        part_of_speech: Option<String>,
    },
    Examples {
        word: String,
    },
    Phrases {
        word: String,
        #[arg(long, default_value_t = 10)]
        count: u32,
    },
    Related {
        word: String,
        #[arg(long, default_value_t = 10)]
        count: u32,
        /// Relation type, e.g. synonym or antonym.
        #[arg(long = "type")]
        relation_type: Option<String>,
    },
    Frequency {
        word: String,
    },
    Punctuation {
        word: String,
    },
    WordOfTheDay,
    RandomWord,
}

fn run(cli: Cli) -> wordnik::Result<Value> {
    let mut config = Config::load()?;
    if let Some(base_uri) = cli.base_uri {
        config = config.with_base_uri(base_uri);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    log::debug!("using {config:?}");

    let client = Client::new(config)?;
    match cli.command {
        Command::Definitions {
            word,
            count,
            part_of_speech,
        } => client.definitions(
            &word,
            &DefinitionsOptions {
                count,
                part_of_speech,
            },
        ),
        Command::Examples { word } => client.examples(&word),
        Command::Phrases { word, count } => client.phrases(&word, &PhrasesOptions { count }),
        Command::Related {
            word,
            count,
            relation_type,
        } => client.related_words(
            &word,
            &RelatedWordsOptions {
                count,
                relation_type,
            },
        ),
        Command::Frequency { word } => client.frequency(&word),
        Command::Punctuation { word } => client.punctuation(&word),
        Command::WordOfTheDay => client.word_of_the_day(),
        Command::RandomWord => client.random_word(),
    }
}

fn main() -> ExitCode {
    env_logger::builder().format_timestamp(None).init();

    match run(Cli::parse()) {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(s) => {
                println!("{s}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_is_rejected() {
        let parsed = Cli::try_parse_from(["wordnik", "--timeout-secs", "0", "random-word"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn timeout_override_parses() {
        let cli = Cli::try_parse_from(["wordnik", "examples", "donkey", "--timeout-secs", "3"])
            .unwrap();
        assert_eq!(cli.timeout_secs, Some(3));
        assert!(matches!(cli.command, Command::Examples { ref word } if word == "donkey"));
    }
}
