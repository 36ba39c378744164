use crate::parser::BodyJoin;
use clap::Parser;

const DEFAULT_INPUT_PATH: &str = "input/My Clippings.txt";
const DEFAULT_OUTPUT_PATH: &str = "clippings.md";

#[derive(Parser, Debug)]
#[command(name = "kindle-clippings")]
#[command(about = "Parse a Kindle 'My Clippings.txt' file into Markdown and JSON")]
pub struct CliArgs {
    /// Path to the My Clippings.txt file
    pub input: Option<String>,

    /// Markdown output file path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Also write a JSON file next to the Markdown output
    #[arg(short, long)]
    pub json: bool,

    /// How multi-line bodies are joined: "newline" or "space"
    #[arg(long)]
    pub join_body: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub input_path: String,
    pub output_path: String,
    pub json: bool,
    pub body_join: BodyJoin,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    InvalidBodyJoin(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidBodyJoin(s) => {
                write!(f, "Invalid --join-body value: '{}'. Expected 'newline' or 'space'", s)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let cli = CliArgs::parse();
        Self::from_args(cli)
    }

    fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        let body_join = resolve_body_join(cli.join_body.as_deref())?;

        let input_path = cli
            .input
            .or_else(|| std::env::var("CLIPPINGS_INPUT").ok())
            .unwrap_or_else(|| DEFAULT_INPUT_PATH.to_string());

        let output_path = cli
            .output
            .or_else(|| std::env::var("CLIPPINGS_OUTPUT").ok())
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());

        Ok(Config {
            input_path,
            output_path,
            json: cli.json,
            body_join,
        })
    }

    /// JSON path derived from the Markdown path by swapping the extension.
    pub fn json_output_path(&self) -> String {
        match self.output_path.strip_suffix(".md") {
            Some(stem) => format!("{}.json", stem),
            None => format!("{}.json", self.output_path),
        }
    }
}

fn resolve_body_join(value: Option<&str>) -> Result<BodyJoin, ConfigError> {
    match value {
        None | Some("newline") => Ok(BodyJoin::Newline),
        Some("space") => Ok(BodyJoin::Space),
        Some(other) => Err(ConfigError::InvalidBodyJoin(other.to_string())),
    }
}
