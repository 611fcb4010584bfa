use crate::document::SourceKind;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Chat with a site, video, PDF, CSV or text file", long_about = None)]
pub struct Args {
    /// Question about the document; omit to start an interactive chat
    pub query: Option<String>,

    /// Kind of document: site, video, pdf, csv or text
    #[arg(short, long)]
    pub kind: Option<SourceKind>,

    /// URL for site/video, file path for pdf/csv/text (stdin when piped)
    #[arg(short, long)]
    pub source: Option<String>,

    /// LLM provider [possible values: groq, openai]
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model to use (provider-specific)
    #[arg(short, long)]
    pub model: Option<String>,

    /// API key for the selected provider
    #[arg(long, env = "GAUSS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// List providers and their models, then exit
    #[arg(long)]
    pub list_models: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
