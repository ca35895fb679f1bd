pub mod json;
pub mod table;

use clap::ValueEnum;

/// How `status` and one-shot `chat` report results: readable text, or a
/// pretty-printed JSON document for scripts.
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}
