//! CLI（引数解析・補完スクリプト・表示）

pub mod args;
pub mod render;

pub use args::{config_to_command, parse_args, print_completion, Config, ParseOutcome};
