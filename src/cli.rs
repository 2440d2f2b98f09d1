use clap::Parser;
use std::path::PathBuf;

use crate::model::Mode;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Source program
    pub input: PathBuf,
    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// JSON file overriding keywords, builtins and limits
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// What the input contains
    #[arg(short, long, value_enum, default_value_t = Mode::Module)]
    pub mode: Mode,
    /// Report pipeline progress on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
