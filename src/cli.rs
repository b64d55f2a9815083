use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::Options;

#[derive(Debug, Parser)]
#[command(version, about = None, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Wabbit source file
    pub input_file: PathBuf,

    /// Where to write the LLVM assembly [default: input file with `.ll` extension]
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,

    /// Execution mode
    #[arg(value_enum)]
    #[arg(short, long)]
    #[arg(default_value_t = Mode::Compile)]
    pub mode: Mode,

    /// Warn about names that are used without being declared
    #[arg(long)]
    pub report_undeclared: bool,
}

impl Args {
    pub fn options(&self) -> Options {
        Options {
            report_undeclared: self.report_undeclared,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Compile the source code to LLVM assembly
    Compile,

    /// Inspect the typed syntax tree of the source code
    Parse,

    /// Inspect the program after every compiler stage
    Stages,
}
