//! Reading source files, running the compiler on them and writing the result

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use miette::{bail, Diagnostic, IntoDiagnostic, NamedSource, Result};
use thiserror::Error;
use tracing::{info, warn};

use crate::ast::SourceProgram;
use crate::codegen::emit;
use crate::{compile, compile_with, parse, type_check, Options, ParsingError, TypeCheckError};

/// Everything that can be wrong with the source code itself
#[derive(Debug, Error, Diagnostic)]
pub enum SourceError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parsing(#[from] ParsingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Typing(#[from] TypeCheckError),
}

#[derive(Debug, Error, Diagnostic)]
#[error("Could not compile {name}")]
pub struct AppError {
    name: String,

    #[related]
    errs: Vec<SourceError>,

    #[source_code]
    code: NamedSource<String>,
}

/// Parse and type check source code
pub fn front_end(source: &str) -> std::result::Result<SourceProgram, Vec<SourceError>> {
    let syntax = parse(source)
        .map_err(|errs| errs.into_iter().map(SourceError::from).collect::<Vec<_>>())?;
    info!("Parsing successful");

    let program = type_check(&syntax).map_err(|err| vec![SourceError::from(err)])?;
    info!("Type checking successful");

    Ok(program)
}

/// Read a source file and run the front end on it
pub fn load(input: &Path) -> Result<SourceProgram> {
    if !input.is_file() {
        bail!("No proper input file: {:?}", input);
    }

    let source = fs::read_to_string(input).into_diagnostic()?;
    front_end(&source).map_err(|errs| {
        let name = input.display().to_string();
        AppError {
            name: name.clone(),
            errs,
            code: NamedSource::new(name, source),
        }
        .into()
    })
}

/// The input path with its extension replaced by `.ll`
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("ll")
}

/// Compile a source file to LLVM assembly, returning where it was written to
pub fn compile_file(input: &Path, output: Option<&Path>, options: &Options) -> Result<PathBuf> {
    let program = load(input)?;
    let module = compile(program, options)?;

    let out = output.map_or_else(|| default_output_path(input), Path::to_path_buf);
    if out.exists() {
        warn!("{:?} already exists and will be overridden", &out);
    }

    fs::write(&out, emit(&module)).into_diagnostic()?;
    info!(output = ?out, "LLVM assembly written");

    Ok(out)
}

/// Draw the typed syntax tree of a source file
pub fn write_parse_tree(input: &Path, out: impl Write) -> Result<()> {
    load(input)?.write_tree(out).into_diagnostic()
}

/// Write the program after every stage of the pipeline
pub fn write_stages(input: &Path, options: &Options, mut out: impl Write) -> Result<()> {
    let program = load(input)?;

    let mut written = Ok(());
    compile_with(program, options, &mut |stage, result| {
        if written.is_ok() {
            written = writeln!(out, "=== {stage} ===\n{result}");
        }
    })?;

    written.into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_next_to_input() {
        assert_eq!(
            default_output_path(Path::new("dir/program.wb")),
            PathBuf::from("dir/program.ll")
        );
        assert_eq!(
            default_output_path(Path::new("program")),
            PathBuf::from("program.ll")
        );
    }

    #[test]
    fn front_end_collects_errors() {
        let errs = front_end("print 1 +;").unwrap_err();
        assert!(!errs.is_empty());
        assert!(errs.iter().all(|err| matches!(err, SourceError::Parsing(_))));

        let errs = front_end("print y;").unwrap_err();
        assert!(matches!(
            errs.as_slice(),
            [SourceError::Typing(TypeCheckError::UndeclaredVariable { .. })]
        ));
    }
}
