use wabc::codegen::emit;
use wabc::driver::front_end;
use wabc::{compile, Options};

/// Run a source program through the whole compiler, returning the LLVM assembly
pub fn run_pipeline(src: &str) -> String {
    let program = front_end(src).unwrap();
    let module = compile(program, &Options::default()).unwrap();
    emit(&module)
}
