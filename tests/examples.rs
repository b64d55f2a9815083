mod common;
use common::run_pipeline;

#[test]
fn minimal() {
    run_pipeline(include_str!("../demos/minimal.wb"));
}

#[test]
fn language_tour() {
    run_pipeline(include_str!("../demos/language-tour.wb"));
}

#[test]
fn fib() {
    run_pipeline(include_str!("../demos/fib.wb"));
}

#[test]
fn approx_pi() {
    run_pipeline(include_str!("../demos/approx-pi.wb"));
}

#[test]
fn scopes() {
    run_pipeline(include_str!("../demos/scopes.wb"));
}
