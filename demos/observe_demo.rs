//! Observe Demo
//!
//! Wraps a couple of Rust functions, calls them a few times and prints the
//! interface file autodoc wrote for them.

use autodoc::utils::logging::{init_file_logger, Verbosity, DEFAULT_LOG_FILE};
use autodoc::{call_args, Autodoc, AutodocConfig, CallArgs, FunctionMeta, Value};
use std::env;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let debug = args.iter().any(|a| a == "--debug");
    init_file_logger(DEFAULT_LOG_FILE, Verbosity::from_flags(verbose, debug))?;

    let config = AutodocConfig::from_pyproject("pyproject.toml")?.with_output_dir("demos/output");
    let autodoc = Autodoc::new(config);

    println!("autodoc observe demo");
    println!("====================\n");

    let mean_meta = FunctionMeta::builder("mean", "stats.py")
        .param("values")
        .doc("Arithmetic mean of a list of numbers.")
        .local("average")
        .build()?;
    let mean = autodoc.observe(mean_meta, |args: &CallArgs| -> f64 {
        let values: Vec<f64> = args
            .positional(0)
            .and_then(Value::elements)
            .map(|items| items.iter().filter_map(Value::as_float).collect())
            .unwrap_or_default();
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    });

    let tally_meta = FunctionMeta::builder("tally", "stats.py")
        .param("words")
        .keyword_only("min_count")
        .local("counts")
        .build()?;
    let tally = autodoc.observe(tally_meta, |args: &CallArgs| {
        let min = args.keyword("min_count").and_then(Value::as_int).unwrap_or(1);
        let mut counts = std::collections::BTreeMap::new();
        if let Some(words) = args.positional(0).and_then(Value::elements) {
            for word in words.iter().filter_map(Value::as_str) {
                *counts.entry(word.to_string()).or_insert(0i64) += 1;
            }
        }
        counts.retain(|_, n| i128::from(*n) >= min);
        counts
    });

    println!("mean([1.5, 2.5, 4.0]) = {}", mean.call(&call_args!(vec![1.5, 2.5, 4.0])));
    println!("mean([2, 4]) = {}", mean.call(&call_args!(vec![2.0, 4.0])));
    println!(
        "tally(...) = {:?}",
        tally.call(&call_args!(vec!["a", "b", "a"]; min_count = 1))
    );

    let interface = autodoc
        .store()
        .interface_path(mean.meta().source_file.as_path())
        .ok_or("no interface path")?;
    println!("\n{}:\n", interface.display());
    println!("{}", fs::read_to_string(&interface)?);

    Ok(())
}
