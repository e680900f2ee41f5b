//! Streams a CSV file (or stdin) and prints each row as a JSON line.
//!
//! ```text
//! cargo run --example stream_file -- data.csv email,text
//! RUST_LOG=streamcsv_rs=debug cargo run --example stream_file -- - email < data.csv
//! ```

use std::process::ExitCode;

use serde_json::Value;
use streamcsv_rs::{Parser, StreamOptions, StreamSource, TokenizerOptions};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "-".to_string());
    let required: Vec<String> = args
        .next()
        .map(|list| list.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    let separator = std::env::var("CSV_COLUMN_SEPARATOR").unwrap_or_else(|_| ",".to_string());

    let stream_options = StreamOptions::default();
    let source = if path == "-" {
        StreamSource::from_reader(tokio::io::stdin(), &stream_options)
    } else {
        match tokio::fs::File::open(&path).await {
            Ok(file) => StreamSource::from_reader(file, &stream_options),
            Err(err) => {
                error!(%path, error = %err, "unable to open input");
                return ExitCode::FAILURE;
            }
        }
    };

    let options = TokenizerOptions {
        column_separator: separator,
    };
    let mut parser = match Parser::from_source(source, &options) {
        Ok(parser) => parser,
        Err(err) => {
            error!(error = %err, "invalid options");
            return ExitCode::FAILURE;
        }
    };

    let result = run(&mut parser, &required).await;
    parser.close();
    match result {
        Ok(rows) => {
            info!(rows, "done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "parsing failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    parser: &mut Parser<StreamSource>,
    required: &[String],
) -> Result<usize, Box<dyn std::error::Error>> {
    parser.read_header().await?;
    let required: Vec<&str> = required.iter().map(String::as_str).collect();
    if !parser.has_header_columns(&required) {
        return Err(format!("missing columns, required: {}", required.join(",")).into());
    }

    let mut rows = 0;
    while let Some(row) = parser.read_row_object().await? {
        println!("{}", Value::Object(row));
        rows += 1;
    }
    Ok(rows)
}
