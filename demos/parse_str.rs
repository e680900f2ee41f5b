use serde_json::Value;
use streamcsv_rs::{parse_str, Parser, ParserError, StringSource, TokenizerOptions};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("=== CSV Parse Examples ===\n");

    // Example 1: Header line and rows
    println!("1. Parse a document with a header line:");
    let csv = "id,name,role\n1,Alice,admin\n2,Bob,user\n";
    println!("CSV input:\n{}", csv);
    let rows = parse_str(csv, &TokenizerOptions::default()).await.unwrap();
    println!(
        "JSON output:\n{}\n",
        serde_json::to_string_pretty(&rows).unwrap()
    );

    // Example 2: Quoted cells
    println!("2. Quoted cells with separators, quotes and line breaks:");
    let csv = "text,author\n\"Hello, \"\"World\"\"\nsecond line\",\"anon\"\n";
    println!("CSV input:\n{}", csv);
    let rows = parse_str(csv, &TokenizerOptions::default()).await.unwrap();
    println!(
        "JSON output:\n{}\n",
        serde_json::to_string_pretty(&rows).unwrap()
    );

    // Example 3: Custom separator
    println!("3. Tab separated values:");
    let options = TokenizerOptions {
        column_separator: "\t".to_string(),
    };
    let tsv = "item\tprice\nWidget\t9.99\nGadget\t14.5\n";
    println!("TSV input:\n{}", tsv);
    let rows = parse_str(tsv, &options).await.unwrap();
    println!(
        "JSON output:\n{}\n",
        serde_json::to_string_pretty(&rows).unwrap()
    );

    // Example 4: Header given by the caller
    println!("4. Header set explicitly:");
    let mut parser =
        Parser::from_source(StringSource::new("x,y\n1,2\n"), &TokenizerOptions::default())
            .unwrap();
    parser.set_header(["first", "second"]).unwrap();
    while let Some(row) = parser.read_row_object().await.unwrap() {
        println!("{}", Value::Object(row));
    }
    println!();

    // Example 5: Rows of the wrong width
    println!("5. Rows must match the header:");
    let result = parse_str("a,b,c\n1,2\n", &TokenizerOptions::default()).await;
    match result {
        Err(err @ ParserError::InvalidColumns { .. }) => println!("Error: {}\n", err),
        other => println!("Unexpected: {:?}\n", other),
    }
}
