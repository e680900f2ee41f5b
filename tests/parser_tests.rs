use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use streamcsv_rs::{
    parse_str, Line, Parser, ParserError, PushbackBuffer, StreamOptions, StreamSource,
    StringSource, TokenizeError, Tokenizer, TokenizerOptions,
};

fn default_opts() -> TokenizerOptions {
    TokenizerOptions {
        column_separator: ",".to_string(),
    }
}

fn csv_parser(content: &str) -> Parser<StringSource> {
    Parser::from_source(StringSource::new(content), &default_opts()).unwrap()
}

#[tokio::test]
async fn read_rows_until_end() {
    let mut tokenizer_input =
        PushbackBuffer::new(StringSource::new("zzz,yyy,xxx\na,bb,ccc\r\n0,\"1\",\"\"\"\""));
    let tokenizer = Tokenizer::new(&default_opts()).unwrap();

    let mut rows = Vec::new();
    while let Line::Row(row) = tokenizer.read_row(&mut tokenizer_input).await.unwrap() {
        rows.push(row);
    }
    assert_eq!(
        rows,
        vec![
            vec!["zzz", "yyy", "xxx"],
            vec!["a", "bb", "ccc"],
            vec!["0", "1", "\""],
        ]
    );
    assert_eq!(
        tokenizer.read_row(&mut tokenizer_input).await.unwrap(),
        Line::CsvEnd
    );
}

#[tokio::test]
async fn invalid_separator_rejected() {
    let options = TokenizerOptions {
        column_separator: ", ".to_string(),
    };
    let err = Parser::from_source(StringSource::new("a"), &options).unwrap_err();
    match err {
        TokenizeError::InvalidSeparator { length } => assert_eq!(length, 2),
        _ => panic!("expected InvalidSeparator error"),
    }
}

#[tokio::test]
async fn semicolon_separated_document() {
    let options = TokenizerOptions {
        column_separator: ";".to_string(),
    };
    let rows = parse_str("name;price\n\"Widget; large\";9,99\n", &options)
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_value(rows).unwrap(),
        json!([{"name": "Widget; large", "price": "9,99"}])
    );
}

#[tokio::test]
async fn row_width_mismatch() {
    let mut parser = csv_parser("a,b,c\n1,2,3\n4,5\n");
    parser.read_header().await.unwrap();
    assert_eq!(parser.read_row().await.unwrap().unwrap(), ["1", "2", "3"]);

    let err = parser.read_row().await.unwrap_err();
    match err {
        ParserError::InvalidColumns {
            row,
            expected,
            found,
        } => {
            assert_eq!(row, 3);
            assert_eq!(expected, 3);
            assert_eq!(found, 2);
        }
        _ => panic!("expected InvalidColumns error"),
    }
}

#[tokio::test]
async fn unescaped_quote_surfaces_through_parser() {
    let mut parser = csv_parser("a\nHello\" World\n");
    parser.read_header().await.unwrap();
    let err = parser.read_row().await.unwrap_err();
    assert!(matches!(
        err,
        ParserError::Tokenize(TokenizeError::UnescapedQuote)
    ));
}

#[tokio::test]
async fn unterminated_quote_surfaces_through_parser() {
    let mut parser = csv_parser("a,b\n1,\"2\n3");
    parser.read_header().await.unwrap();
    assert!(matches!(
        parser.read_row().await,
        Err(ParserError::Tokenize(TokenizeError::UnterminatedQuote))
    ));
}

#[tokio::test]
async fn required_columns_validation() {
    let mut parser = csv_parser("email,text,schedule\n");
    parser.read_header().await.unwrap();
    assert!(parser.has_header_columns(&["email", "text"]));

    let mut parser = csv_parser("email,schedule\n");
    parser.read_header().await.unwrap();
    assert!(!parser.has_header_columns(&["email", "text"]));
}

#[tokio::test]
async fn row_objects_from_document() {
    let mut parser = csv_parser("A,B,C\nx,y,z\n,,\n");
    parser.read_header().await.unwrap();

    let first = parser.read_row_object().await.unwrap().unwrap();
    assert_eq!(Value::Object(first), json!({"A": "x", "B": "y", "C": "z"}));
    let second = parser.read_row_object().await.unwrap().unwrap();
    assert_eq!(Value::Object(second), json!({"A": "", "B": "", "C": ""}));
    assert_eq!(parser.read_row_object().await.unwrap(), None);
}

#[tokio::test]
async fn multiline_quoted_cell() {
    let rows = parse_str(
        "id,note\r\n1,\"first line\r\nsecond, line\"\r\n2,plain\r\n",
        &default_opts(),
    )
    .await
    .unwrap();
    assert_eq!(
        serde_json::to_value(rows).unwrap(),
        json!([
            {"id": "1", "note": "first line\r\nsecond, line"},
            {"id": "2", "note": "plain"}
        ])
    );
}

#[tokio::test]
async fn blank_line_ends_document() {
    let rows = parse_str("k,v\na,1\n\nb,2\n", &default_opts())
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_value(rows).unwrap(),
        json!([{"k": "a", "v": "1"}])
    );
}

#[tokio::test]
async fn parse_from_stream_source() {
    let (source, mut sender) = StreamSource::channel(&StreamOptions {
        capacity: 8,
        ..StreamOptions::default()
    });
    let producer = tokio::spawn(async move {
        for chunk in ["em", "ail,te", "xt\nbob@exa", "mple.com,\"he", "llo\"\n"] {
            sender.send(chunk).await.unwrap();
        }
        sender.finish();
    });

    let mut parser = Parser::from_source(source, &default_opts()).unwrap();
    parser.read_header().await.unwrap();
    let row = parser.read_row_object().await.unwrap().unwrap();
    assert_eq!(
        Value::Object(row),
        json!({"email": "bob@example.com", "text": "hello"})
    );
    assert_eq!(parser.read_row().await.unwrap(), None);
    parser.close();
    producer.await.unwrap();
}
