//! JSON I/O handling for CLI
//!
//! - Input: one JSON query object via stdin, may span lines
//! - Output: one JSON object per command via stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a JSON request from stdin
pub fn read_request() -> CliResult<Value> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_request(&input)
}

fn parse_request(input: &str) -> CliResult<Value> {
    if input.trim().is_empty() {
        return Err(CliError::InvalidRequest("Empty input".to_string()));
    }

    let value: Value = serde_json::from_str(input)
        .map_err(|e| CliError::InvalidRequest(format!("Invalid request JSON: {}", e)))?;
    if !value.is_object() {
        return Err(CliError::InvalidRequest("Request must be a JSON object".to_string()));
    }
    Ok(value)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&success_body(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&error_body(code, message))
}

fn success_body(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

fn error_body(code: &str, message: &str) -> Value {
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

fn write_line(body: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, body)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_multiline_request() {
        let value = parse_request("{\n  \"$top\": 5\n}\n").unwrap();
        assert_eq!(value, json!({"$top": 5}));
    }

    #[test]
    fn test_parse_rejects_empty_and_non_objects() {
        assert_eq!(
            parse_request("  \n").unwrap_err().code(),
            "ODATAQL_CLI_INVALID_REQUEST"
        );
        assert!(parse_request("[1, 2]").is_err());
        assert!(parse_request("{").is_err());
    }

    #[test]
    fn test_response_bodies() {
        assert_eq!(
            success_body(json!({"limit": 50})),
            json!({"status": "ok", "data": {"limit": 50}})
        );
        assert_eq!(
            error_body("ODATA_SYNTAX_ERROR", "bad"),
            json!({"status": "error", "code": "ODATA_SYNTAX_ERROR", "message": "bad"})
        );
    }
}
