//! Binary entrypoint: read JSON lines from stdin, write JSON lines to stdout.
//!
//! Each input line is an AnalysisRequest. Output lines are either:
//! - An AnalysisResponse (clusters, epicurve, or spatial statistics)
//! - An ErrorOutput (when input or configuration validation fails)

use epi_engine::types::ErrorOutput;
use epi_engine::{engine, AnalysisRequest, Config, EngineError};
use std::io::{self, BufRead, Write};

fn main() {
  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  let defaults = Config::default();

  for line in stdin.lock().lines() {
    let line = match line {
      Ok(l) => l,
      Err(e) => {
        let _ = writeln!(io::stderr(), "epi-engine: read error: {}", e);
        std::process::exit(1);
      }
    };

    // Skip blank lines.
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    // Parse inbound request.
    let request: AnalysisRequest = match serde_json::from_str(trimmed) {
      Ok(v) => v,
      Err(e) => {
        let err = ErrorOutput::new(format!("json parse: {}", e));
        let _ = serde_json::to_writer(&mut out, &err);
        let _ = writeln!(out);
        continue;
      }
    };

    // Run the requested analysis.
    match engine::run(&request, &defaults) {
      Ok(response) => {
        let _ = serde_json::to_writer(&mut out, &response);
        let _ = writeln!(out);
      }
      Err(e) => {
        let err = match &e {
          EngineError::Validation { field, reason } => {
            ErrorOutput::new(reason.clone()).with_field(field.clone())
          }
          _ => ErrorOutput::new(e.to_string()),
        };
        let _ = serde_json::to_writer(&mut out, &err);
        let _ = writeln!(out);
      }
    }
  }

  let _ = out.flush();
}
