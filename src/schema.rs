use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BenchError;
use crate::report::BenchmarkResult;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub profile: String,
    pub seed: u64,
    pub clock: String,
    pub timestamp_utc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub run: RunMeta,
    pub results: Vec<BenchmarkResult>,
}

impl SuiteReport {
    /// Write pretty-printed JSON to `out`, or stdout when `None`.
    pub fn write_json(&self, out: Option<&Path>) -> Result<(), BenchError> {
        let json = serde_json::to_string_pretty(self)?;
        match out {
            Some(path) => fs::write(path, json)?,
            None => writeln!(io::stdout().lock(), "{json}")?,
        }
        Ok(())
    }
}
