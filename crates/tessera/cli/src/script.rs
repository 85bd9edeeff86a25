//! Call scripts: an ordered list of signed calls read from TOML.
//!
//! ```toml
//! [[calls]]
//! caller = "admin"
//! op = "register_user"
//! principal = "U"
//! clearance = 3
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tessera_service::{CallOutcome, SignedCall, TesseraLedger};
use tessera_types::{ErrorKind, EventRecord, LedgerError};
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub calls: Vec<SignedCall>,
}

impl Script {
    pub fn parse(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse call script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read call script {}", path.display()))?;
        Self::parse(&source)
    }
}

/// One line of replay output.
#[derive(Debug, Serialize)]
pub struct CallReport {
    pub index: usize,
    #[serde(flatten)]
    pub call: SignedCall,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CallOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&LedgerError> for ErrorReport {
    fn from(err: &LedgerError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl CallReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Apply every call in order. Rejected calls are reported and replay
/// continues, unless `strict` is set.
pub fn replay(ledger: &TesseraLedger, script: &Script, strict: bool) -> Result<Vec<CallReport>> {
    let mut reports = Vec::with_capacity(script.calls.len());

    for (index, call) in script.calls.iter().enumerate() {
        let report = match ledger.execute(call) {
            Ok(outcome) => {
                debug!(index, caller = %call.caller, "Call applied");
                CallReport {
                    index,
                    call: call.clone(),
                    result: Some(outcome),
                    error: None,
                }
            }
            Err(err) => {
                warn!(index, caller = %call.caller, error = %err, "Call rejected");
                if strict {
                    bail!("call {} rejected: {}", index, err);
                }
                CallReport {
                    index,
                    call: call.clone(),
                    result: None,
                    error: Some(ErrorReport::from(&err)),
                }
            }
        };
        reports.push(report);
    }

    Ok(reports)
}

/// Which committed events to print after replay: everything, or only those
/// after a known sequence number.
pub fn select_events(
    ledger: &TesseraLedger,
    all: bool,
    since: Option<u64>,
) -> Result<Vec<EventRecord>> {
    let events = match (all, since) {
        (_, Some(sequence)) => ledger.events_since(sequence)?,
        (true, None) => ledger.events()?,
        (false, None) => Vec::new(),
    };
    Ok(events)
}
