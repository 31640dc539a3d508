//! Diagnostics emitted while normalizing.

use std::io;
use std::sync::{Arc, Mutex};

use datim_model::RawResult;
use datim_normalize::{NormalizeOptions, normalize};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` under an `info` subscriber and returns what it logged.
fn capture(f: impl FnOnce()) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time()
        .finish();

    tracing::subscriber::with_default(subscriber, f);

    let bytes = captured.0.lock().unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn response(rows: serde_json::Value) -> RawResult {
    serde_json::from_value(serde_json::json!({
        "headers": [
            {"name": "ou", "column": "Organisation unit"},
            {"name": "pe", "column": "Period"},
            {"name": "value", "column": "Value"}
        ],
        "rows": rows,
        "metaData": {"items": {"ouLagos": {"name": "Lagos"}}}
    }))
    .unwrap()
}

#[test]
fn test_unmapped_cells_are_reported() {
    let raw = response(serde_json::json!([["ouLagos", "2024Oct", "12"]]));

    let logs = capture(|| {
        normalize(&raw, &NormalizeOptions::default()).unwrap();
    });

    assert!(logs.contains("Cells without a metadata name were left unchanged"));
    assert!(logs.contains("substituted=1"));
    assert!(logs.contains("unmapped=1"));
}

#[test]
fn test_empty_result_is_reported() {
    let raw = response(serde_json::json!([]));

    let logs = capture(|| {
        assert!(normalize(&raw, &NormalizeOptions::default()).unwrap().is_none());
    });

    assert!(logs.contains("No data returned for query"));
}
