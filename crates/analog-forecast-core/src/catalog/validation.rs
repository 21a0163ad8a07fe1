//! Structural integrity checks for catalog artifacts.
//!
//! Checks are structural only: shapes, counts, column bindings, id ranges
//! and finiteness. Temporal correctness of rows belongs to the producing
//! pipeline.
//!
//! [`inspect`] never fails; it lists every check with its outcome so that
//! external tooling sees all defects at once. [`Catalog::new`] refuses the
//! catalog on the first failing check.
//!
//! [`Catalog::new`]: super::Catalog::new

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::manifest::CATALOG_FORMAT_VERSION;
use super::persistence::read_parts;
use super::types::{CatalogExpectations, CatalogParts, Matrix};
use crate::error::{ForecastError, ForecastResult};
use crate::index::IndexKind;
use crate::types::{Horizon, Variable};

/// Tolerance on `| ||e|| - 1 |` before an embedding row is flagged.
pub const UNIT_NORM_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    /// Served anyway, but an operator should look.
    Warn,
    /// Catalog is refused.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityCheck {
    pub name: String,
    pub status: CheckStatus,
    pub expected: String,
    pub found: String,
}

/// Outcome of every structural check for one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub horizon: Horizon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub rows: usize,
    pub dimension: usize,
    pub variables: Vec<Variable>,
    pub index_kind: IndexKind,
    pub index_ntotal: usize,
    pub checks: Vec<IntegrityCheck>,
}

impl IntegrityReport {
    /// No failing checks.
    pub fn is_healthy(&self) -> bool {
        !self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    pub fn failures(&self) -> impl Iterator<Item = &IntegrityCheck> + '_ {
        self.checks.iter().filter(|c| c.status == CheckStatus::Fail)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &IntegrityCheck> + '_ {
        self.checks.iter().filter(|c| c.status == CheckStatus::Warn)
    }

    /// The first failing check as a `StructuralMismatch`.
    pub fn first_failure(&self) -> Option<ForecastError> {
        self.failures().next().map(|c| {
            ForecastError::mismatch(self.horizon, c.name.clone(), &c.expected, &c.found)
        })
    }
}

/// Accumulates checks in order.
struct Checks(Vec<IntegrityCheck>);

impl Checks {
    fn equal<T: PartialEq + std::fmt::Debug>(&mut self, name: &str, expected: T, found: T) {
        let status = if expected == found {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        };
        self.push(name, status, format!("{:?}", expected), format!("{:?}", found));
    }

    fn push(&mut self, name: &str, status: CheckStatus, expected: String, found: String) {
        self.0.push(IntegrityCheck {
            name: name.to_string(),
            status,
            expected,
            found,
        });
    }
}

/// Run every structural check on `parts`.
pub fn inspect(
    parts: &CatalogParts,
    horizon: Horizon,
    expectations: &CatalogExpectations,
) -> IntegrityReport {
    let manifest = &parts.manifest;
    let mut checks = Checks(Vec::new());

    checks.equal(
        "manifest.json format_version",
        CATALOG_FORMAT_VERSION,
        manifest.format_version,
    );
    checks.equal("manifest.json horizon", horizon, manifest.horizon);
    checks.equal(
        "manifest.json dimension",
        expectations.dimension,
        manifest.dimension,
    );
    checks.equal(
        "manifest.json variables",
        &expectations.variables,
        &manifest.variables,
    );
    checks.equal("manifest.json index_kind", manifest.index_kind, parts.index.kind());

    check_matrix(&mut checks, "embeddings.bin", &parts.embeddings);
    checks.equal("embeddings.bin rows", manifest.rows, parts.embeddings.rows);
    checks.equal("embeddings.bin cols", manifest.dimension, parts.embeddings.cols);

    check_matrix(&mut checks, "outcomes.bin", &parts.outcomes);
    checks.equal("outcomes.bin rows", manifest.rows, parts.outcomes.rows);
    checks.equal(
        "outcomes.bin cols",
        manifest.variables.len(),
        parts.outcomes.cols,
    );

    checks.equal("index.bin dimension", manifest.dimension, parts.index.dimension());
    checks.equal("index.bin ntotal", manifest.rows, parts.index.ntotal());
    for (what, expected, found) in parts.index.structural_defects(manifest.rows) {
        checks.push(&format!("index.bin {}", what), CheckStatus::Fail, expected, found);
    }

    if parts.embeddings.is_consistent() {
        let non_finite = parts.embeddings.data.iter().filter(|x| !x.is_finite()).count();
        checks.equal("embeddings.bin non-finite values", 0, non_finite);

        let off_norm = parts
            .embeddings
            .iter_rows()
            .filter(|row| {
                let norm = row.iter().map(|x| x * x).sum::<f32>().sqrt();
                (norm - 1.0).abs() > UNIT_NORM_TOLERANCE
            })
            .count();
        let status = if off_norm == 0 {
            CheckStatus::Pass
        } else {
            CheckStatus::Warn
        };
        checks.push(
            "embeddings.bin unit-norm rows",
            status,
            "0 rows off unit norm".to_string(),
            format!("{} rows off unit norm", off_norm),
        );
    }

    IntegrityReport {
        horizon,
        path: None,
        rows: manifest.rows,
        dimension: manifest.dimension,
        variables: manifest.variables.clone(),
        index_kind: parts.index.kind(),
        index_ntotal: parts.index.ntotal(),
        checks: checks.0,
    }
}

fn check_matrix(checks: &mut Checks, name: &str, matrix: &Matrix) {
    let expected = matrix.rows.checked_mul(matrix.cols);
    let status = if expected == Some(matrix.data.len()) {
        CheckStatus::Pass
    } else {
        CheckStatus::Fail
    };
    checks.push(
        &format!("{} values", name),
        status,
        match expected {
            Some(n) => format!("{} ({} x {})", n, matrix.rows, matrix.cols),
            None => format!("{} x {} (overflow)", matrix.rows, matrix.cols),
        },
        matrix.data.len().to_string(),
    );
}

/// Read-only integrity hook for external tooling.
///
/// Reads the artifacts under `dir` and reports every structural check
/// without registering or serving the catalog.
///
/// # Errors
///
/// I/O and decoding failures. Structural defects are reported, not raised.
pub fn verify_catalog_dir(
    dir: &Path,
    horizon: Horizon,
    expectations: &CatalogExpectations,
) -> ForecastResult<IntegrityReport> {
    let parts = read_parts(dir)?;
    let mut report = inspect(&parts, horizon, expectations);
    report.path = Some(dir.to_path_buf());
    Ok(report)
}
