/// One forward schema step.
///
/// Published migrations are immutable; fixes ship as a new, higher version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub script: &'static str,
}

impl Migration {
    pub const fn new(version: i64, description: &'static str, script: &'static str) -> Self {
        Self {
            version,
            description,
            script,
        }
    }
}

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Version recorded before the run
    pub from: i64,
    /// Version recorded after the run
    pub to: i64,
    /// Versions applied by this run, ascending
    pub applied: Vec<i64>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}
