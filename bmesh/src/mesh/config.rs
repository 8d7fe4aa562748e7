/// Runtime configuration of a mesh.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MeshConfig {
    /// Maximum number of steps taken by any walk over a cycle.
    ///
    /// Cycles are bounded by the number of elements in a mesh, so a walk that
    /// exceeds this limit has found corrupted links. Walks performed by views
    /// and cursors panic when the limit is exceeded and validation reports
    /// `MeshError::CycleLimit`.
    pub cycle_limit: usize,
    /// Validate the entire mesh when an edit session is committed.
    ///
    /// Validation always runs on commit when the `check-invariants` feature
    /// is enabled.
    pub validate_on_commit: bool,
}

impl MeshConfig {
    pub const DEFAULT_CYCLE_LIMIT: usize = 100_000;

    pub fn with_cycle_limit(mut self, limit: usize) -> Self {
        self.cycle_limit = limit;
        self
    }

    pub fn with_validate_on_commit(mut self, validate: bool) -> Self {
        self.validate_on_commit = validate;
        self
    }

    pub(in crate::mesh) fn is_validating(&self) -> bool {
        self.validate_on_commit || cfg!(feature = "check-invariants")
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        MeshConfig {
            cycle_limit: MeshConfig::DEFAULT_CYCLE_LIMIT,
            validate_on_commit: cfg!(any(debug_assertions, feature = "check-invariants")),
        }
    }
}
