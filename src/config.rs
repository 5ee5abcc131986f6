// Simulator configuration

/// Hard ceiling on register size; the state vector holds 2^n amplitudes.
pub const MAX_SUPPORTED_QUBITS: usize = 28;

/// How the scheduler treats several single-qubit records on one
/// `(qubit, depth)` cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// The last record in list order is applied; earlier ones are skipped.
    #[default]
    LastWins,
    /// Any shared cell fails validation with `SimError::CellConflict`.
    Reject,
}

/// Configuration for the circuit simulator
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Largest qubit count accepted by validation
    ///
    /// Every gate costs O(2^n), so the interactive designer keeps this small.
    ///
    /// Default: 8
    pub max_qubits: usize,

    /// Resolution of conflicting records on the same cell
    ///
    /// Default: `ConflictPolicy::LastWins`
    pub conflict_policy: ConflictPolicy,

    /// Probability below which `MeasurementResult::outcomes` hides a basis state
    ///
    /// Default: 0.001 (0.1%)
    pub outcome_threshold: f64,

    /// Allowed deviation of the probability sum from 1
    ///
    /// Default: 1e-9
    pub normalization_tolerance: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_qubits: 8,
            conflict_policy: ConflictPolicy::LastWins,
            outcome_threshold: 1e-3,
            normalization_tolerance: 1e-9,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Large registers for timing runs, capped at `MAX_SUPPORTED_QUBITS`.
    pub fn benchmark(max_qubits: usize) -> Self {
        Self::default().with_max_qubits(max_qubits)
    }

    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits.min(MAX_SUPPORTED_QUBITS);
        self
    }

    /// Qubit limit validation actually enforces.
    pub fn qubit_limit(&self) -> usize {
        self.max_qubits.min(MAX_SUPPORTED_QUBITS)
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    pub fn with_outcome_threshold(mut self, threshold: f64) -> Self {
        self.outcome_threshold = threshold;
        self
    }

    pub fn with_normalization_tolerance(mut self, tolerance: f64) -> Self {
        self.normalization_tolerance = tolerance;
        self
    }
}
