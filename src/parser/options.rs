use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How competing parse versions are ranked when a declared conflict forked
/// them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConflictPolicy {
    /// Rule precedence, then lookahead-token precedence, then associativity,
    /// then declaration order
    #[default]
    Precedence,
    /// Associativity tags and declaration order; numeric precedence ignored
    Associativity,
    /// Earlier rules win reduce/reduce conflicts; shifts win shift/reduce
    DeclarationOrder,
}

/// Parser configuration
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Most parse versions alive at once; more are pruned, worst first
    pub max_forks: usize,
    /// Tokens a fork may run without reconverging before only the best
    /// version is kept
    pub fork_window: usize,
    /// Advisory time budget, checked between tokens
    pub timeout: Option<Duration>,
    pub cancellation: Option<CancellationToken>,
    pub conflict_policy: ConflictPolicy,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_forks: 8,
            fork_window: 32,
            timeout: None,
            cancellation: None,
            conflict_policy: ConflictPolicy::default(),
        }
    }
}

impl ParseOptions {
    pub fn with_max_forks(mut self, max_forks: usize) -> Self {
        self.max_forks = max_forks.max(1);
        self
    }

    pub fn with_fork_window(mut self, tokens: usize) -> Self {
        self.fork_window = tokens.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }
}
