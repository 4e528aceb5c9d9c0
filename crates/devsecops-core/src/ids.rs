//! Identifier generation for session-scoped instances

/// Source of unique identifiers.
///
/// Every id returned within one generator's lifetime is unique, regardless of
/// the prefix asked for.
pub trait IdGenerator: Send {
    fn next_id(&mut self, prefix: &str) -> String;
}

/// Deterministic counter-based generator (`comp_1`, `threat_2`, ...)
#[derive(Debug, Clone, Default)]
pub struct SequentialIdGenerator {
    counter: u64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting after `counter`
    pub fn starting_at(counter: u64) -> Self {
        Self { counter }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{}_{}", prefix, self.counter)
    }
}

/// Random v4 UUID generator
#[cfg(feature = "uuid")]
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

#[cfg(feature = "uuid")]
impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self, prefix: &str) -> String {
        format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
    }
}
