use std::collections::BTreeMap;
use std::sync::Arc;

use strata_core::models::StrategyTag;
use strata_core::traits::IStrategyExecutor;

/// Strategy tag → executor.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    executors: BTreeMap<StrategyTag, Arc<dyn IStrategyExecutor>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the executor's own tag, replacing any previous one.
    pub fn register(&mut self, executor: Arc<dyn IStrategyExecutor>) -> &mut Self {
        self.executors.insert(executor.tag(), executor);
        self
    }

    pub fn with(mut self, executor: Arc<dyn IStrategyExecutor>) -> Self {
        self.register(executor);
        self
    }

    pub fn get(&self, tag: StrategyTag) -> Option<Arc<dyn IStrategyExecutor>> {
        self.executors.get(&tag).cloned()
    }

    pub fn contains(&self, tag: StrategyTag) -> bool {
        self.executors.contains_key(&tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = StrategyTag> + '_ {
        self.executors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry").field("tags", &self.executors.keys().collect::<Vec<_>>()).finish()
    }
}
