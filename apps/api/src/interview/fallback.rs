//! Fallback chain: Remote → Local → Static, evaluated in order by one driver.
//!
//! Each task implements `TieredTask`. A tier reports "nothing usable" with
//! `None`; the driver then moves to the next tier. The static tier cannot fail,
//! so `resolve` always returns a value and never an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::LlmClient;

/// One strategy level of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Remote,
    Local,
    Static,
}

/// Default evaluation order.
pub const TIER_ORDER: [Tier; 3] = [Tier::Remote, Tier::Local, Tier::Static];

/// A task result tagged with the tier that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub tier: Tier,
}

/// One LLM-backed task with a deterministic local stand-in and a static default.
#[async_trait]
pub trait TieredTask: Send + Sync {
    type Output: Send;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Prompt → cache → remote → extract → validate. `None` if anything fails.
    async fn remote(&self, llm: &LlmClient) -> Option<Self::Output>;

    /// Deterministic heuristic or template output. Never touches the network.
    fn local(&self) -> Option<Self::Output>;

    /// Minimal schema-valid default.
    fn fallback(&self) -> Self::Output;
}

/// Runs `task` through the default tier order.
pub async fn resolve<T: TieredTask>(task: &T, llm: &LlmClient) -> Resolved<T::Output> {
    resolve_with(task, llm, &TIER_ORDER).await
}

/// Runs `task` through `tiers` in order. If none of them yields a value, the
/// static default is returned anyway.
pub async fn resolve_with<T: TieredTask>(
    task: &T,
    llm: &LlmClient,
    tiers: &[Tier],
) -> Resolved<T::Output> {
    for &tier in tiers {
        let attempt = match tier {
            Tier::Remote => task.remote(llm).await,
            Tier::Local => task.local(),
            Tier::Static => Some(task.fallback()),
        };

        match attempt {
            Some(value) => {
                info!("{}: produced by {:?} tier", task.name(), tier);
                return Resolved { value, tier };
            }
            None => warn!("{}: {:?} tier produced nothing usable", task.name(), tier),
        }
    }

    Resolved {
        value: task.fallback(),
        tier: Tier::Static,
    }
}
