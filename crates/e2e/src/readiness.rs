//! Readiness predicates
//!
//! A UI action is "done" when its observable effect is on the page, not after
//! an arbitrary sleep. A [`Readiness`] lists the conditions that must hold, in
//! order, plus an optional floor delay for effects nothing on the page signals.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::{BrowserDriver, Locator};
use crate::error::E2eResult;

/// A single observable page condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    Visible { locator: Locator },
    Hidden { locator: Locator },

    /// First match carries `class` in its class list
    HasClass { locator: Locator, class: String },

    /// `count` animation frames have been painted
    AnimationFrames { count: u32 },
}

/// Conditions that together mean "the last action has taken effect"
#[derive(Debug, Clone, Default)]
pub struct Readiness {
    conditions: Vec<Condition>,
    floor: Duration,
}

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(mut self, locator: Locator) -> Self {
        self.conditions.push(Condition::Visible { locator });
        self
    }

    pub fn hidden(mut self, locator: Locator) -> Self {
        self.conditions.push(Condition::Hidden { locator });
        self
    }

    pub fn has_class(mut self, locator: Locator, class: impl Into<String>) -> Self {
        self.conditions.push(Condition::HasClass {
            locator,
            class: class.into(),
        });
        self
    }

    /// Wait for painted frames; zero is a no-op
    pub fn frames(mut self, count: u32) -> Self {
        if count > 0 {
            self.conditions.push(Condition::AnimationFrames { count });
        }
        self
    }

    pub fn floor(mut self, floor: Duration) -> Self {
        self.floor = floor;
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Wait out the floor, then each condition in turn. `timeout` bounds each condition.
    pub async fn wait<D>(&self, driver: &mut D, timeout: Duration) -> E2eResult<()>
    where
        D: BrowserDriver + ?Sized,
    {
        if !self.floor.is_zero() {
            tokio::time::sleep(self.floor).await;
        }
        for condition in &self.conditions {
            debug!(?condition, "Waiting for readiness");
            driver.wait_until(condition, timeout).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_frames_adds_nothing() {
        let readiness = Readiness::new().visible(Locator::css("#a")).frames(0);
        assert_eq!(readiness.conditions().len(), 1);
    }

    #[test]
    fn test_conditions_keep_order() {
        let readiness = Readiness::new()
            .has_class(Locator::text("Wireframe"), "text-white")
            .frames(2);
        assert!(matches!(readiness.conditions()[0], Condition::HasClass { .. }));
        assert_eq!(readiness.conditions()[1], Condition::AnimationFrames { count: 2 });
    }

    #[test]
    fn test_condition_wire_format() {
        let value = serde_json::to_value(Condition::AnimationFrames { count: 2 }).unwrap();
        assert_eq!(value, serde_json::json!({ "kind": "animation_frames", "count": 2 }));
    }
}
