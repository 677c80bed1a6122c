// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pod retention policies.
//!
//! A policy decides, at termination time, whether an agent's pod is deleted
//! or deliberately left running. Policies that need the pod's live status
//! receive it through a lazy fetch so that the others never cost a remote
//! call.
//!
//! In configuration a policy is either a bare name or a block:
//!
//! ```toml
//! retention = "retain_on_failure"
//! retention = { kind = "delete_if_idle_after", after_secs = 1800 }
//! ```

use crate::cloud::{CloudConfig, TTL_ANNOTATION};
use k8s_openapi::api::core::v1::Pod;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

/// Decision rule for a terminating agent's pod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum RetentionPolicy {
    /// Defer to the cloud's default policy
    #[default]
    CloudDefault,
    AlwaysDelete,
    NeverDelete,
    /// Delete unless the pod failed, so failures stay inspectable
    RetainOnFailure,
    /// Delete once the pod has shown no activity for `after_secs`
    DeleteIfIdleAfter { after_secs: u64 },
}

impl RetentionPolicy {
    /// Policy applied when neither template nor cloud chose one.
    pub const FALLBACK: RetentionPolicy = RetentionPolicy::AlwaysDelete;

    pub fn delete_if_idle_after(after: Duration) -> Self {
        Self::DeleteIfIdleAfter { after_secs: after.as_secs() }
    }

    /// The policy that actually governs an agent: the template's unless it
    /// defers, then the cloud's unless it defers too, then [`Self::FALLBACK`].
    pub fn effective(template: Option<&RetentionPolicy>, cloud: &CloudConfig) -> RetentionPolicy {
        [template, Some(&cloud.default_retention)]
            .into_iter()
            .flatten()
            .find(|p| **p != RetentionPolicy::CloudDefault)
            .cloned()
            .unwrap_or(Self::FALLBACK)
    }

    /// Decide whether the pod should be deleted.
    ///
    /// `fetch_current_pod` is only awaited by `RetainOnFailure` and
    /// `DeleteIfIdleAfter`. An absent pod is
    /// always deleted: deletion is idempotent and there is nothing to keep.
    pub async fn should_delete<F, Fut>(
        &self,
        cloud: &CloudConfig,
        now_ms: u64,
        fetch_current_pod: F,
    ) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<Pod>>,
    {
        match self {
            Self::CloudDefault => {
                let resolved = Self::effective(None, cloud);
                // `effective` never yields CloudDefault, so this recursion is one level deep.
                Box::pin(resolved.should_delete(cloud, now_ms, fetch_current_pod)).await
            }
            Self::AlwaysDelete => true,
            Self::NeverDelete => false,
            Self::RetainOnFailure => match fetch_current_pod().await {
                Some(pod) => !pod_failed(&pod),
                None => true,
            },
            Self::DeleteIfIdleAfter { after_secs } => match fetch_current_pod().await {
                Some(pod) => match last_activity_ms(&pod) {
                    Some(active_ms) => {
                        now_ms.saturating_sub(active_ms) >= after_secs.saturating_mul(1000)
                    }
                    None => true,
                },
                None => true,
            },
        }
    }
}

/// Phase `Failed`/`Unknown`, or any container that exited non-zero.
pub fn pod_failed(pod: &Pod) -> bool {
    let Some(status) = pod.status.as_ref() else {
        return false;
    };
    let bad_phase = status
        .phase
        .as_deref()
        .is_some_and(|p| p.eq_ignore_ascii_case("failed") || p.eq_ignore_ascii_case("unknown"));
    let bad_exit = status.container_statuses.iter().flatten().any(|cs| {
        cs.state
            .as_ref()
            .and_then(|s| s.terminated.as_ref())
            .is_some_and(|t| t.exit_code != 0)
    });
    bad_phase || bad_exit
}

/// Last sign of life: the TTL refresh annotation, else the creation time.
pub fn last_activity_ms(pod: &Pod) -> Option<u64> {
    let refreshed = pod
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(TTL_ANNOTATION))
        .and_then(|v| v.parse::<u64>().ok());
    refreshed.or_else(|| {
        pod.metadata
            .creation_timestamp
            .as_ref()
            .and_then(|t| u64::try_from(t.0.timestamp_millis()).ok())
    })
}

impl RetentionPolicy {
    fn unit_name(&self) -> Option<&'static str> {
        match self {
            Self::CloudDefault => Some("cloud_default"),
            Self::AlwaysDelete => Some("always_delete"),
            Self::NeverDelete => Some("never_delete"),
            Self::RetainOnFailure => Some("retain_on_failure"),
            Self::DeleteIfIdleAfter { .. } => None,
        }
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteIfIdleAfter { after_secs } => {
                write!(f, "delete_if_idle_after({}s)", after_secs)
            }
            other => f.write_str(other.unit_name().unwrap_or_default()),
        }
    }
}

impl FromStr for RetentionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cloud_default" | "default" => Ok(Self::CloudDefault),
            "always_delete" => Ok(Self::AlwaysDelete),
            "never_delete" => Ok(Self::NeverDelete),
            "retain_on_failure" => Ok(Self::RetainOnFailure),
            other => Err(format!("unknown retention policy: {}", other)),
        }
    }
}

impl Serialize for RetentionPolicy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::DeleteIfIdleAfter { after_secs } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("kind", "delete_if_idle_after")?;
                map.serialize_entry("after_secs", after_secs)?;
                map.end()
            }
            other => serializer.serialize_str(other.unit_name().unwrap_or_default()),
        }
    }
}

impl<'de> Deserialize<'de> for RetentionPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Short(String),
            Block {
                kind: String,
                #[serde(default)]
                after_secs: Option<u64>,
            },
        }

        match Helper::deserialize(deserializer)? {
            Helper::Short(name) => name.parse().map_err(D::Error::custom),
            Helper::Block { kind, after_secs } => match (kind.as_str(), after_secs) {
                ("delete_if_idle_after", Some(after_secs)) => {
                    Ok(Self::DeleteIfIdleAfter { after_secs })
                }
                ("delete_if_idle_after", None) => {
                    Err(D::Error::custom("delete_if_idle_after requires after_secs"))
                }
                (name, _) => name.parse().map_err(D::Error::custom),
            },
        }
    }
}

#[cfg(test)]
#[path = "retention_tests.rs"]
mod tests;
