//! Lifecycle decisions derived from a Shoot snapshot
//!
//! The reconciler asks these questions before it starts working on a Shoot:
//! should it be skipped, did the last run fail, how often should it run and
//! when may disruptive maintenance happen.

use std::time::Duration;

use crate::annotations::{self, has_true_value};
use crate::config::PolicyConfig;
use crate::maintenance::MaintenanceTimeWindow;
use crate::shoot::{LastOperationState, Shoot};

/// Skip a Shoot carrying the ignore annotation, if overrides are honored
pub fn should_ignore_shoot(respect_sync_period_overwrite: bool, shoot: &Shoot) -> bool {
    respect_sync_period_overwrite && has_true_value(shoot.annotations(), annotations::shoot::IGNORE)
}

/// Whether per-Shoot overrides apply; system Shoots in `garden_namespace` always honor them
pub fn respect_sync_period_overwrite(
    respect_sync_period_overwrite: bool,
    garden_namespace: &str,
    shoot: &Shoot,
) -> bool {
    respect_sync_period_overwrite || shoot.namespace() == Some(garden_namespace)
}

/// Effective reconciliation interval, never below `default_min_sync_period`
pub fn sync_period_of_shoot(
    respect_sync_period_overwrite: bool,
    default_min_sync_period: Duration,
    shoot: &Shoot,
) -> Duration {
    if !respect_sync_period_overwrite {
        return default_min_sync_period;
    }

    shoot
        .annotations()
        .and_then(|a| annotations::get_annotation(a, annotations::shoot::SYNC_PERIOD))
        .and_then(annotations::parse_duration)
        .map(|period| period.max(default_min_sync_period))
        .unwrap_or(default_min_sync_period)
}

/// Observed at the current generation and last operation succeeded
pub fn is_observed_at_latest_generation_and_succeeded(shoot: &Shoot) -> bool {
    shoot.is_observed_at_latest_generation()
        && shoot.last_operation_state() == Some(LastOperationState::Succeeded)
}

/// Maintenance window to act on, shrunk at the end; always-eligible if unset or invalid
pub fn effective_shoot_maintenance_window(shoot: &Shoot) -> MaintenanceTimeWindow {
    shoot
        .spec
        .maintenance
        .as_ref()
        .and_then(|m| m.time_window.as_ref())
        .and_then(|w| MaintenanceTimeWindow::parse(&w.begin, &w.end).ok())
        .map(|w| w.effective())
        .unwrap_or(MaintenanceTimeWindow::ALWAYS)
}

/// Policy evaluator bound to a control plane configuration
#[derive(Debug, Clone)]
pub struct LifecyclePolicy {
    config: PolicyConfig,
}

impl LifecyclePolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn should_ignore(&self, shoot: &Shoot) -> bool {
        should_ignore_shoot(self.config.respect_sync_period_overwrite, shoot)
    }

    pub fn respects_sync_period_overwrite(&self, shoot: &Shoot) -> bool {
        respect_sync_period_overwrite(
            self.config.respect_sync_period_overwrite,
            &self.config.garden_namespace,
            shoot,
        )
    }

    pub fn sync_period(&self, shoot: &Shoot) -> Duration {
        sync_period_of_shoot(
            self.respects_sync_period_overwrite(shoot),
            self.config.min_sync_period,
            shoot,
        )
    }

    /// A failed last operation at the current generation, recorded by this control plane version.
    ///
    /// Failures recorded by another version are not considered final so an
    /// upgrade gets a chance to retry them.
    pub fn is_failed(&self, shoot: &Shoot) -> bool {
        shoot.last_operation_state() == Some(LastOperationState::Failed)
            && shoot.is_observed_at_latest_generation()
            && shoot.status.gardener.version == self.config.gardener_version
    }

    pub fn is_observed_and_succeeded(&self, shoot: &Shoot) -> bool {
        is_observed_at_latest_generation_and_succeeded(shoot)
    }

    pub fn effective_maintenance_window(&self, shoot: &Shoot) -> MaintenanceTimeWindow {
        effective_shoot_maintenance_window(shoot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GARDEN_NAMESPACE;
    use crate::maintenance::MaintenanceTime;
    use crate::shoot::{LastOperation, Maintenance, MaintenanceTimeWindowSpec};
    use std::collections::BTreeMap;

    const VERSION: &str = "v1.10.0";

    fn shoot_with_annotation(key: &str, value: &str) -> Shoot {
        let mut shoot = Shoot::default();
        shoot.metadata.annotations = Some(BTreeMap::from([(key.to_string(), value.to_string())]));
        shoot
    }

    fn shoot_with_state(state: LastOperationState) -> Shoot {
        let mut shoot = Shoot::default();
        shoot.status.last_operation = Some(LastOperation::new(state));
        shoot
    }

    fn failed_shoot() -> Shoot {
        let mut shoot = shoot_with_state(LastOperationState::Failed);
        shoot.status.gardener.version = VERSION.to_string();
        shoot
    }

    fn shoot_with_window(begin: &str, end: &str) -> Shoot {
        let mut shoot = Shoot::default();
        shoot.spec.maintenance = Some(Maintenance {
            time_window: Some(MaintenanceTimeWindowSpec {
                begin: begin.to_string(),
                end: end.to_string(),
            }),
        });
        shoot
    }

    fn policy() -> LifecyclePolicy {
        LifecyclePolicy::new(PolicyConfig::for_version(VERSION))
    }

    #[test]
    fn test_respect_sync_period_overwrite() {
        assert!(respect_sync_period_overwrite(true, GARDEN_NAMESPACE, &Shoot::default()));
        assert!(!respect_sync_period_overwrite(false, GARDEN_NAMESPACE, &Shoot::default()));
        assert!(respect_sync_period_overwrite(
            false,
            GARDEN_NAMESPACE,
            &Shoot::new(GARDEN_NAMESPACE, "foo")
        ));
        assert!(!respect_sync_period_overwrite(
            false,
            GARDEN_NAMESPACE,
            &Shoot::new("garden-dev", "foo")
        ));
    }

    #[test]
    fn test_should_ignore_shoot() {
        let ignored = shoot_with_annotation(annotations::shoot::IGNORE, "true");
        assert!(should_ignore_shoot(true, &ignored));
        assert!(!should_ignore_shoot(false, &ignored));

        let wrong_value = shoot_with_annotation(annotations::shoot::IGNORE, "foo");
        assert!(!should_ignore_shoot(true, &wrong_value));

        assert!(!should_ignore_shoot(true, &Shoot::default()));
    }

    #[test]
    fn test_sync_period_not_respected() {
        let shoot = shoot_with_annotation(annotations::shoot::SYNC_PERIOD, "1h");
        assert_eq!(
            sync_period_of_shoot(false, Duration::from_secs(1), &shoot),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_sync_period_no_overwrite() {
        assert_eq!(
            sync_period_of_shoot(true, Duration::from_secs(1), &Shoot::default()),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_sync_period_invalid_overwrite() {
        let shoot = shoot_with_annotation(annotations::shoot::SYNC_PERIOD, "foo");
        assert_eq!(
            sync_period_of_shoot(true, Duration::from_secs(1), &shoot),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_sync_period_overwrite_too_short() {
        let shoot = shoot_with_annotation(annotations::shoot::SYNC_PERIOD, "1s");
        assert_eq!(
            sync_period_of_shoot(true, Duration::from_secs(2), &shoot),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn test_sync_period_longer_overwrite() {
        let shoot = shoot_with_annotation(annotations::shoot::SYNC_PERIOD, "3s");
        assert_eq!(
            sync_period_of_shoot(true, Duration::from_secs(2), &shoot),
            Duration::from_secs(3)
        );
    }

    #[test]
    fn test_policy_sync_period_garden_namespace() {
        let policy = policy();
        let mut shoot = shoot_with_annotation(annotations::shoot::SYNC_PERIOD, "2h");

        // Global flag is off, so user Shoots get the default
        shoot.metadata.namespace = Some("garden-dev".to_string());
        assert_eq!(policy.sync_period(&shoot), Duration::from_secs(3600));

        // System Shoots always honor the override
        shoot.metadata.namespace = Some(GARDEN_NAMESPACE.to_string());
        assert_eq!(policy.sync_period(&shoot), Duration::from_secs(7200));
    }

    #[test]
    fn test_policy_should_ignore_uses_config() {
        let shoot = shoot_with_annotation(annotations::shoot::IGNORE, "true");
        assert!(!policy().should_ignore(&shoot));

        let policy = LifecyclePolicy::new(PolicyConfig {
            respect_sync_period_overwrite: true,
            ..PolicyConfig::for_version(VERSION)
        });
        assert!(policy.should_ignore(&shoot));
    }

    #[test]
    fn test_is_failed() {
        let policy = policy();

        assert!(!policy.is_failed(&Shoot::default()));
        assert!(!policy.is_failed(&shoot_with_state(LastOperationState::Succeeded)));
        assert!(policy.is_failed(&failed_shoot()));
    }

    #[test]
    fn test_is_failed_not_at_latest_generation() {
        let mut shoot = failed_shoot();
        shoot.metadata.generation = Some(1);
        assert!(!policy().is_failed(&shoot));
    }

    #[test]
    fn test_is_failed_other_version() {
        let mut shoot = failed_shoot();
        shoot.status.gardener.version = format!("{VERSION}foo");
        assert!(!policy().is_failed(&shoot));
    }

    #[test]
    fn test_is_failed_error_state() {
        let mut shoot = failed_shoot();
        shoot.status.last_operation = Some(LastOperation::new(LastOperationState::Error));
        assert!(!policy().is_failed(&shoot));
    }

    #[test]
    fn test_is_observed_and_succeeded() {
        let mut not_observed = Shoot::default();
        not_observed.metadata.generation = Some(1);
        assert!(!is_observed_at_latest_generation_and_succeeded(&not_observed));

        assert!(!is_observed_at_latest_generation_and_succeeded(&shoot_with_state(
            LastOperationState::Error
        )));
        assert!(!is_observed_at_latest_generation_and_succeeded(&Shoot::default()));
        assert!(is_observed_at_latest_generation_and_succeeded(&shoot_with_state(
            LastOperationState::Succeeded
        )));
        assert!(policy().is_observed_and_succeeded(&shoot_with_state(LastOperationState::Succeeded)));
    }

    #[test]
    fn test_effective_window_no_maintenance() {
        assert_eq!(
            effective_shoot_maintenance_window(&Shoot::default()),
            MaintenanceTimeWindow::ALWAYS
        );
    }

    #[test]
    fn test_effective_window_no_time_window() {
        let mut shoot = Shoot::default();
        shoot.spec.maintenance = Some(Maintenance::default());
        assert_eq!(
            effective_shoot_maintenance_window(&shoot),
            MaintenanceTimeWindow::ALWAYS
        );
    }

    #[test]
    fn test_effective_window_invalid() {
        let shoot = shoot_with_window("", "");
        assert_eq!(
            effective_shoot_maintenance_window(&shoot),
            MaintenanceTimeWindow::ALWAYS
        );

        let shoot = shoot_with_window("010000+0000", "010000+0000");
        assert_eq!(
            effective_shoot_maintenance_window(&shoot),
            MaintenanceTimeWindow::ALWAYS
        );
    }

    #[test]
    fn test_effective_window_valid() {
        let shoot = shoot_with_window("010000+0000", "020000+0000");
        assert_eq!(
            policy().effective_maintenance_window(&shoot),
            MaintenanceTimeWindow::new(MaintenanceTime::new(1, 0, 0), MaintenanceTime::new(1, 45, 0))
        );
    }
}
