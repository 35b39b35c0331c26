//! Audit field stamping for persistence-bound writes.
//!
//! Writes that must be audited are routed through [`AuditFieldInjector`]
//! explicitly, together with their [`OperationType`]. The injector captures one
//! (instant, identity) pair per write, from its clock and the current
//! [`RequestContext`], and stamps the record before the write proceeds.

use std::sync::Arc;

use thiserror::Error;

use staffdesk_auth::RequestContext;
use staffdesk_core::{AuditStamp, Auditable, Clock, OperationType, SystemClock};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("record type '{record}' has no audit fields")]
    UnsupportedRecordShape { record: &'static str },

    #[error("no authenticated employee bound to the current request")]
    MissingIdentity,
}

/// What to do when a record cannot be stamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuditPolicy {
    /// Log and let the write continue unstamped.
    #[default]
    Lenient,
    /// Fail the write.
    Strict,
}

#[derive(Clone)]
pub struct AuditFieldInjector {
    clock: Arc<dyn Clock>,
    policy: AuditPolicy,
}

impl AuditFieldInjector {
    pub fn new(clock: Arc<dyn Clock>, policy: AuditPolicy) -> Self {
        Self { clock, policy }
    }

    pub fn policy(&self) -> AuditPolicy {
        self.policy
    }

    /// Stamp `record` for `op` using the request's identity and the clock.
    ///
    /// Returns the stamp that was applied, or `None` when a lenient skip happened.
    pub fn inject<T>(&self, op: OperationType, record: &mut T) -> Result<Option<AuditStamp>, AuditError>
    where
        T: Auditable + ?Sized,
    {
        let Some(by) = RequestContext::get() else {
            return self.skip::<T>(op, AuditError::MissingIdentity).map(|()| None);
        };
        let stamp = AuditStamp::new(self.clock.now(), by);
        let stamped = self.apply(op, record, stamp)?;
        Ok(stamped.then_some(stamp))
    }

    /// Stamp `record` for `op` from an explicitly supplied stamp.
    pub fn inject_with<T>(
        &self,
        op: OperationType,
        record: &mut T,
        stamp: AuditStamp,
    ) -> Result<(), AuditError>
    where
        T: Auditable + ?Sized,
    {
        self.apply(op, record, stamp).map(|_| ())
    }

    /// Stamp `record`, then hand it to `call`.
    ///
    /// `call` does not run when a strict-mode stamping failure occurs.
    pub fn around<T, R, E, F>(&self, op: OperationType, mut record: T, call: F) -> Result<R, E>
    where
        T: Auditable,
        F: FnOnce(T) -> Result<R, E>,
        E: From<AuditError>,
    {
        self.inject(op, &mut record)?;
        call(record)
    }

    fn apply<T>(&self, op: OperationType, record: &mut T, stamp: AuditStamp) -> Result<bool, AuditError>
    where
        T: Auditable + ?Sized,
    {
        match record.audit_fields_mut() {
            Some(fields) => {
                fields.stamp(op, stamp);
                tracing::debug!(
                    op = %op,
                    record = std::any::type_name::<T>(),
                    by = %stamp.by,
                    at = %stamp.at,
                    "audit fields stamped"
                );
                Ok(true)
            }
            None => self
                .skip::<T>(
                    op,
                    AuditError::UnsupportedRecordShape {
                        record: std::any::type_name::<T>(),
                    },
                )
                .map(|()| false),
        }
    }

    fn skip<T: ?Sized>(&self, op: OperationType, err: AuditError) -> Result<(), AuditError> {
        match self.policy {
            AuditPolicy::Lenient => {
                tracing::warn!(
                    op = %op,
                    record = std::any::type_name::<T>(),
                    error = %err,
                    "audit fields not stamped; write continues"
                );
                Ok(())
            }
            AuditPolicy::Strict => Err(err),
        }
    }
}

impl Default for AuditFieldInjector {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), AuditPolicy::default())
    }
}

impl core::fmt::Debug for AuditFieldInjector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuditFieldInjector")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use staffdesk_core::{AuditFields, EmployeeId, FixedClock};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Department {
        name: String,
        audit: AuditFields,
    }

    impl Auditable for Department {
        fn audit_fields_mut(&mut self) -> Option<&mut AuditFields> {
            Some(&mut self.audit)
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct LoginAttempt {
        username: String,
    }

    impl Auditable for LoginAttempt {
        fn audit_fields_mut(&mut self) -> Option<&mut AuditFields> {
            None
        }
    }

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 10, 30, 0).unwrap()
    }

    fn id(raw: i64) -> EmployeeId {
        EmployeeId::new(raw).unwrap()
    }

    fn injector(policy: AuditPolicy) -> AuditFieldInjector {
        AuditFieldInjector::new(Arc::new(FixedClock::new(t())), policy)
    }

    #[tokio::test]
    async fn create_sets_all_four_from_the_bound_identity() {
        let record = RequestContext::scope(async {
            RequestContext::set(id(7)).unwrap();
            let mut record = Department {
                name: "Kitchen".to_string(),
                ..Department::default()
            };
            let stamp = injector(AuditPolicy::Strict)
                .inject(OperationType::Create, &mut record)
                .unwrap();
            assert_eq!(stamp, Some(AuditStamp::new(t(), id(7))));
            record
        })
        .await;

        assert_eq!(record.name, "Kitchen");
        assert_eq!(record.audit.create_time, Some(t()));
        assert_eq!(record.audit.update_time, Some(t()));
        assert_eq!(record.audit.create_user, Some(id(7)));
        assert_eq!(record.audit.update_user, Some(id(7)));
    }

    #[tokio::test]
    async fn update_leaves_creation_stamps_untouched() {
        let earlier = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let mut record = Department::default();
        record
            .audit
            .stamp(OperationType::Create, AuditStamp::new(earlier, id(1)));
        let before = record.clone();

        let record = RequestContext::scope(async move {
            RequestContext::set(id(2)).unwrap();
            injector(AuditPolicy::Strict)
                .inject(OperationType::Update, &mut record)
                .unwrap();
            record
        })
        .await;

        assert_eq!(record.audit.create_time, before.audit.create_time);
        assert_eq!(record.audit.create_user, before.audit.create_user);
        assert_eq!(record.audit.update_time, Some(t()));
        assert_eq!(record.audit.update_user, Some(id(2)));
    }

    #[test]
    fn default_injector_is_lenient() {
        assert_eq!(AuditFieldInjector::default().policy(), AuditPolicy::Lenient);
        assert_eq!(injector(AuditPolicy::Strict).policy(), AuditPolicy::Strict);
    }

    #[test]
    fn explicit_stamp_needs_no_request_context() {
        let mut record = Department::default();
        let stamp = AuditStamp::new(t(), id(5));
        injector(AuditPolicy::Strict)
            .inject_with(OperationType::Create, &mut record, stamp)
            .unwrap();
        assert_eq!(record.audit.create_user, Some(id(5)));
    }

    #[test]
    fn lenient_mode_skips_records_without_audit_fields() {
        let mut record = LoginAttempt {
            username: "ada".to_string(),
        };
        let before = record.clone();

        let result = injector(AuditPolicy::Lenient).inject_with(
            OperationType::Create,
            &mut record,
            AuditStamp::new(t(), id(1)),
        );

        assert!(result.is_ok());
        assert_eq!(record, before);
    }

    #[test]
    fn strict_mode_rejects_records_without_audit_fields() {
        let mut record = LoginAttempt::default();
        let err = injector(AuditPolicy::Strict)
            .inject_with(OperationType::Update, &mut record, AuditStamp::new(t(), id(1)))
            .unwrap_err();
        assert!(matches!(err, AuditError::UnsupportedRecordShape { .. }));
    }

    #[test]
    fn missing_identity_follows_the_policy() {
        let mut record = Department::default();

        let skipped = injector(AuditPolicy::Lenient)
            .inject(OperationType::Create, &mut record)
            .unwrap();
        assert_eq!(skipped, None);
        assert_eq!(record.audit, AuditFields::default());

        let err = injector(AuditPolicy::Strict)
            .inject(OperationType::Create, &mut record)
            .unwrap_err();
        assert_eq!(err, AuditError::MissingIdentity);
    }

    #[tokio::test]
    async fn around_runs_the_call_with_the_stamped_record() {
        let persisted = RequestContext::scope(async {
            RequestContext::set(id(7)).unwrap();
            injector(AuditPolicy::Strict).around(
                OperationType::Create,
                Department::default(),
                |record| Ok::<_, AuditError>(record),
            )
        })
        .await
        .unwrap();

        assert_eq!(persisted.audit.create_user, Some(id(7)));
    }

    #[test]
    fn around_does_not_call_through_on_strict_failure() {
        let mut called = false;
        let result = injector(AuditPolicy::Strict).around(
            OperationType::Create,
            Department::default(),
            |_record| {
                called = true;
                Ok::<_, AuditError>(())
            },
        );

        assert_eq!(result, Err(AuditError::MissingIdentity));
        assert!(!called);
    }
}
