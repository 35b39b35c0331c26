use staffdesk_core::{EmployeeId, OperationType};
use staffdesk_employees::{Employee, EmployeePatch};

use super::repository::{EmployeeQuery, EmployeeRepository, RepoError};
use crate::audit::AuditFieldInjector;
use crate::pagination::PageResult;

/// Repository decorator that stamps audit fields on writes.
///
/// `insert` is registered as [`OperationType::Create`] and `update` as
/// [`OperationType::Update`]; reads pass straight through.
#[derive(Debug, Clone)]
pub struct AuditedRepository<R> {
    inner: R,
    injector: AuditFieldInjector,
}

impl<R> AuditedRepository<R> {
    pub fn new(inner: R, injector: AuditFieldInjector) -> Self {
        Self { inner, injector }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: EmployeeRepository> EmployeeRepository for AuditedRepository<R> {
    fn get_by_username(&self, username: &str) -> Result<Option<Employee>, RepoError> {
        self.inner.get_by_username(username)
    }

    fn get_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, RepoError> {
        self.inner.get_by_id(id)
    }

    fn insert(&self, employee: Employee) -> Result<Employee, RepoError> {
        self.injector
            .around(OperationType::Create, employee, |e| self.inner.insert(e))
    }

    fn update(&self, patch: EmployeePatch) -> Result<(), RepoError> {
        self.injector
            .around(OperationType::Update, patch, |p| self.inner.update(p))
    }

    fn page_query(&self, query: &EmployeeQuery) -> Result<PageResult<Employee>, RepoError> {
        self.inner.page_query(query)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use staffdesk_auth::RequestContext;
    use staffdesk_core::{AuditFields, FixedClock};
    use staffdesk_employees::EmployeeStatus;

    use super::*;
    use crate::audit::{AuditError, AuditPolicy};
    use crate::employees::InMemoryEmployeeRepository;

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 15, 9, 0, 0).unwrap()
    }

    fn id(raw: i64) -> EmployeeId {
        EmployeeId::new(raw).unwrap()
    }

    fn new_hire(username: &str) -> Employee {
        Employee {
            id: None,
            name: "New Hire".to_string(),
            username: username.to_string(),
            password: "digest".to_string(),
            phone: "13800000000".to_string(),
            sex: "1".to_string(),
            id_number: "110101199001011234".to_string(),
            status: EmployeeStatus::Enabled,
            audit: AuditFields::default(),
        }
    }

    fn audited(
        clock: Arc<FixedClock>,
        policy: AuditPolicy,
    ) -> AuditedRepository<Arc<InMemoryEmployeeRepository>> {
        AuditedRepository::new(
            Arc::new(InMemoryEmployeeRepository::new()),
            AuditFieldInjector::new(clock, policy),
        )
    }

    #[tokio::test]
    async fn insert_is_stamped_as_create() {
        let repo = audited(Arc::new(FixedClock::new(t())), AuditPolicy::Strict);

        let stored = RequestContext::scope(async {
            RequestContext::set(id(7)).unwrap();
            repo.insert(new_hire("kim")).unwrap()
        })
        .await;

        let persisted = repo.get_by_id(stored.id.unwrap()).unwrap().unwrap();
        assert_eq!(persisted.audit.create_time, Some(t()));
        assert_eq!(persisted.audit.update_time, Some(t()));
        assert_eq!(persisted.audit.create_user, Some(id(7)));
        assert_eq!(persisted.audit.update_user, Some(id(7)));
    }

    #[tokio::test]
    async fn update_is_stamped_as_update_only() {
        let clock = Arc::new(FixedClock::new(t()));
        let repo = audited(clock.clone(), AuditPolicy::Strict);

        let created = RequestContext::scope(async {
            RequestContext::set(id(1)).unwrap();
            repo.insert(new_hire("kim")).unwrap()
        })
        .await;
        let before = repo.get_by_id(created.id.unwrap()).unwrap().unwrap();

        clock.advance(Duration::hours(3));
        RequestContext::scope(async {
            RequestContext::set(id(2)).unwrap();
            let patch = EmployeePatch::for_id(created.id.unwrap())
                .with_status(EmployeeStatus::Disabled);
            repo.update(patch).unwrap();
        })
        .await;

        let after = repo.get_by_id(created.id.unwrap()).unwrap().unwrap();
        assert_eq!(after.status, EmployeeStatus::Disabled);
        assert_eq!(after.audit.create_time, before.audit.create_time);
        assert_eq!(after.audit.create_user, before.audit.create_user);
        assert_eq!(after.audit.update_time, Some(t() + Duration::hours(3)));
        assert_eq!(after.audit.update_user, Some(id(2)));
    }

    #[test]
    fn strict_mode_fails_unauthenticated_writes() {
        let repo = audited(Arc::new(FixedClock::new(t())), AuditPolicy::Strict);

        let err = repo.insert(new_hire("kim")).unwrap_err();
        assert_eq!(err, RepoError::Audit(AuditError::MissingIdentity));
        assert!(repo.inner().is_empty());
    }

    #[test]
    fn lenient_mode_persists_unstamped() {
        let repo = audited(Arc::new(FixedClock::new(t())), AuditPolicy::Lenient);

        let stored = repo.insert(new_hire("kim")).unwrap();
        assert_eq!(stored.audit, AuditFields::default());
        assert_eq!(repo.inner().len(), 1);
    }

    #[tokio::test]
    async fn reads_are_not_stamped() {
        let repo = audited(Arc::new(FixedClock::new(t())), AuditPolicy::Strict);
        let stored = RequestContext::scope(async {
            RequestContext::set(id(1)).unwrap();
            repo.insert(new_hire("kim")).unwrap()
        })
        .await;

        let via_username = repo.get_by_username("kim").unwrap().unwrap();
        let listed = repo.page_query(&EmployeeQuery::default()).unwrap();
        assert_eq!(via_username, stored);
        assert_eq!(listed.records, vec![stored]);
    }
}
