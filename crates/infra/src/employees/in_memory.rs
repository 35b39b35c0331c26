use std::collections::BTreeMap;
use std::sync::RwLock;

use staffdesk_core::EmployeeId;
use staffdesk_employees::{Employee, EmployeePatch};

use super::repository::{EmployeeQuery, EmployeeRepository, RepoError};
use crate::pagination::PageResult;

#[derive(Debug, Default)]
struct State {
    rows: BTreeMap<EmployeeId, Employee>,
    last_id: i64,
}

/// In-memory employee store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryEmployeeRepository {
    inner: RwLock<State>,
}

impl InMemoryEmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows. A poisoned lock reads as empty; the
    /// repository methods report it as [`RepoError::Unavailable`].
    pub fn len(&self) -> usize {
        self.inner.read().map(|s| s.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> RepoError {
    RepoError::Unavailable("employee store lock poisoned".to_string())
}

impl EmployeeRepository for InMemoryEmployeeRepository {
    fn get_by_username(&self, username: &str) -> Result<Option<Employee>, RepoError> {
        let state = self.inner.read().map_err(poisoned)?;
        Ok(state.rows.values().find(|e| e.username == username).cloned())
    }

    fn get_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, RepoError> {
        let state = self.inner.read().map_err(poisoned)?;
        Ok(state.rows.get(&id).cloned())
    }

    fn insert(&self, mut employee: Employee) -> Result<Employee, RepoError> {
        let mut state = self.inner.write().map_err(poisoned)?;

        if state.rows.values().any(|e| e.username == employee.username) {
            return Err(RepoError::DuplicateUsername(employee.username));
        }

        let id = match employee.id {
            Some(id) if state.rows.contains_key(&id) => {
                return Err(RepoError::Unavailable(format!("employee id {id} is taken")));
            }
            Some(id) => id,
            None => EmployeeId::new(state.last_id + 1)
                .map_err(|e| RepoError::Unavailable(e.to_string()))?,
        };
        state.last_id = state.last_id.max(id.get());

        employee.id = Some(id);
        state.rows.insert(id, employee.clone());
        Ok(employee)
    }

    fn update(&self, patch: EmployeePatch) -> Result<(), RepoError> {
        let id = patch.id.ok_or(RepoError::MissingId)?;
        let mut state = self.inner.write().map_err(poisoned)?;

        if let Some(username) = &patch.username {
            let taken = state
                .rows
                .values()
                .any(|e| e.id != Some(id) && &e.username == username);
            if taken {
                return Err(RepoError::DuplicateUsername(username.clone()));
            }
        }

        let row = state.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        row.apply(&patch);
        Ok(())
    }

    fn page_query(&self, query: &EmployeeQuery) -> Result<PageResult<Employee>, RepoError> {
        let state = self.inner.read().map_err(poisoned)?;

        let needle = query
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_lowercase);

        let mut matching: Vec<Employee> = state
            .rows
            .values()
            .filter(|e| match &needle {
                Some(n) => e.name.to_lowercase().contains(n),
                None => true,
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            b.audit
                .create_time
                .cmp(&a.audit.create_time)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(query.page.slice(matching))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Page;
    use chrono::{TimeZone, Utc};
    use staffdesk_core::{AuditStamp, OperationType};
    use staffdesk_employees::EmployeeStatus;

    fn employee(username: &str, name: &str) -> Employee {
        Employee {
            id: None,
            name: name.to_string(),
            username: username.to_string(),
            password: "digest".to_string(),
            phone: "13800000000".to_string(),
            sex: "1".to_string(),
            id_number: "110101199001011234".to_string(),
            status: EmployeeStatus::Enabled,
            audit: Default::default(),
        }
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let repo = InMemoryEmployeeRepository::new();
        let a = repo.insert(employee("a", "Alice")).unwrap();
        let b = repo.insert(employee("b", "Bob")).unwrap();

        assert_eq!(a.id.unwrap().get(), 1);
        assert_eq!(b.id.unwrap().get(), 2);
        assert_eq!(repo.get_by_username("b").unwrap().unwrap().name, "Bob");
    }

    #[test]
    fn explicit_ids_advance_the_sequence() {
        let repo = InMemoryEmployeeRepository::new();
        let mut seeded = employee("admin", "Admin");
        seeded.id = Some(EmployeeId::new(5).unwrap());
        repo.insert(seeded).unwrap();

        let next = repo.insert(employee("b", "Bob")).unwrap();
        assert_eq!(next.id.unwrap().get(), 6);
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let repo = InMemoryEmployeeRepository::new();
        repo.insert(employee("zhangsan", "Zhang")).unwrap();

        let err = repo.insert(employee("zhangsan", "Other")).unwrap_err();
        assert_eq!(err, RepoError::DuplicateUsername("zhangsan".to_string()));
        assert_eq!(err.to_string(), "zhangsan already exists");
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn update_patches_and_guards_uniqueness() {
        let repo = InMemoryEmployeeRepository::new();
        let a = repo.insert(employee("a", "Alice")).unwrap();
        repo.insert(employee("b", "Bob")).unwrap();

        let mut patch = EmployeePatch::for_id(a.id.unwrap());
        patch.phone = Some("13900000000".to_string());
        repo.update(patch).unwrap();
        let stored = repo.get_by_id(a.id.unwrap()).unwrap().unwrap();
        assert_eq!(stored.phone, "13900000000");
        assert_eq!(stored.name, "Alice");

        let mut steal = EmployeePatch::for_id(a.id.unwrap());
        steal.username = Some("b".to_string());
        assert_eq!(
            repo.update(steal),
            Err(RepoError::DuplicateUsername("b".to_string()))
        );

        let ghost = EmployeePatch::for_id(EmployeeId::new(99).unwrap());
        assert_eq!(repo.update(ghost), Err(RepoError::NotFound));
        assert_eq!(repo.update(EmployeePatch::default()), Err(RepoError::MissingId));
    }

    #[test]
    fn page_query_filters_and_orders_newest_first() {
        let repo = InMemoryEmployeeRepository::new();
        for (i, (username, name)) in [("a", "Anna"), ("b", "Hannah"), ("c", "Carl")]
            .into_iter()
            .enumerate()
        {
            let mut e = employee(username, name);
            let at = Utc.with_ymd_and_hms(2024, 1, 1 + i as u32, 0, 0, 0).unwrap();
            e.audit
                .stamp(OperationType::Create, AuditStamp::new(at, EmployeeId::new(1).unwrap()));
            repo.insert(e).unwrap();
        }

        let all = repo.page_query(&EmployeeQuery::default()).unwrap();
        assert_eq!(all.total, 3);
        let names: Vec<_> = all.records.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Carl", "Hannah", "Anna"]);

        let filtered = repo
            .page_query(&EmployeeQuery {
                name: Some("ANN".to_string()),
                page: Page::new(Some(1), Some(1)),
            })
            .unwrap();
        assert_eq!(filtered.total, 2);
        assert_eq!(filtered.records.len(), 1);
        assert_eq!(filtered.records[0].name, "Hannah");
    }

    #[test]
    fn poisoned_store_reads_empty_and_reports_unavailable() {
        let repo = std::sync::Arc::new(InMemoryEmployeeRepository::new());
        let a = repo.insert(employee("a", "Alice")).unwrap();

        let held = repo.clone();
        let _ = std::thread::spawn(move || {
            let _guard = held.inner.write().unwrap();
            panic!("poison the store");
        })
        .join();

        assert_eq!(repo.len(), 0);
        assert!(repo.is_empty());
        assert!(matches!(
            repo.get_by_id(a.id.unwrap()),
            Err(RepoError::Unavailable(_))
        ));
    }
}
