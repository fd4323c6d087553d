//! In-memory users collection.

use std::sync::Mutex;

use async_trait::async_trait;

use super::lock;
use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{RecordId, UserChanges, UserRecord};

/// [`UserRepository`] over a mutex-guarded vector.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    records: Mutex<Vec<UserRecord>>,
}

impl MemoryUserRepository {
    /// Repository pre-populated with `records`.
    #[must_use]
    pub fn with_records(records: Vec<UserRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn list(&self) -> Result<Vec<UserRecord>, UserPersistenceError> {
        Ok(lock(&self.records).clone())
    }

    async fn insert(&self, record: UserRecord) -> Result<UserRecord, UserPersistenceError> {
        let mut records = lock(&self.records);
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(UserPersistenceError::duplicate(record.id.as_str()));
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: &RecordId,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, UserPersistenceError> {
        let mut records = lock(&self.records);
        let Some(record) = records.iter_mut().find(|record| &record.id == id) else {
            return Ok(None);
        };
        changes.apply(&mut record.document);
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &RecordId) -> Result<Option<UserRecord>, UserPersistenceError> {
        let mut records = lock(&self.records);
        let position = records.iter().position(|record| &record.id == id);
        Ok(position.map(|index| records.remove(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserDocument;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    fn record(id: &str, name: &str) -> UserRecord {
        UserRecord {
            id: RecordId::parse(id).expect("valid id"),
            document: UserDocument {
                name: name.to_owned(),
                email: format!("{}@example.com", name.to_lowercase()),
                gender: "female".to_owned(),
                department: "Engineering".to_owned(),
                phone: "5550100123".to_owned(),
                is_active: true,
                start_date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
            },
        }
    }

    #[fixture]
    fn repo() -> MemoryUserRepository {
        MemoryUserRepository::with_records(vec![
            record("000000000000000000000001", "Ada"),
            record("000000000000000000000002", "Barbara"),
        ])
    }

    #[rstest]
    #[tokio::test]
    async fn insert_appends_in_order(repo: MemoryUserRepository) {
        repo.insert(record("000000000000000000000003", "Claude"))
            .await
            .expect("insert");

        let names: Vec<_> = repo
            .list()
            .await
            .expect("list")
            .into_iter()
            .map(|user| user.document.name)
            .collect();
        assert_eq!(names, ["Ada", "Barbara", "Claude"]);
    }

    #[rstest]
    #[tokio::test]
    async fn insert_rejects_taken_id(repo: MemoryUserRepository) {
        let err = repo
            .insert(record("000000000000000000000001", "Imposter"))
            .await
            .expect_err("duplicate");

        assert_eq!(
            err,
            UserPersistenceError::duplicate("000000000000000000000001")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn update_merges_and_keeps_position(repo: MemoryUserRepository) {
        let id = RecordId::parse("000000000000000000000001").expect("valid id");
        let changes = UserChanges {
            department: Some("Research".to_owned()),
            ..UserChanges::default()
        };

        let updated = repo
            .update(&id, changes)
            .await
            .expect("update")
            .expect("present");

        assert_eq!(updated.document.department, "Research");
        let listed = repo.list().await.expect("list");
        assert_eq!(listed.first(), Some(&updated));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_records_yield_none(repo: MemoryUserRepository) {
        let id = RecordId::parse("00000000000000000000ffff").expect("valid id");

        assert!(repo
            .update(&id, UserChanges::default())
            .await
            .expect("update")
            .is_none());
        assert!(repo.delete(&id).await.expect("delete").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn delete_returns_removed_record(repo: MemoryUserRepository) {
        let id = RecordId::parse("000000000000000000000002").expect("valid id");

        let removed = repo.delete(&id).await.expect("delete").expect("present");

        assert_eq!(removed.document.name, "Barbara");
        assert_eq!(repo.list().await.expect("list").len(), 1);
    }
}
