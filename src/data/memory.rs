use crate::{
    data::{NewStudent, Page, Student, StudentStore},
    error::StudentsResult,
};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

/// A `StudentStore` over a map, for exercising the routes without a database.
#[derive(Clone, Debug, Default)]
pub struct MemoryStudentStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    rows: BTreeMap<i64, Student>,
}

impl MemoryStudentStore {
    pub fn row_count(&self) -> usize {
        self.inner.lock().expect("poisoned store").rows.len()
    }
}

fn with_id(id: i64, new: NewStudent) -> Student {
    let NewStudent {
        first_name,
        last_name,
        course,
        year,
        enrolled,
    } = new;

    Student {
        id,
        first_name,
        last_name,
        course,
        year,
        enrolled,
    }
}

impl StudentStore for MemoryStudentStore {
    async fn get_page(&self, page: Page) -> StudentsResult<Vec<Student>> {
        let inner = self.inner.lock().expect("poisoned store");
        let skip = usize::try_from(page.offset).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit).unwrap_or(usize::MAX);

        Ok(inner.rows.values().skip(skip).take(take).cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> StudentsResult<Option<Student>> {
        Ok(self.inner.lock().expect("poisoned store").rows.get(&id).cloned())
    }

    async fn insert(&self, to_be_added: NewStudent) -> StudentsResult<Student> {
        let mut inner = self.inner.lock().expect("poisoned store");
        inner.last_id += 1;
        let student = with_id(inner.last_id, to_be_added);
        inner.rows.insert(student.id, student.clone());
        Ok(student)
    }

    async fn update(&self, id: i64, replacement: NewStudent) -> StudentsResult<Option<Student>> {
        let mut inner = self.inner.lock().expect("poisoned store");
        let Some(existing) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };

        let replaced = with_id(id, replacement);
        if *existing == replaced {
            return Ok(None);
        }
        *existing = replaced.clone();
        Ok(Some(replaced))
    }

    async fn remove(&self, id: i64) -> StudentsResult<bool> {
        Ok(self
            .inner
            .lock()
            .expect("poisoned store")
            .rows
            .remove(&id)
            .is_some())
    }
}
