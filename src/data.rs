use crate::error::StudentsResult;

pub mod postgres;
pub mod student;

#[cfg(test)]
pub mod memory;

pub use student::{NewStudent, Student};

/// One page of the natural (primary key) ordering. Both values are already clamped to `>= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub const DEFAULT_PAGE: i64 = 1;
    pub const DEFAULT_LIMIT: i64 = 10;

    /// `offset = (page - 1) * limit`, negative results read from the start.
    pub const fn new(page: i64, limit: i64) -> Self {
        let offset = page.saturating_sub(1).saturating_mul(limit);

        Self {
            limit: if limit < 0 { 0 } else { limit },
            offset: if offset < 0 { 0 } else { offset },
        }
    }
}

/// Everything the routes need from persistence.
///
/// Each call is a single statement. Implementations hold no state of their own between calls
/// beyond the connection pool.
pub trait StudentStore: Clone + Send + Sync + 'static {
    fn get_page(&self, page: Page) -> impl Future<Output = StudentsResult<Vec<Student>>> + Send;

    fn get_by_id(&self, id: i64) -> impl Future<Output = StudentsResult<Option<Student>>> + Send;

    /// Returns the stored row, including its generated id.
    fn insert(&self, to_be_added: NewStudent) -> impl Future<Output = StudentsResult<Student>> + Send;

    /// `None` when no row has this id, or when the row already holds exactly these values.
    fn update(
        &self,
        id: i64,
        replacement: NewStudent,
    ) -> impl Future<Output = StudentsResult<Option<Student>>> + Send;

    /// `true` if a row was removed.
    fn remove(&self, id: i64) -> impl Future<Output = StudentsResult<bool>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_skip_whole_pages() {
        assert_eq!(Page::new(1, 10), Page { limit: 10, offset: 0 });
        assert_eq!(Page::new(2, 5), Page { limit: 5, offset: 5 });
        assert_eq!(Page::new(4, 3), Page { limit: 3, offset: 9 });
    }

    #[test]
    fn nonsense_pages_are_clamped() {
        assert_eq!(Page::new(0, 10), Page { limit: 10, offset: 0 });
        assert_eq!(Page::new(-3, 10), Page { limit: 10, offset: 0 });
        assert_eq!(Page::new(3, -10), Page { limit: 0, offset: 0 });
        assert_eq!(
            Page::new(i64::MAX, i64::MAX),
            Page {
                limit: i64::MAX,
                offset: i64::MAX
            }
        );
    }
}
