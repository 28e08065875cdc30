use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Select};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

pub const MAX_PAGE_SIZE: u64 = 100;

/// Highest page whose offset still fits SQLite's signed 64-bit OFFSET.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

/// `?page=N&page_size=M`, pages start at 1.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl PageParams {
    pub fn resolve(&self, default_size: u64) -> (u64, u64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let size = self
            .page_size
            .unwrap_or(default_size)
            .clamp(1, MAX_PAGE_SIZE);
        (page, size)
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<u64>,
    pub previous: Option<u64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: u64, page: u64, size: u64) -> Self {
        Self {
            count,
            next: (page.saturating_mul(size) < count).then_some(page + 1),
            previous: (page > 1).then(|| page - 1),
            results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

pub async fn paginate<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    params: &PageParams,
    default_size: u64,
) -> AppResult<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
{
    let (page, size) = params.resolve(default_size);
    let paginator = select.paginate(db, size);
    let count = paginator.num_items().await?;
    let results = paginator.fetch_page(page - 1).await?;
    Ok(Page::new(results, count, page, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_and_bounds() {
        assert_eq!(PageParams::default().resolve(10), (1, 10));
        let params = PageParams {
            page: Some(0),
            page_size: Some(1000),
        };
        assert_eq!(params.resolve(10), (1, MAX_PAGE_SIZE));
    }

    #[test]
    fn test_resolve_caps_huge_pages() {
        let params = PageParams {
            page: Some(u64::MAX),
            page_size: Some(MAX_PAGE_SIZE),
        };
        let (page, size) = params.resolve(10);
        assert_eq!(page, MAX_PAGE);
        assert!((page - 1).checked_mul(size).is_some_and(|offset| offset <= i64::MAX as u64));
    }

    #[tokio::test]
    async fn test_paginate_past_the_end_is_empty() {
        use crate::entities::cliente;
        use crate::test_support::salon;

        let s = salon().await;
        for page in [u64::MAX / 2, 2] {
            let params = PageParams {
                page: Some(page),
                page_size: None,
            };
            let result = paginate(&s.db, cliente::Entity::find(), &params, 10)
                .await
                .unwrap();
            assert_eq!(result.count, 1);
            assert!(result.results.is_empty());
            assert_eq!(result.next, None);
        }
    }

    #[test]
    fn test_next_and_previous() {
        let first = Page::new(vec![1, 2], 5, 1, 2);
        assert_eq!(first.next, Some(2));
        assert_eq!(first.previous, None);

        let last = Page::new(vec![5], 5, 3, 2);
        assert_eq!(last.next, None);
        assert_eq!(last.previous, Some(2));
    }
}
