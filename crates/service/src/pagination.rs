//! Pagination utilities for service layer
//!
//! `PageParams` describes the requested slice, `Page` carries one slice of
//! results plus the navigation metadata clients render.

use sea_orm::{ConnectionTrait, DbErr, PaginatorTrait, SelectorTrait};
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 50;

/// Requested page, 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageParams {
    pub page: u64,
    pub page_size: u64,
}

impl Default for PageParams {
    fn default() -> Self { Self { page: 1, page_size: DEFAULT_PAGE_SIZE } }
}

impl PageParams {
    /// Reject out-of-range values instead of silently clamping them.
    pub fn validate(&self) -> Result<(), String> {
        if self.page < 1 {
            return Err("page must be >= 1".into());
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(format!("page_size must be within 1..={MAX_PAGE_SIZE}"));
        }
        // OFFSET is a signed bigint in SQL
        let offset = self.page_index().checked_mul(self.page_size);
        if !offset.is_some_and(|o| o <= i64::MAX as u64) {
            return Err("page is too large".into());
        }
        Ok(())
    }

    /// Zero-based index for `Paginator::fetch_page`.
    pub fn page_index(&self) -> u64 {
        self.page.saturating_sub(1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct PageMeta {
    pub page: u64,
    pub page_size: u64,
    pub total_count: u64,
    pub pages_count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page: Option<u64>,
    pub previous_page: Option<u64>,
}

impl PageMeta {
    pub fn compute(page: u64, page_size: u64, total_count: u64, items_len: usize) -> Self {
        let pages_count = if page_size == 0 { 0 } else { total_count.div_ceil(page_size) };
        let seen = page.saturating_sub(1).saturating_mul(page_size).saturating_add(items_len as u64);
        let has_next = seen < total_count;
        let has_previous = page > 1;
        Self {
            page,
            page_size,
            total_count,
            pages_count,
            has_next,
            has_previous,
            next_page: page.checked_add(1).filter(|_| has_next),
            previous_page: has_previous.then(|| page - 1),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<T> {
    pub meta: PageMeta,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total_count: u64) -> Self {
        let meta = PageMeta::compute(page, page_size, total_count, items.len());
        Self { meta, items }
    }

    /// Convert items while keeping the metadata computed for the original slice.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { meta: self.meta, items: self.items.into_iter().map(f).collect() }
    }
}

/// Count and fetch one page of `query`.
pub async fn paginate<'db, C, Q>(
    query: Q,
    db: &'db C,
    params: PageParams,
) -> Result<Page<<Q::Selector as SelectorTrait>::Item>, DbErr>
where
    C: ConnectionTrait,
    Q: PaginatorTrait<'db, C>,
{
    let paginator = query.paginate(db, params.page_size);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(params.page_index()).await?;
    Ok(Page::new(items, params.page, params.page_size, total))
}
