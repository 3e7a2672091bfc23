use serde::{Deserialize, Serialize};

/// `?page=` query parameter, kept as a raw string: anything non-numeric
/// falls back to the first page instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// 解析请求的页码；缺省或非数字时为第一页
    pub fn number(&self) -> usize {
        parse_page_number(self.page.as_deref())
    }
}

pub fn parse_page_number(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map(|n| if n < 1 { 1 } else { n as usize })
        .unwrap_or(1)
}

/// 分页结果结构
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page: Option<usize>,
    pub next_page: Option<usize>,
}

/// Slices an already-ordered sequence into fixed-size pages.
///
/// Page numbers are 1-based. Out-of-range requests clamp to the nearest
/// valid page; the input ordering is never touched.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: usize,
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn paginate<T>(&self, items: Vec<T>, requested: usize) -> Page<T> {
        let total_items = items.len();
        let total_pages = if total_items == 0 {
            1
        } else {
            (total_items + self.per_page - 1) / self.per_page
        };

        let number = requested.clamp(1, total_pages);
        let start = (number - 1) * self.per_page;
        let page_items: Vec<T> = items
            .into_iter()
            .skip(start)
            .take(self.per_page)
            .collect();

        Page {
            items: page_items,
            number,
            per_page: self.per_page,
            total_items,
            total_pages,
            has_previous: number > 1,
            has_next: number < total_pages,
            previous_page: (number > 1).then(|| number - 1),
            next_page: (number < total_pages).then(|| number + 1),
        }
    }
}
