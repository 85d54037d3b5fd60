use serde::{Deserialize, Serialize};

/// `?page=` query string shared by every feed route. The value is kept as
/// text and parsed leniently: anything that is not a number means page 1,
/// the same as omitting the parameter.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn requested(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }
}

/// Metadata about one page of an ordered listing. Out-of-range requests
/// clamp to the nearest valid page instead of erroring, and an empty
/// listing still has exactly one (empty) page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub num_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageMeta {
    pub fn compute(requested: i64, total: i64, page_size: u32) -> Self {
        let total = total.max(0);
        let page_size = page_size.max(1);
        let num_pages = ((total + page_size as i64 - 1) / page_size as i64).max(1) as u32;
        let page = requested.clamp(1, num_pages as i64) as u32;

        PageMeta {
            page,
            page_size,
            total,
            num_pages,
            has_next: page < num_pages,
            has_previous: page > 1,
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirteen_items_split_ten_three() {
        let first = PageMeta::compute(1, 13, 10);
        assert_eq!(first.num_pages, 2);
        assert_eq!(first.limit(), 10);
        assert_eq!(first.offset(), 0);
        assert!(first.has_next);
        assert!(!first.has_previous);

        let second = PageMeta::compute(2, 13, 10);
        assert_eq!(second.offset(), 10);
        // 3 remaining rows; LIMIT stays at page size
        assert_eq!(second.total - second.offset(), 3);
        assert!(!second.has_next);
        assert!(second.has_previous);
    }

    #[test]
    fn out_of_range_pages_clamp() {
        assert_eq!(PageMeta::compute(0, 13, 10).page, 1);
        assert_eq!(PageMeta::compute(-5, 13, 10).page, 1);
        assert_eq!(PageMeta::compute(999, 13, 10).page, 2);
    }

    #[test]
    fn empty_listing_has_one_empty_page() {
        let meta = PageMeta::compute(1, 0, 10);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.num_pages, 1);
        assert!(!meta.has_next);
        assert!(!meta.has_previous);
    }

    #[test]
    fn page_query_parses_leniently() {
        let num = PageQuery { page: Some("3".into()) };
        assert_eq!(num.requested(), 3);

        let junk = PageQuery { page: Some("abc".into()) };
        assert_eq!(junk.requested(), 1);

        let absent = PageQuery { page: None };
        assert_eq!(absent.requested(), 1);

        let padded = PageQuery { page: Some(" 2 ".into()) };
        assert_eq!(padded.requested(), 2);
    }

    #[test]
    fn exact_multiple_has_no_phantom_page() {
        let meta = PageMeta::compute(3, 20, 10);
        assert_eq!(meta.num_pages, 2);
        assert_eq!(meta.page, 2);
    }
}
