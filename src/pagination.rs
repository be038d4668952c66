use serde::Serialize;

/// Page position of a list view. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageState {
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

/// Previous/next state for the paginator; `None` from [`controls`] means
/// nothing should be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageControls {
    pub page: u32,
    pub total_pages: u64,
    pub prev_disabled: bool,
    pub next_disabled: bool,
    pub label: String,
}

impl PageState {
    pub fn new(page: u32, size: u32, total: u64) -> Self {
        Self { page, size, total }
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.total, self.size)
    }

    /// Whether `page` sits inside `1..=max(1, total_pages)`.
    pub fn in_range(&self) -> bool {
        self.page >= 1 && u64::from(self.page) <= self.total_pages().max(1)
    }

    pub fn controls(&self) -> Option<PageControls> {
        controls(self.page, self.total, self.size)
    }
}

pub fn total_pages(total: u64, size: u32) -> u64 {
    if size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(size))
}

pub fn controls(page: u32, total: u64, size: u32) -> Option<PageControls> {
    let total_pages = total_pages(total, size);
    if total_pages <= 1 {
        return None;
    }
    Some(PageControls {
        page,
        total_pages,
        prev_disabled: page == 1,
        next_disabled: u64::from(page) >= total_pages,
        label: format!("Page {page} of {total_pages}"),
    })
}

impl PageControls {
    /// Target of "Previous". Not clamped; callers rely on `prev_disabled`.
    pub fn previous(&self) -> u32 {
        self.page.saturating_sub(1)
    }

    /// Target of "Next". Not clamped; callers rely on `next_disabled`.
    pub fn next(&self) -> u32 {
        self.page.saturating_add(1)
    }
}

/// Parse a `page` query value; anything missing or below 1 means page 1.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 33), 0);
        assert_eq!(total_pages(1, 33), 1);
        assert_eq!(total_pages(33, 33), 1);
        assert_eq!(total_pages(34, 33), 2);
        assert_eq!(total_pages(100, 20), 5);
        assert_eq!(total_pages(101, 20), 6);
    }

    #[test]
    fn renders_nothing_for_a_single_page() {
        assert!(controls(1, 0, 20).is_none());
        assert!(controls(1, 20, 20).is_none());
        assert!(controls(1, 5, 0).is_none());
        assert!(controls(1, 21, 20).is_some());
    }

    #[test]
    fn button_state_follows_position() {
        for total in [21u64, 40, 99, 1000] {
            let pages = total_pages(total, 20) as u32;
            for page in 1..=pages {
                let c = controls(page, total, 20).unwrap();
                assert_eq!(c.prev_disabled, page == 1, "page {page} of {pages}");
                assert_eq!(c.next_disabled, page == pages, "page {page} of {pages}");
            }
        }
    }

    #[test]
    fn next_stays_disabled_past_the_end() {
        let c = controls(9, 40, 20).unwrap();
        assert!(c.next_disabled);
        assert!(!c.prev_disabled);
    }

    #[test]
    fn triggers_do_not_clamp() {
        let c = controls(2, 100, 33).unwrap();
        assert_eq!(c.previous(), 1);
        assert_eq!(c.next(), 3);
        assert_eq!(c.label, "Page 2 of 4");
        let last = controls(4, 100, 33).unwrap();
        assert_eq!(last.next(), 5);
    }

    #[test]
    fn page_state_range() {
        assert!(PageState::new(1, 20, 0).in_range());
        assert!(PageState::new(5, 20, 100).in_range());
        assert!(!PageState::new(6, 20, 100).in_range());
        assert!(!PageState::new(0, 20, 100).in_range());
    }

    #[test]
    fn page_query_parsing() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some(" 7 ")), 7);
    }
}
