use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;

/// Number of pages for `total` items; never less than one
pub fn page_count(total: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    total.div_ceil(size).max(1)
}

/// Navigation request for the pager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageNav {
    First,
    Prev,
    Next,
    Last,
    To(usize),
}

/// Page cursor over a client-held result set
///
/// Pages are 1-based. A disabled pager ignores every navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
    pub disabled: bool,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            disabled: false,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, total: usize) -> usize {
        page_count(total, self.page_size)
    }

    /// Clamp a requested page into `[1, page_count]`
    pub fn clamp(&self, requested: usize, total: usize) -> usize {
        requested.clamp(1, self.page_count(total))
    }

    /// Change page size; always returns to page 1
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// Move to the next configured page size after the current one
    pub fn cycle_page_size(&mut self, choices: &[usize]) {
        if choices.is_empty() {
            return;
        }
        let next = choices
            .iter()
            .position(|&s| s == self.page_size)
            .map(|i| choices[(i + 1) % choices.len()])
            .unwrap_or(choices[0]);
        self.set_page_size(next);
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Apply a navigation request against `total` items
    pub fn navigate(&mut self, nav: PageNav, total: usize) {
        if self.disabled {
            return;
        }
        let target = match nav {
            PageNav::First => 1,
            PageNav::Prev => self.page.saturating_sub(1),
            PageNav::Next => self.page.saturating_add(1),
            PageNav::Last => self.page_count(total),
            PageNav::To(p) => p,
        };
        self.page = self.clamp(target, total);
    }

    pub fn first(&mut self, total: usize) {
        self.navigate(PageNav::First, total);
    }

    pub fn prev(&mut self, total: usize) {
        self.navigate(PageNav::Prev, total);
    }

    pub fn next(&mut self, total: usize) {
        self.navigate(PageNav::Next, total);
    }

    pub fn last(&mut self, total: usize) {
        self.navigate(PageNav::Last, total);
    }

    /// Item window of the current page, clamped to `total`
    pub fn window(&self, total: usize) -> Range<usize> {
        let page = self.clamp(self.page, total);
        let start = ((page - 1) * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }
}

/// Page-local hit positions.
///
/// `displayed` maps list positions to head indices. Positions inside `window`
/// whose head index is in `hits` are returned rebased to the window start.
pub fn page_mask(
    displayed: &[usize],
    hits: &BTreeSet<usize>,
    window: Range<usize>,
) -> BTreeSet<usize> {
    displayed
        .get(window)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter(|(_, head_idx)| hits.contains(head_idx))
        .map(|(local, _)| local)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 100), 1);
        assert_eq!(page_count(1, 100), 1);
        assert_eq!(page_count(100, 100), 1);
        assert_eq!(page_count(101, 100), 2);
        assert_eq!(page_count(250, 100), 3);
        assert_eq!(page_count(5, 0), 5);
    }

    #[test]
    fn test_clamp_requested_page() {
        let pager = Pager::new(100);
        assert_eq!(pager.clamp(0, 250), 1);
        assert_eq!(pager.clamp(99, 250), 3);
        assert_eq!(pager.clamp(2, 250), 2);
        assert_eq!(pager.clamp(7, 0), 1);
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut pager = Pager::new(100);
        pager.prev(250);
        assert_eq!(pager.page(), 1);
        pager.last(250);
        assert_eq!(pager.page(), 3);
        pager.next(250);
        assert_eq!(pager.page(), 3);
        pager.prev(250);
        assert_eq!(pager.page(), 2);
        pager.first(250);
        assert_eq!(pager.page(), 1);
        pager.navigate(PageNav::To(99), 250);
        assert_eq!(pager.page(), 3);
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let mut pager = Pager::new(10);
        pager.last(95);
        assert_eq!(pager.page(), 10);
        pager.set_page_size(25);
        assert_eq!(pager.page(), 1);
        assert_eq!(pager.page_count(95), 4);
    }

    #[test]
    fn test_cycle_page_size() {
        let mut pager = Pager::new(50);
        let choices = [25, 50, 100];
        pager.cycle_page_size(&choices);
        assert_eq!(pager.page_size(), 100);
        pager.cycle_page_size(&choices);
        assert_eq!(pager.page_size(), 25);

        let mut odd = Pager::new(7);
        odd.cycle_page_size(&choices);
        assert_eq!(odd.page_size(), 25);
    }

    #[test]
    fn test_disabled_pager_ignores_navigation() {
        let mut pager = Pager::new(10);
        pager.disabled = true;
        pager.next(100);
        pager.last(100);
        assert_eq!(pager.page(), 1);
    }

    #[test]
    fn test_window() {
        let mut pager = Pager::new(100);
        assert_eq!(pager.window(250), 0..100);
        pager.last(250);
        assert_eq!(pager.window(250), 200..250);
        assert_eq!(pager.window(0), 0..0);
    }

    #[test]
    fn test_window_follows_shrinking_total() {
        let mut pager = Pager::new(10);
        pager.last(100);
        assert_eq!(pager.window(15), 10..15);
    }

    #[test]
    fn test_page_mask_rebases_to_window() {
        let displayed: Vec<usize> = (0..25).collect();
        let hits: BTreeSet<usize> = [3, 11, 12, 24].into_iter().collect();
        let mask = page_mask(&displayed, &hits, 10..20);
        assert_eq!(mask.into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_page_mask_over_filtered_list() {
        let displayed = vec![2, 5, 9];
        let hits: BTreeSet<usize> = [5, 9].into_iter().collect();
        let mask = page_mask(&displayed, &hits, 0..3);
        assert_eq!(mask.into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }
}
