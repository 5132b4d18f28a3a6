//! Navigation affordances derived from server-reported counts.

use crate::gateway::HARD_CAP;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub displayed_range_start: u64,
    pub displayed_range_end: u64,
}

impl PageBounds {
    /// Renders the range as `"11-15 of 1,000"`, or `"0 results"` when nothing is shown.
    pub fn describe(&self, total_count: u64) -> String {
        if total_count == 0 || self.displayed_range_end < self.displayed_range_start {
            return "0 results".to_string();
        }
        format!(
            "{}-{} of {}",
            group_thousands(self.displayed_range_start),
            group_thousands(self.displayed_range_end),
            group_thousands(total_count)
        )
    }
}

/// A short page always means there is no next page, even if `total_count` claims otherwise.
pub fn paginate(
    total_count: u64,
    page_size: u32,
    requested_page: u32,
    items_returned: usize,
) -> PageBounds {
    let page = u64::from(requested_page.max(1));
    let size = u64::from(page_size);
    if size == 0 {
        return PageBounds {
            has_next_page: false,
            has_prev_page: page > 1,
            displayed_range_start: 0,
            displayed_range_end: 0,
        };
    }

    let enumerable = total_count.min(HARD_CAP);
    let last_page = enumerable.div_ceil(size);
    let full_page = items_returned as u64 == size;

    PageBounds {
        has_next_page: full_page && page < last_page,
        has_prev_page: page > 1,
        displayed_range_start: (page - 1) * size + 1,
        displayed_range_end: (page * size).min(total_count),
    }
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
