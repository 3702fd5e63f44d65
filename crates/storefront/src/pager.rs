//! Fixed-size pagination over an already filtered list.

/// Page sizes offered on the shop page; the first is the default.
pub const SHOP_PAGE_SIZES: [usize; 3] = [12, 24, 48];

/// Page size used by the per-category collection pages.
pub const COLLECTION_PAGE_SIZE: usize = 8;

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    /// 1-based page number, clamped into `1..=total_pages`.
    pub number: usize,
    /// Always at least 1, even for an empty list.
    pub total_pages: usize,
    /// Number of items across all pages.
    pub total_items: usize,
    /// 0-based index of the first item on this page within the full list.
    pub offset: usize,
    pub items: &'a [T],
}

impl<T> Page<'_, T> {
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// 1-based position of the first item on this page, or 0 when empty.
    #[must_use]
    pub const fn first_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.offset + 1
        }
    }
}

/// A control in the page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageButton {
    Number(usize),
    Ellipsis,
}

/// Splits lists into pages of a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            page_size: SHOP_PAGE_SIZES[0],
        }
    }
}

impl Pager {
    /// A pager with `page_size` items per page (zero is treated as one).
    #[must_use]
    pub const fn new(page_size: usize) -> Self {
        Self {
            page_size: if page_size == 0 { 1 } else { page_size },
        }
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages needed for `len` items (at least 1).
    #[must_use]
    pub const fn total_pages(&self, len: usize) -> usize {
        let pages = len.div_ceil(self.page_size);
        if pages == 0 { 1 } else { pages }
    }

    /// Slice out page `number` (1-based), clamping out-of-range requests to
    /// the nearest valid page.
    #[must_use]
    pub fn paginate<'a, T>(&self, items: &'a [T], number: usize) -> Page<'a, T> {
        let total_pages = self.total_pages(items.len());
        let number = number.clamp(1, total_pages);
        let start = ((number - 1) * self.page_size).min(items.len());
        let end = (start + self.page_size).min(items.len());
        Page {
            number,
            total_pages,
            total_items: items.len(),
            offset: start,
            items: items.get(start..end).unwrap_or_default(),
        }
    }
}

/// Page selector controls for `current` of `total` pages.
///
/// Shows every page when there are at most 5. Otherwise the first and last
/// pages are always present, with a window of `current - 1 ..= current + 1`
/// between them, widened to three pages when `current` sits at either edge,
/// and an ellipsis marking each gap.
#[must_use]
pub fn buttons(current: usize, total: usize) -> Vec<PageButton> {
    let total = total.max(1);
    let current = current.clamp(1, total);

    if total <= 5 {
        return (1..=total).map(PageButton::Number).collect();
    }

    let (lo, hi) = if current <= 2 {
        (1, 3)
    } else if current >= total - 1 {
        (total - 2, total)
    } else {
        (current - 1, current + 1)
    };

    let mut out = Vec::with_capacity(7);
    if lo > 1 {
        out.push(PageButton::Number(1));
        if lo > 2 {
            out.push(PageButton::Ellipsis);
        }
    }
    out.extend((lo..=hi).map(PageButton::Number));
    if hi < total {
        if hi < total - 1 {
            out.push(PageButton::Ellipsis);
        }
        out.push(PageButton::Number(total));
    }
    out
}
