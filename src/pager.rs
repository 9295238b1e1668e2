//! Fixed-size pagination of the displayed gallery list

/// Number of galleries shown per page
pub const PAGE_SIZE: usize = 100;

/// Splits an ordered list into pages and tracks the active one
///
/// There is always at least one page; an empty list yields a single empty
/// page. The active index survives re-chunking and is only pulled back to the
/// last page when the page count shrinks below it.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    pages: Vec<Vec<T>>,
    page_size: usize,
    current: usize,
}

impl<T: Clone> Paginator<T> {
    /// Create a paginator holding one empty page
    ///
    /// A `page_size` of zero is treated as one.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            pages: vec![Vec::new()],
            page_size: page_size.max(1),
            current: 0,
        }
    }

    /// Re-chunk `items` into pages, clamping the active index if needed
    pub fn setup(&mut self, items: &[T]) -> &[Vec<T>] {
        self.pages = items
            .chunks(self.page_size)
            .map(<[T]>::to_vec)
            .collect();
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        self.clamp();
        &self.pages
    }

    /// Adopt a new active page index, clamped to the last page
    pub fn select(&mut self, index: usize) -> &[T] {
        self.current = index;
        self.clamp();
        self.current_page()
    }

    fn clamp(&mut self) {
        if self.current + 1 > self.page_count() {
            self.current = self.page_count() - 1;
        }
    }

    #[must_use]
    pub fn current_page(&self) -> &[T] {
        &self.pages[self.current]
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn page(&self, index: usize) -> Option<&[T]> {
        self.pages.get(index).map(Vec::as_slice)
    }

    #[must_use]
    pub fn pages(&self) -> &[Vec<T>] {
        &self.pages
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }
}

impl<T: Clone> Default for Paginator<T> {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}
