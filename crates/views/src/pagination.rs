/// One page of a collection. Page numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Page `page` of `items`. Page 0 is read as page 1; pages past the end are
/// empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let number = page.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let start = (number - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());

    Page {
        items: &items[start..end],
        number,
        total_pages,
        total_items: items.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirteen_items_in_pages_of_six() {
        let items = (1..=13).collect::<Vec<_>>();
        assert_eq!(total_pages(items.len(), 6), 3);

        let first = paginate(&items, 1, 6);
        assert_eq!(first.items, &[1, 2, 3, 4, 5, 6]);
        assert!(!first.has_previous());
        assert!(first.has_next());

        assert_eq!(paginate(&items, 2, 6).items.len(), 6);

        let last = paginate(&items, 3, 6);
        assert_eq!(last.items, &[13]);
        assert!(last.has_previous());
        assert!(!last.has_next());
    }

    #[test]
    fn pages_past_the_end_are_empty() {
        let items = (1..=13).collect::<Vec<_>>();
        let page = paginate(&items, 4, 6);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn page_zero_reads_as_first_page() {
        let items = [1, 2, 3];
        assert_eq!(paginate(&items, 0, 2).number, 1);
        assert_eq!(paginate(&items, 0, 2).items, &[1, 2]);
    }

    #[test]
    fn empty_collection_has_no_pages() {
        let items: [u8; 0] = [];
        assert_eq!(total_pages(0, 6), 0);
        let page = paginate(&items, 1, 6);
        assert!(page.items.is_empty());
        assert!(!page.has_next());
    }
}
