use crate::Result;

/// Splits an ordered collection of `count` items into pages of `per_page`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paginator {
    count: i64,
    per_page: i32,
}

impl Paginator {
    pub fn new(count: i64, per_page: i32) -> Self {
        Paginator {
            count: count.max(0),
            per_page: per_page.max(1),
        }
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    /// An empty collection still has one (empty) page.
    pub fn num_pages(&self) -> i32 {
        let per_page = i64::from(self.per_page);
        let pages = (self.count + per_page - 1) / per_page;
        pages.max(1) as i32
    }

    /// Clamps a requested page number to the nearest existing page.
    /// No page number at all means the first one.
    pub fn validate_number(&self, number: Option<i32>) -> i32 {
        number.unwrap_or(1).max(1).min(self.num_pages())
    }

    /// `(offset, end)` of a page, end excluded.
    pub fn limits(&self, number: i32) -> (i32, i32) {
        let number = self.validate_number(Some(number));
        (
            (number - 1) * self.per_page,
            number * self.per_page,
        )
    }

    /// Builds the requested page, `fetch` loading the items between the given limits.
    pub fn get_page<T, F>(&self, number: Option<i32>, fetch: F) -> Result<PageObj<T>>
    where
        F: FnOnce((i32, i32)) -> Result<Vec<T>>,
    {
        let number = self.validate_number(number);
        let items = fetch(self.limits(number))?;
        Ok(PageObj::new(items, number, *self))
    }
}

/// One page of a paginated listing.
#[derive(Clone, Debug, Serialize)]
pub struct PageObj<T> {
    pub object_list: Vec<T>,
    pub number: i32,
    pub num_pages: i32,
    pub count: i64,
    pub per_page: i32,
    pub has_next: bool,
    pub has_previous: bool,
    pub start_index: i64,
    pub end_index: i64,
}

impl<T> PageObj<T> {
    fn new(object_list: Vec<T>, number: i32, paginator: Paginator) -> Self {
        let num_pages = paginator.num_pages();
        let offset = i64::from(number - 1) * i64::from(paginator.per_page);
        let (start_index, end_index) = if object_list.is_empty() {
            (0, 0)
        } else {
            (offset + 1, offset + object_list.len() as i64)
        };
        PageObj {
            object_list,
            number,
            num_pages,
            count: paginator.count,
            per_page: paginator.per_page,
            has_next: number < num_pages,
            has_previous: number > 1,
            start_index,
            end_index,
        }
    }

    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }

    pub fn next_page_number(&self) -> Option<i32> {
        if self.has_next {
            Some(self.number + 1)
        } else {
            None
        }
    }

    pub fn previous_page_number(&self) -> Option<i32> {
        if self.has_previous {
            Some(self.number - 1)
        } else {
            None
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.object_list.iter()
    }

    /// Converts the items while keeping the page metadata.
    pub fn try_map<U, F>(self, f: F) -> Result<PageObj<U>>
    where
        F: FnMut(T) -> Result<U>,
    {
        Ok(PageObj {
            object_list: self
                .object_list
                .into_iter()
                .map(f)
                .collect::<Result<Vec<U>>>()?,
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
            has_next: self.has_next,
            has_previous: self.has_previous,
            start_index: self.start_index,
            end_index: self.end_index,
        })
    }
}

impl<T: PartialEq> PageObj<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.object_list.contains(item)
    }
}

impl<T> IntoIterator for PageObj<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.object_list.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a PageObj<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.object_list.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    fn page_of(items: &[i32], per_page: i32, number: Option<i32>) -> PageObj<i32> {
        Paginator::new(items.len() as i64, per_page)
            .get_page(number, |(min, max)| {
                let max = (max as usize).min(items.len());
                Ok(items[(min as usize).min(max)..max].to_vec())
            })
            .unwrap()
    }

    #[test]
    fn page_sizes() {
        for n in 0..40 {
            let items = (0..n).collect::<Vec<i32>>();
            for per_page in 1..12 {
                let paginator = Paginator::new(n.into(), per_page);
                for k in 1..=paginator.num_pages() {
                    let page = page_of(&items, per_page, Some(k));
                    let expected = per_page.min(n - (k - 1) * per_page).max(0);
                    assert_eq!(page.len() as i32, expected, "n={} p={} k={}", n, per_page, k);
                }
            }
        }
    }

    #[test]
    fn thirteen_items() {
        let items = (0..13).collect::<Vec<_>>();
        let first = page_of(&items, 10, Some(1));
        assert_eq!(first.len(), 10);
        assert_eq!(first.num_pages, 2);
        assert!(first.has_next);
        assert!(!first.has_previous);
        assert_eq!(first.next_page_number(), Some(2));
        assert_eq!((first.start_index, first.end_index), (1, 10));

        let second = page_of(&items, 10, Some(2));
        assert_eq!(second.len(), 3);
        assert!(!second.has_next);
        assert_eq!(second.previous_page_number(), Some(1));
        assert_eq!((second.start_index, second.end_index), (11, 13));
        assert!(second.contains(&12));
        assert!(!second.contains(&0));
    }

    #[test]
    fn out_of_range_pages_are_clamped() {
        let items = (0..13).collect::<Vec<_>>();
        assert_eq!(page_of(&items, 10, Some(99)).number, 2);
        assert_eq!(page_of(&items, 10, Some(0)).number, 1);
        assert_eq!(page_of(&items, 10, Some(-3)).number, 1);
        assert_eq!(page_of(&items, 10, None).number, 1);
    }

    #[test]
    fn empty_collection() {
        let page = page_of(&[], 10, Some(5));
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.is_empty());
        assert_eq!((page.start_index, page.end_index), (0, 0));
    }

    #[test]
    fn try_map_keeps_metadata() {
        let items = (0..13).collect::<Vec<_>>();
        let page = page_of(&items, 5, Some(2))
            .try_map(|i| Ok(i.to_string()))
            .unwrap();
        assert_eq!(page.number, 2);
        assert_eq!(page.num_pages, 3);
        assert_eq!(
            page.iter().cloned().collect::<Vec<_>>(),
            vec!["5", "6", "7", "8", "9"]
        );
    }

    #[test]
    fn serialized_page() {
        let items = (0..13).collect::<Vec<_>>();
        assert_json_eq!(
            serde_json::to_value(page_of(&items, 10, Some(2))).unwrap(),
            json!({
                "object_list": [10, 11, 12],
                "number": 2,
                "num_pages": 2,
                "count": 13,
                "per_page": 10,
                "has_next": false,
                "has_previous": true,
                "start_index": 11,
                "end_index": 13,
            })
        );
    }
}
