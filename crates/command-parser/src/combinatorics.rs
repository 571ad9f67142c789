//! Non-mutating Cartesian products.
//!
//! The first list varies slowest, so the first row of a product is built
//! from every list's first element.

/// Every way of picking one element from each list.
pub fn product<T: Clone>(lists: &[Vec<T>]) -> Vec<Vec<T>> {
    lists.iter().fold(vec![Vec::new()], |acc, list| {
        let mut next = Vec::with_capacity(acc.len() * list.len());
        for prefix in &acc {
            for item in list {
                let mut row = Vec::with_capacity(prefix.len() + 1);
                row.extend_from_slice(prefix);
                row.push(item.clone());
                next.push(row);
            }
        }
        next
    })
}

/// Like [`product`], but each pick is itself a run of elements and the
/// picks are concatenated.
pub fn product_concat<T: Clone>(lists: &[Vec<Vec<T>>]) -> Vec<Vec<T>> {
    lists.iter().fold(vec![Vec::new()], |acc, list| {
        let mut next = Vec::with_capacity(acc.len() * list.len());
        for prefix in &acc {
            for run in list {
                let mut row = Vec::with_capacity(prefix.len() + run.len());
                row.extend_from_slice(prefix);
                row.extend_from_slice(run);
                next.push(row);
            }
        }
        next
    })
}
