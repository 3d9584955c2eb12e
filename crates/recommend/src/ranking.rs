//! Deterministic descending ranking
//!
//! Every ranked list in the pipeline goes through [`top_n`] so equal scores
//! always come out in the same order, whatever order they went in.

use std::cmp::Ordering;

/// Sort `items` by descending `key`, breaking ties by ascending `tie_break`
///
/// Keys are compared with [`f32::total_cmp`], so NaN cannot make the order
/// depend on the input permutation. Stable, `O(n log n)`.
pub fn sort_descending<T, F, B, K>(items: &mut [T], key: F, tie_break: B)
where
    F: Fn(&T) -> f32,
    B: Fn(&T) -> K,
    K: Ord,
{
    items.sort_by(|a, b| compare_descending(a, b, &key, &tie_break));
}

/// The `n` best items by descending `key`, ties by ascending `tie_break`
///
/// # Examples
///
/// ```
/// use learnhub_recommend::ranking::top_n;
///
/// let ranked = top_n(vec![(3, 0.5), (1, 0.9), (2, 0.5)], |x| x.1, 2, |x| x.0);
/// assert_eq!(ranked, vec![(1, 0.9), (2, 0.5)]);
/// ```
pub fn top_n<T, F, B, K>(mut items: Vec<T>, key: F, n: usize, tie_break: B) -> Vec<T>
where
    F: Fn(&T) -> f32,
    B: Fn(&T) -> K,
    K: Ord,
{
    sort_descending(&mut items, key, tie_break);
    items.truncate(n);
    items
}

fn compare_descending<T, F, B, K>(a: &T, b: &T, key: &F, tie_break: &B) -> Ordering
where
    F: Fn(&T) -> f32,
    B: Fn(&T) -> K,
    K: Ord,
{
    key(b)
        .total_cmp(&key(a))
        .then_with(|| tie_break(a).cmp(&tie_break(b)))
}
