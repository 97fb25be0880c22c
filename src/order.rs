use core::cmp::Ordering;

/// Key counts below this use insertion sort; at or above it, the standard unstable sort.
pub const SMALL_SORT_THRESHOLD: usize = 20;

/// Compare two dictionary keys by canonical bencode ordering (plain byte-wise lexicographic).
#[inline]
#[must_use]
pub fn cmp_key_bytes(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

/// Returns true iff every key strictly precedes the next.
#[must_use]
pub fn is_strictly_ascending<K: AsRef<[u8]>>(keys: &[K]) -> bool {
    keys.windows(2)
        .all(|w| cmp_key_bytes(w[0].as_ref(), w[1].as_ref()) == Ordering::Less)
}

/// Sort `items` in place by the byte key returned from `key`.
///
/// Small inputs take an insertion sort, larger ones `sort_unstable_by`. Both produce the same
/// total order; keys inside one dictionary are unique, so stability never shows in the output.
pub fn sort_keys<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> &[u8],
{
    if items.len() < SMALL_SORT_THRESHOLD {
        insertion_sort(items, &key);
    } else {
        items.sort_unstable_by(|a, b| cmp_key_bytes(key(a), key(b)));
    }
}

fn insertion_sort<T, F>(items: &mut [T], key: &F)
where
    F: Fn(&T) -> &[u8],
{
    // Right-to-left adjacent swaps; `j <= i < len` lets the compiler drop the bounds checks.
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && cmp_key_bytes(key(&items[j]), key(&items[j - 1])) == Ordering::Less {
            items.swap(j, j - 1);
            j -= 1;
        }
    }
}
