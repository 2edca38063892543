use std::collections::HashMap;
use std::hash::Hash;

/// Full outer join of two row sets on a derived key.
///
/// Every left row is emitted in input order, paired with each right row
/// sharing its key (so `m` left and `n` right rows with one key yield `m × n`
/// pairs), or with `None` when nothing matches. Right rows whose key never
/// appears on the left follow, also in input order. Rows are not deduplicated.
pub fn full_outer_join<L, R, K, FL, FR>(
    left: &[L],
    right: &[R],
    left_key: FL,
    right_key: FR,
) -> Vec<(Option<L>, Option<R>)>
where
    L: Copy,
    R: Copy,
    K: Eq + Hash,
    FL: Fn(&L) -> K,
    FR: Fn(&R) -> K,
{
    let mut right_index: HashMap<K, Vec<usize>> = HashMap::new();
    for (idx, row) in right.iter().enumerate() {
        right_index.entry(right_key(row)).or_default().push(idx);
    }

    let mut right_matched = vec![false; right.len()];
    let mut joined = Vec::with_capacity(left.len().max(right.len()));

    for row in left {
        match right_index.get(&left_key(row)) {
            Some(indices) => {
                for &idx in indices {
                    right_matched[idx] = true;
                    joined.push((Some(*row), Some(right[idx])));
                }
            }
            None => joined.push((Some(*row), None)),
        }
    }

    for (idx, row) in right.iter().enumerate() {
        if !right_matched[idx] {
            joined.push((None, Some(*row)));
        }
    }

    joined
}
