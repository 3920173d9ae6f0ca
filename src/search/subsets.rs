/// Visits every `K`-element subset of `0..n` in lexicographic order.
///
/// One index buffer is reused for the whole walk; the callback sees it by
/// reference and must copy out what it keeps.
pub fn for_each_k_subset<const K: usize>(n: usize, mut visit: impl FnMut(&[usize; K])) {
    if K > n {
        return;
    }
    let mut idx: [usize; K] = std::array::from_fn(|i| i);
    loop {
        visit(&idx);

        // Rightmost position that has not reached its final value.
        let mut i = K;
        while i > 0 && idx[i - 1] == n - K + i - 1 {
            i -= 1;
        }
        if i == 0 {
            return;
        }
        idx[i - 1] += 1;
        for j in i..K {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

/// `n choose k`, saturating at `u64::MAX`.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k) as u64;
    let n = n as u64;
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * (n - i) as u128 / (i + 1) as u128;
        if acc > u64::MAX as u128 {
            return u64::MAX;
        }
    }
    acc as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visits_every_subset_once() {
        let mut seen = Vec::new();
        for_each_k_subset::<3>(5, |s| seen.push(*s));
        assert_eq!(seen.len() as u64, binomial(5, 3));
        assert_eq!(seen.first(), Some(&[0, 1, 2]));
        assert_eq!(seen.last(), Some(&[2, 3, 4]));
        assert!(seen.iter().all(|s| s[0] < s[1] && s[1] < s[2]));

        let mut dedup = seen.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), seen.len());
    }

    #[test]
    fn test_exact_fit_and_too_small() {
        let mut count = 0;
        for_each_k_subset::<5>(5, |s| {
            assert_eq!(s, &[0, 1, 2, 3, 4]);
            count += 1;
        });
        assert_eq!(count, 1);

        for_each_k_subset::<5>(4, |_| panic!("no subset of 4 has 5 members"));
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(30, 5), 142_506);
        assert_eq!(binomial(10, 0), 1);
        assert_eq!(binomial(3, 5), 0);
        assert_eq!(binomial(10_000, 5000), u64::MAX);
    }
}
