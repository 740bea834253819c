//! Combinatorial helpers used by the enumerators.

/// Number of unordered pairs `(i, j)`, `i < j`, among `n` items.
///
/// Saturates at `u64::MAX`.
///
/// # Examples
///
/// ```
/// use choiceset::utils::pair_count;
///
/// assert_eq!(pair_count(32), 496);
/// assert_eq!(pair_count(18_496), 171_041_760);
/// assert_eq!(pair_count(1), 0);
/// ```
#[must_use]
pub fn pair_count(n: usize) -> u64 {
    let n = n as u64;
    if n < 2 {
        return 0;
    }
    // One of n, n - 1 is even, so halve it before multiplying
    let (a, b) = if n % 2 == 0 { (n / 2, n - 1) } else { (n, (n - 1) / 2) };
    a.checked_mul(b).unwrap_or(u64::MAX)
}

/// Generate every index tuple of a mixed-radix Cartesian product.
///
/// Tuples are produced in lexicographic order: the last position varies
/// fastest. A product with any zero radix is empty; an empty radix list
/// yields a single empty tuple.
///
/// # Examples
///
/// ```
/// use choiceset::utils::cartesian_product;
///
/// let tuples: Vec<Vec<usize>> = cartesian_product(&[2, 3]).collect();
/// assert_eq!(tuples.len(), 6);
/// assert_eq!(tuples[0], vec![0, 0]);
/// assert_eq!(tuples[1], vec![0, 1]);
/// assert_eq!(tuples[5], vec![1, 2]);
/// ```
pub fn cartesian_product(radices: &[usize]) -> impl Iterator<Item = Vec<usize>> {
    ProductIterator::new(radices.to_vec())
}

/// Odometer over a mixed-radix index space.
struct ProductIterator {
    radices: Vec<usize>,
    digits: Vec<usize>,
    finished: bool,
}

impl ProductIterator {
    fn new(radices: Vec<usize>) -> Self {
        let finished = radices.iter().any(|&r| r == 0);
        Self {
            digits: vec![0; radices.len()],
            radices,
            finished,
        }
    }

    fn remaining(&self) -> usize {
        if self.finished {
            return 0;
        }
        // Tuples left = total - rank of the current tuple.
        let mut rank = 0usize;
        let mut total = 1usize;
        for (&digit, &radix) in self.digits.iter().zip(&self.radices) {
            rank = rank.saturating_mul(radix).saturating_add(digit);
            total = total.saturating_mul(radix);
        }
        total - rank
    }
}

impl Iterator for ProductIterator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.digits.clone();

        // Advance the odometer from the rightmost position
        let mut pos = self.digits.len();
        loop {
            if pos == 0 {
                self.finished = true;
                break;
            }
            pos -= 1;
            self.digits[pos] += 1;
            if self.digits[pos] < self.radices[pos] {
                break;
            }
            self.digits[pos] = 0;
        }

        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_count() {
        assert_eq!(pair_count(0), 0);
        assert_eq!(pair_count(2), 1);
        assert_eq!(pair_count(5), 10);
        assert_eq!(pair_count(6_084), 18_504_486);
        for n in 0..50usize {
            let brute = (0..n).flat_map(|i| (i + 1..n).map(move |j| (i, j))).count();
            assert_eq!(pair_count(n), brute as u64);
        }
    }

    #[test]
    fn test_cartesian_product() {
        let t: Vec<_> = cartesian_product(&[2, 2, 3]).collect();
        assert_eq!(t.len(), 12);
        assert_eq!(t[0], vec![0, 0, 0]);
        assert_eq!(t[1], vec![0, 0, 1]);
        assert_eq!(t[2], vec![0, 0, 2]);
        assert_eq!(t[3], vec![0, 1, 0]);
        assert_eq!(t[11], vec![1, 1, 2]);

        let t: Vec<_> = cartesian_product(&[]).collect();
        assert_eq!(t, vec![Vec::<usize>::new()]);

        let t: Vec<_> = cartesian_product(&[3, 0, 2]).collect();
        assert!(t.is_empty());
    }

    #[test]
    fn test_cartesian_product_size_hint() {
        let mut it = cartesian_product(&[4, 3]);
        assert_eq!(it.size_hint(), (12, Some(12)));
        it.next();
        it.next();
        assert_eq!(it.size_hint(), (10, Some(10)));
        assert_eq!(it.count(), 10);
    }
}
