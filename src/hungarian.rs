use arrayvec::ArrayVec;

use crate::game::{Cost, MAX_SIZE, MAX_STONES, Weight};

pub trait Matrix<T> {
    fn get(&self, row: usize, col: usize) -> T;
    fn shape(&self) -> (usize, usize);
}

impl<T: Copy, const N: usize, const M: usize> Matrix<T> for [[T; M]; N] {
    fn get(&self, row: usize, col: usize) -> T {
        self[row][col]
    }

    fn shape(&self) -> (usize, usize) {
        (N, M)
    }
}

/// Row-major matrix backed by a fixed-capacity buffer.
pub struct ArrayMatrix<T, const CAP: usize> {
    data: ArrayVec<T, CAP>,
    rows: usize,
    cols: usize,
}

impl<T: Copy, const CAP: usize> ArrayMatrix<T, CAP> {
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows * cols <= CAP, "matrix {}x{} exceeds capacity", rows, cols);
        ArrayMatrix {
            data: ArrayVec::new(),
            rows,
            cols,
        }
    }

    pub fn push(&mut self, item: T) {
        debug_assert!(self.data.len() < self.rows * self.cols);
        self.data.push(item);
    }
}

impl<T: Copy, const CAP: usize> Matrix<T> for ArrayMatrix<T, CAP> {
    fn get(&self, row: usize, col: usize) -> T {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col]
    }

    fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

/// Largest entry a cost matrix may hold: the heaviest stone pushed across the
/// largest grid. Potentials stay far inside `i64` at this bound.
pub const MAX_ENTRY: Cost = Weight::MAX as Cost * (2 * MAX_SIZE) as Cost;

/// Minimum total cost of a perfect matching on a square cost matrix, where
/// entry `(i, j)` is the weighted push cost of stone `i` onto switch `j`.
///
/// Runs in O(n^3) and returns the same value as taking the minimum over every
/// permutation. The total is summed from the matched entries themselves, so
/// it is exact in `Cost`.
// Reference: Andrey Lopatin (https://cp-algorithms.com/graph/hungarian-algorithm.html).
pub fn hungarian_algorithm(a: &impl Matrix<Cost>) -> Cost {
    const INF: i64 = i64::MAX / 4;

    let (n, m) = a.shape();
    assert!(n == m);
    assert!(n <= MAX_STONES, "matrix size {} exceeds {}", n, MAX_STONES);
    let entry = |row: usize, col: usize| -> i64 {
        let cost = a.get(row - 1, col - 1);
        debug_assert!(cost <= MAX_ENTRY, "entry {} exceeds {}", cost, MAX_ENTRY);
        cost as i64
    };

    // 1-indexed; column 0 is a virtual column holding the row being inserted.
    let mut row_potential = new_buffer::<i64>(n, 0);
    let mut col_potential = new_buffer::<i64>(m, 0);
    let mut row_of = new_buffer::<usize>(m, 0);
    let mut prev_col = new_buffer::<usize>(m, 0);

    for row in 1..=n {
        row_of[0] = row;
        let mut col = 0;
        let mut slack = new_buffer::<i64>(m, INF);
        let mut visited = new_buffer::<bool>(m, false);

        // Grow an alternating tree until it reaches a free column.
        loop {
            visited[col] = true;
            let tree_row = row_of[col];
            let mut delta = INF;
            let mut next_col = 0;

            for j in 1..=m {
                if visited[j] {
                    continue;
                }
                let reduced = entry(tree_row, j) - row_potential[tree_row] - col_potential[j];
                if reduced < slack[j] {
                    slack[j] = reduced;
                    prev_col[j] = col;
                }
                if slack[j] < delta {
                    delta = slack[j];
                    next_col = j;
                }
            }

            for j in 0..=m {
                if visited[j] {
                    row_potential[row_of[j]] += delta;
                    col_potential[j] -= delta;
                } else {
                    slack[j] -= delta;
                }
            }

            col = next_col;
            if row_of[col] == 0 {
                break;
            }
        }

        // Flip the augmenting path back to the virtual column.
        while col != 0 {
            let prev = prev_col[col];
            row_of[col] = row_of[prev];
            col = prev;
        }
    }

    (1..=m).map(|col| a.get(row_of[col] - 1, col - 1)).sum()
}

fn new_buffer<T: Copy>(n: usize, initial_value: T) -> ArrayVec<T, { MAX_STONES + 1 }> {
    (0..=n).map(|_| initial_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(a: &impl Matrix<Cost>) -> Cost {
        fn permute(a: &impl Matrix<Cost>, row: usize, used: &mut Vec<bool>, acc: Cost) -> Cost {
            let (n, _) = a.shape();
            if row == n {
                return acc;
            }
            let mut best = Cost::MAX;
            for col in 0..n {
                if !used[col] {
                    used[col] = true;
                    best = best.min(permute(a, row + 1, used, acc + a.get(row, col)));
                    used[col] = false;
                }
            }
            best
        }
        let (n, _) = a.shape();
        permute(a, 0, &mut vec![false; n], 0)
    }

    #[test]
    fn test_hungarian_algorithm() {
        let a = [[8, 4, 7], [5, 2, 3], [9, 4, 8]];
        let cost = hungarian_algorithm(&a);
        assert_eq!(cost, 15);
    }

    #[test]
    fn test_empty_matrix() {
        let a: [[Cost; 0]; 0] = [];
        assert_eq!(hungarian_algorithm(&a), 0);
    }

    #[test]
    fn test_large_weights() {
        let a = [[400, 1], [200, 4]];
        // 1 + 200 beats 400 + 4
        assert_eq!(hungarian_algorithm(&a), 201);
    }

    #[test]
    fn test_heaviest_entries() {
        // A full-weight stone across the largest grid on every entry.
        let a = [[MAX_ENTRY, MAX_ENTRY - 1], [MAX_ENTRY - 1, MAX_ENTRY]];
        assert_eq!(hungarian_algorithm(&a), 2 * (MAX_ENTRY - 1));

        let mut matrix: ArrayMatrix<Cost, { MAX_STONES * MAX_STONES }> =
            ArrayMatrix::new(MAX_STONES, MAX_STONES);
        for row in 0..MAX_STONES {
            for col in 0..MAX_STONES {
                matrix.push(if row == col { 0 } else { MAX_ENTRY });
            }
        }
        assert_eq!(hungarian_algorithm(&matrix), 0);
    }

    #[test]
    fn test_matches_brute_force() {
        let rows: [[Cost; 5]; 5] = [
            [12, 7, 9, 7, 9],
            [8, 9, 6, 6, 6],
            [7, 17, 12, 14, 9],
            [15, 14, 6, 6, 10],
            [4, 10, 7, 10, 9],
        ];
        assert_eq!(hungarian_algorithm(&rows), brute_force(&rows));

        let mut matrix: ArrayMatrix<Cost, 16> = ArrayMatrix::new(4, 4);
        for value in [
            300, 2, 90, 41, 5, 600, 8, 13, 77, 21, 1, 1000, 64, 3, 29, 500,
        ] {
            matrix.push(value);
        }
        assert_eq!(hungarian_algorithm(&matrix), brute_force(&matrix));
    }
}
