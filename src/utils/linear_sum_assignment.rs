use crate::Errors;
use anyhow::Result;
use pathfinding::kuhn_munkres::kuhn_munkres;
use pathfinding::matrix::Matrix;

/// Fixed point multiplier for the integer weights the Hungarian solver works with
const F32_I64_MULT: f32 = 1_000_000.0;

/// Solves the rectangular assignment problem over `costs`
///
/// Returns `(row, column)` pairs sorted by row; every row and column appears at most once
/// and exactly `min(rows, columns)` pairs are produced. With `maximize == false` the sum of
/// selected costs is minimal, otherwise it is maximal.
///
/// The matrix is padded to a square one with zeros (every perfect matching of the padded
/// matrix uses the same number of padding cells, so the optimum over real cells is kept),
/// scaled to `i64` fixed point and solved with the Kuhn-Munkres algorithm in `O(n^3)`.
/// Costs closer than `max(1, max|cost|) / 1e6` are treated as equal.
///
/// # Parameters
/// * `costs` - cost (or benefit when `maximize` is set) matrix, rows are matched to columns
/// * `maximize` - treat the matrix as benefit
///
pub fn linear_sum_assignment(costs: &Matrix<f32>, maximize: bool) -> Result<Vec<(usize, usize)>> {
    let (rows, columns) = (costs.rows, costs.columns);
    if rows == 0 || columns == 0 {
        return Ok(Vec::default());
    }

    let mut max_abs: f32 = 0.0;
    for r in 0..rows {
        for c in 0..columns {
            let v = costs[(r, c)];
            if !v.is_finite() {
                return Err(Errors::NonFiniteCost(r, c).into());
            }
            max_abs = max_abs.max(v.abs());
        }
    }
    let mult = F32_I64_MULT / max_abs.max(1.0);

    let size = rows.max(columns);
    let mut weights = Matrix::new(size, size, 0i64);
    for r in 0..rows {
        for c in 0..columns {
            let w = (costs[(r, c)] * mult).round() as i64;
            // kuhn_munkres maximizes
            weights[(r, c)] = if maximize { w } else { -w };
        }
    }

    let (_, solution) = kuhn_munkres(&weights);

    Ok(solution
        .into_iter()
        .enumerate()
        .filter(|(r, c)| *r < rows && *c < columns)
        .collect())
}
