//! 회귀 엔진.
//!
//! `RegressionModel`은 적합된 모델이 제공하는 예측값과 결정계수(R²)의 계약입니다.
//! 결정계수는 총 변동이 0이면 0으로 정의합니다.

/// 적합된 회귀 모델.
pub trait RegressionModel {
    /// x에서의 예측값.
    fn predict(&self, x: f64) -> f64;

    /// 적합 데이터에 대한 결정계수. 음수가 될 수 있습니다.
    fn r_squared(&self) -> f64;
}

/// 결정계수 계산. 총 제곱합이 0이면 0.
fn coefficient_of_determination<M: RegressionModel + ?Sized>(
    model: &M,
    xs: &[f64],
    ys: &[f64],
) -> f64 {
    let n = ys.len() as f64;
    let mean_y = ys.iter().sum::<f64>() / n;

    let ss_tot: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = xs
        .iter()
        .zip(ys)
        .map(|(&x, y)| (y - model.predict(x)).powi(2))
        .sum();

    let r2 = 1.0 - ss_res / ss_tot;
    if r2.is_finite() {
        r2
    } else {
        0.0
    }
}

/// 최소자승 선형 회귀 (y = slope × x + intercept).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRegression {
    pub slope: f64,
    pub intercept: f64,
    r_squared: f64,
}

impl LinearRegression {
    /// 적합. 점이 2개 미만이거나 x 분산이 0이면 None.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let n = xs.len().min(ys.len());
        if n < 2 {
            return None;
        }
        let (xs, ys) = (&xs[..n], &ys[..n]);

        let mean_x = xs.iter().sum::<f64>() / n as f64;
        let mean_y = ys.iter().sum::<f64>() / n as f64;

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (x, y) in xs.iter().zip(ys) {
            sxy += (x - mean_x) * (y - mean_y);
            sxx += (x - mean_x).powi(2);
        }
        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        let mut model = Self {
            slope,
            intercept: mean_y - slope * mean_x,
            r_squared: 0.0,
        };
        model.r_squared = coefficient_of_determination(&model, xs, ys);
        Some(model)
    }
}

impl RegressionModel for LinearRegression {
    fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    fn r_squared(&self) -> f64 {
        self.r_squared
    }
}

/// 다항 회귀. 정규방정식을 가우스 소거법으로 풉니다.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialRegression {
    /// 계수 (낮은 차수부터: c0 + c1·x + c2·x² ...)
    pub coefficients: Vec<f64>,
    r_squared: f64,
}

impl PolynomialRegression {
    /// 적합. 점이 degree + 1개 미만이거나 정규방정식이 특이하면 None.
    pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> Option<Self> {
        let n = xs.len().min(ys.len());
        if n < degree + 1 {
            return None;
        }
        let (xs, ys) = (&xs[..n], &ys[..n]);
        let size = degree + 1;

        // 정규방정식 (XᵀX) c = Xᵀy 의 첨가 행렬
        let mut power_sums = vec![0.0; 2 * degree + 1];
        let mut rhs = vec![0.0; size];
        for (&x, &y) in xs.iter().zip(ys) {
            let mut xp = 1.0;
            for (k, sum) in power_sums.iter_mut().enumerate() {
                *sum += xp;
                if k < size {
                    rhs[k] += xp * y;
                }
                xp *= x;
            }
        }

        let mut matrix: Vec<Vec<f64>> = (0..size)
            .map(|row| {
                let mut r: Vec<f64> = (0..size).map(|col| power_sums[row + col]).collect();
                r.push(rhs[row]);
                r
            })
            .collect();

        let coefficients = solve_gaussian(&mut matrix)?;
        let mut model = Self {
            coefficients,
            r_squared: 0.0,
        };
        model.r_squared = coefficient_of_determination(&model, xs, ys);
        Some(model)
    }

    /// 차수.
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }
}

impl RegressionModel for PolynomialRegression {
    fn predict(&self, x: f64) -> f64 {
        // Horner
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }

    fn r_squared(&self) -> f64 {
        self.r_squared
    }
}

/// 부분 피벗 가우스 소거. 특이 행렬이면 None.
fn solve_gaussian(matrix: &mut [Vec<f64>]) -> Option<Vec<f64>> {
    let size = matrix.len();

    for col in 0..size {
        let pivot_row = (col..size).max_by(|&a, &b| {
            matrix[a][col].abs().total_cmp(&matrix[b][col].abs())
        })?;
        let scale = matrix
            .iter()
            .map(|row| row[col].abs())
            .fold(0.0_f64, f64::max)
            .max(1.0);
        if matrix[pivot_row][col].abs() <= scale * 1e-12 {
            return None;
        }
        matrix.swap(col, pivot_row);

        for row in (col + 1)..size {
            let factor = matrix[row][col] / matrix[col][col];
            for k in col..=size {
                matrix[row][k] -= factor * matrix[col][k];
            }
        }
    }

    let mut solution = vec![0.0; size];
    for row in (0..size).rev() {
        let tail: f64 = ((row + 1)..size)
            .map(|k| matrix[row][k] * solution[k])
            .sum();
        solution[row] = (matrix[row][size] - tail) / matrix[row][row];
    }

    solution.iter().all(|c| c.is_finite()).then_some(solution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_linear_perfect_fit() {
        let xs = indices(10);
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 5.0).collect();
        let model = LinearRegression::fit(&xs, &ys).unwrap();

        assert!((model.slope - 2.0).abs() < 1e-9);
        assert!((model.intercept - 5.0).abs() < 1e-9);
        assert!((model.predict(10.0) - 25.0).abs() < 1e-9);
        assert!((model.r_squared() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_flat_series_has_zero_r_squared() {
        let xs = indices(10);
        let model = LinearRegression::fit(&xs, &[7.0; 10]).unwrap();
        assert_eq!(model.r_squared(), 0.0);
        assert!((model.predict(10.0) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_degenerate_inputs() {
        assert!(LinearRegression::fit(&[1.0], &[1.0]).is_none());
        assert!(LinearRegression::fit(&[3.0, 3.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_polynomial_recovers_quadratic() {
        let xs = indices(12);
        let ys: Vec<f64> = xs.iter().map(|x| 0.5 * x * x - 3.0 * x + 100.0).collect();
        let model = PolynomialRegression::fit(&xs, &ys, 2).unwrap();

        assert_eq!(model.degree(), 2);
        assert!((model.coefficients[2] - 0.5).abs() < 1e-6);
        assert!((model.predict(12.0) - (72.0 - 36.0 + 100.0)).abs() < 1e-6);
        assert!((model.r_squared() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_polynomial_singular_system() {
        // 모든 x가 같으면 정규방정식이 특이
        assert!(PolynomialRegression::fit(&[2.0; 5], &[1.0, 2.0, 3.0, 4.0, 5.0], 2).is_none());
        assert!(PolynomialRegression::fit(&[1.0, 2.0], &[1.0, 2.0], 2).is_none());
    }
}
