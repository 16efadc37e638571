//! 공통 통계 계산.
//!
//! 예측기, 리스크 게이트, 포트폴리오 평가가 공유하는 f64 통계 함수입니다.
//! 모든 함수는 0으로 나누기를 방어하며 NaN/무한대를 반환하지 않습니다.

/// 산술 평균. 빈 입력은 0.0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 모집단 표준편차. 빈 입력은 0.0.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// 최근 `window`개 값의 상대 변동성 (표준편차 / 평균).
///
/// 평균이 0이거나 데이터가 없으면 0.0을 반환합니다.
pub fn relative_volatility(values: &[f64], window: usize) -> f64 {
    let start = values.len().saturating_sub(window);
    let recent = &values[start..];
    let avg = mean(recent);
    if recent.is_empty() || avg == 0.0 {
        return 0.0;
    }
    let vol = std_dev(recent) / avg.abs();
    if vol.is_finite() {
        vol
    } else {
        0.0
    }
}

/// 가격 시계열을 단순 수익률로 변환.
///
/// 직전 가격이 0인 구간의 수익률은 0으로 처리합니다.
pub fn prices_to_returns(prices: &[f64]) -> Vec<f64> {
    if prices.len() < 2 {
        return Vec::new();
    }

    prices
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { (w[1] - w[0]) / w[0] })
        .collect()
}

/// Pearson 상관계수.
///
/// 길이가 다르면 최근 구간끼리 정렬해서 비교합니다.
/// 데이터가 2개 미만이거나 한쪽 변동이 없으면 None.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let len = x.len().min(y.len());
    if len < 2 {
        return None;
    }
    let x = &x[x.len() - len..];
    let y = &y[y.len() - len..];

    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// 선형 보간 분위수 (q: 0.0 ~ 1.0). 빈 입력은 None.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}
