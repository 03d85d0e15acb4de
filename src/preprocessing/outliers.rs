//! Отсечение выбросов зарплаты по межквартильному размаху

use crate::error::Result;
use crate::types::{IqrBounds, OutlierConfig, OutlierReport, Table};

/// Квантиль отсортированной выборки с линейной интерполяцией между
/// ближайшими рангами (позиция `q * (n - 1)`).
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Границы `[Q1 - k*IQR, Q3 + k*IQR]` для выборки
pub fn iqr_bounds(values: &[f64], multiplier: f64) -> Option<IqrBounds> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile(&sorted, 0.25)?;
    let q3 = quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;

    Some(IqrBounds {
        q1,
        q3,
        iqr,
        lower: q1 - multiplier * iqr,
        upper: q3 + multiplier * iqr,
    })
}

/// Убирает строки с зарплатой вне IQR-диапазона (границы включительно).
///
/// Неопределенная зарплата считается нулем и при расчете квартилей, и при
/// проверке границ. Это известная особенность: такие строки участвуют в
/// статистике и обычно сдвигают Q1 вниз, а сами остаются, если ноль попал в диапазон.
pub fn filter_outliers(table: Table, config: &OutlierConfig) -> Result<(Table, OutlierReport)> {
    let values: Vec<f64> = table
        .numeric(&config.column)?
        .iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();

    let Some(bounds) = iqr_bounds(&values, config.iqr_multiplier) else {
        let report = OutlierReport {
            bounds: None,
            kept: 0,
            removed: 0,
        };
        return Ok((table, report));
    };

    let mask: Vec<bool> = values.iter().map(|&v| bounds.contains(v)).collect();
    let kept = mask.iter().filter(|&&m| m).count();
    let removed = mask.len() - kept;

    tracing::debug!(
        "IQR bounds [{:.2}, {:.2}] (q1={:.2}, q3={:.2}): kept {}, removed {}",
        bounds.lower,
        bounds.upper,
        bounds.q1,
        bounds.q3,
        kept,
        removed
    );

    let filtered = table.retain_rows(&mask)?;
    let report = OutlierReport {
        bounds: Some(bounds),
        kept,
        removed,
    };

    Ok((filtered, report))
}
