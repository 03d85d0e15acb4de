//! Разбор зарплаты из свободного текста с пересчетом в рубли

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ColumnData, SalaryConfig, SalaryStats, Table};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub marker: String,
    pub rate: f64,
}

/// Упорядоченная таблица валютных маркеров.
///
/// Побеждает первый маркер, найденный как подстрока, поэтому более длинный
/// маркер должен идти раньше своего префикса ("руб." до "руб").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyTable {
    rates: Vec<CurrencyRate>,
}

impl CurrencyTable {
    pub fn new(rates: Vec<CurrencyRate>) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &[CurrencyRate] {
        &self.rates
    }

    /// Курс первого маркера, входящего в `text`
    pub fn find_rate(&self, text: &str) -> Option<f64> {
        self.rates
            .iter()
            .find(|r| text.contains(r.marker.as_str()))
            .map(|r| r.rate)
    }
}

impl Default for CurrencyTable {
    fn default() -> Self {
        let rates = [("руб.", 1.0), ("руб", 1.0), ("kzt", 0.151579), ("usd", 83.0)]
            .into_iter()
            .map(|(marker, rate)| CurrencyRate {
                marker: marker.to_string(),
                rate,
            })
            .collect();
        Self { rates }
    }
}

/// Сумма в рублях или `None`, если валюта не распознана или число не разбирается
pub fn parse_salary(text: &str, currencies: &CurrencyTable) -> Option<f64> {
    let compact: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let rate = currencies.find_rate(&compact)?;

    let numeric: String = compact
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    numeric.parse::<f64>().ok().map(|value| value * rate)
}

/// Добавляет столбец с зарплатой в рублях
pub fn normalize_salaries(table: &mut Table, config: &SalaryConfig) -> Result<SalaryStats> {
    let salaries: Vec<Option<f64>> = table
        .text(&config.column)?
        .iter()
        .map(|cell| {
            cell.as_deref()
                .and_then(|text| parse_salary(text, &config.currencies))
        })
        .collect();

    let parsed = salaries.iter().filter(|s| s.is_some()).count();
    let stats = SalaryStats {
        parsed,
        unparsed: salaries.len() - parsed,
    };

    tracing::debug!("Salary parsed for {} rows, {} left undefined", stats.parsed, stats.unparsed);

    table.push_column(config.output_column.clone(), ColumnData::Numeric(salaries))?;
    Ok(stats)
}
