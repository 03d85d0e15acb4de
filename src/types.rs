/// Типы данных конвейера: таблица, конфигурация, результаты

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};
use crate::preprocessing::salary::CurrencyTable;

/// Текстовая ячейка: `None` = пропуск (пустое поле или NA-токен)
pub type Cell = Option<String>;

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<Cell>),
    Numeric(Vec<Option<f64>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.len(),
            ColumnData::Numeric(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn retain(self, mask: &[bool]) -> Self {
        fn keep<T>(values: Vec<T>, mask: &[bool]) -> Vec<T> {
            values
                .into_iter()
                .zip(mask)
                .filter_map(|(v, &m)| m.then_some(v))
                .collect()
        }

        match self {
            ColumnData::Text(v) => ColumnData::Text(keep(v, mask)),
            ColumnData::Numeric(v) => ColumnData::Numeric(keep(v, mask)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// Таблица с именованными столбцами одинаковой длины.
///
/// Порядок строк значим: этапы конвейера только добавляют столбцы или
/// отбрасывают строки, сохраняя относительный порядок оставшихся.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    pub fn new(n_rows: usize) -> Self {
        Self {
            columns: Vec::new(),
            n_rows,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Добавляет новый столбец; имя должно быть уникальным
    pub fn add_column(&mut self, name: impl Into<String>, data: ColumnData) -> Result<()> {
        self.check_len(&data)?;

        let name = name.into();
        if self.column(&name).is_some() {
            return Err(PrepError::DuplicateColumn(name));
        }
        self.columns.push(Column { name, data });
        Ok(())
    }

    /// Записывает производный столбец; столбец с тем же именем заменяется на месте
    pub fn push_column(&mut self, name: impl Into<String>, data: ColumnData) -> Result<()> {
        self.check_len(&data)?;

        let name = name.into();
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.data = data,
            None => self.columns.push(Column { name, data }),
        }
        Ok(())
    }

    fn check_len(&self, data: &ColumnData) -> Result<()> {
        if data.len() != self.n_rows {
            return Err(PrepError::ShapeMismatch {
                what: "column length",
                expected: self.n_rows,
                actual: data.len(),
            });
        }
        Ok(())
    }

    pub fn text(&self, name: &str) -> Result<&[Cell]> {
        match self.column(name).map(|c| &c.data) {
            Some(ColumnData::Text(v)) => Ok(v),
            _ => Err(PrepError::MissingColumn(name.to_string())),
        }
    }

    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>]> {
        match self.column(name).map(|c| &c.data) {
            Some(ColumnData::Numeric(v)) => Ok(v),
            _ => Err(PrepError::MissingColumn(name.to_string())),
        }
    }

    /// Оставляет строки, для которых `mask[i] == true`; индексы снова плотные с нуля
    pub fn retain_rows(self, mask: &[bool]) -> Result<Table> {
        if mask.len() != self.n_rows {
            return Err(PrepError::ShapeMismatch {
                what: "row mask",
                expected: self.n_rows,
                actual: mask.len(),
            });
        }

        let n_rows = mask.iter().filter(|&&m| m).count();
        let columns = self
            .columns
            .into_iter()
            .map(|c| Column {
                name: c.name,
                data: c.data.retain(mask),
            })
            .collect();

        Ok(Table { columns, n_rows })
    }
}

/// Итоговые массивы: признаки (sex, age, education) и целевая переменная
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub features: Array2<f32>,
    pub targets: Array1<f32>,
}

impl FeatureSet {
    pub fn n_samples(&self) -> usize {
        self.targets.len()
    }
}

/// Порядок столбцов матрицы признаков
pub const FEATURE_NAMES: [&str; 3] = ["sex", "age", "education"];

// ---------------------------------------------------------------------------
// Конфигурация
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrepConfig {
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub salary: SalaryConfig,
    #[serde(default)]
    pub outliers: OutlierConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_index_column")]
    pub index_column: String,
    #[serde(default = "default_na_values")]
    pub na_values: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            index_column: default_index_column(),
            na_values: default_na_values(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryConfig {
    #[serde(default = "default_compensation_column")]
    pub column: String,
    #[serde(default = "default_salary_column")]
    pub output_column: String,
    #[serde(default)]
    pub currencies: CurrencyTable,
}

impl Default for SalaryConfig {
    fn default() -> Self {
        Self {
            column: default_compensation_column(),
            output_column: default_salary_column(),
            currencies: CurrencyTable::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierConfig {
    #[serde(default = "default_salary_column")]
    pub column: String,
    #[serde(default = "default_iqr_multiplier")]
    pub iqr_multiplier: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            column: default_salary_column(),
            iqr_multiplier: default_iqr_multiplier(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    #[serde(default = "default_sex_age_column")]
    pub sex_age_column: String,
    #[serde(default = "default_education_column")]
    pub education_column: String,
    #[serde(default = "default_salary_column")]
    pub salary_column: String,
    #[serde(default = "default_age")]
    pub default_age: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            sex_age_column: default_sex_age_column(),
            education_column: default_education_column(),
            salary_column: default_salary_column(),
            default_age: default_age(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_features_file")]
    pub features_file: String,
    #[serde(default = "default_targets_file")]
    pub targets_file: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            features_file: default_features_file(),
            targets_file: default_targets_file(),
        }
    }
}

fn default_index_column() -> String { "Unnamed: 0".to_string() }
fn default_na_values() -> Vec<String> {
    ["NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A", "<NA>"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_compensation_column() -> String { "ЗП".to_string() }
fn default_salary_column() -> String { "salary_rub".to_string() }
fn default_iqr_multiplier() -> f64 { 1.5 }
fn default_sex_age_column() -> String { "Пол, возраст".to_string() }
fn default_education_column() -> String { "Образование и ВУЗ".to_string() }
fn default_age() -> f64 { 30.0 }
fn default_features_file() -> String { "x_data.npy".to_string() }
fn default_targets_file() -> String { "y_data.npy".to_string() }

// ---------------------------------------------------------------------------
// Отчеты этапов
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryStats {
    pub parsed: usize,
    pub unparsed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub bounds: Option<IqrBounds>,
    pub kept: usize,
    pub removed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub loaded_rows: usize,
    pub salary: SalaryStats,
    pub outliers: OutlierReport,
    pub imputed_targets: usize,
    pub target_median: f64,
    pub constant_features: Vec<String>,
    pub samples: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: PrepConfig =
            serde_json::from_str(r#"{ "outliers": { "iqr_multiplier": 3.0 } }"#).unwrap();

        assert_eq!(config.outliers.iqr_multiplier, 3.0);
        assert_eq!(config.outliers.column, "salary_rub");
        assert_eq!(config.salary.column, "ЗП");
        assert_eq!(config.salary.currencies, CurrencyTable::default());
        assert_eq!(config.features.default_age, 30.0);
        assert_eq!(config.export.features_file, "x_data.npy");
        assert_eq!(config.loader.index_column, "Unnamed: 0");
    }

    #[test]
    fn currency_table_serializes_as_ordered_list() {
        let json = serde_json::to_value(CurrencyTable::default()).unwrap();
        let markers: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["marker"].as_str().unwrap())
            .collect();
        assert_eq!(markers, vec!["руб.", "руб", "kzt", "usd"]);
    }

    #[test]
    fn push_column_checks_length_and_replaces() {
        let mut table = Table::new(2);
        table
            .push_column("a", ColumnData::Numeric(vec![Some(1.0), None]))
            .unwrap();
        table
            .push_column("a", ColumnData::Numeric(vec![Some(2.0), Some(3.0)]))
            .unwrap();

        assert_eq!(table.n_cols(), 1);
        assert_eq!(table.numeric("a").unwrap(), &[Some(2.0), Some(3.0)]);

        let err = table
            .push_column("b", ColumnData::Numeric(vec![Some(1.0)]))
            .unwrap_err();
        assert!(matches!(err, PrepError::ShapeMismatch { .. }));
    }

    #[test]
    fn add_column_rejects_duplicate_names() {
        let mut table = Table::new(1);
        table.add_column("ЗП", ColumnData::Text(vec![None])).unwrap();

        let err = table
            .add_column("ЗП", ColumnData::Text(vec![Some("1".to_string())]))
            .unwrap_err();

        assert!(matches!(err, PrepError::DuplicateColumn(ref c) if c == "ЗП"));
        assert_eq!(table.text("ЗП").unwrap(), &[None]);
    }

    #[test]
    fn retain_rows_preserves_order() {
        let mut table = Table::new(4);
        table
            .push_column(
                "t",
                ColumnData::Text(["a", "b", "c", "d"].iter().map(|s| Some(s.to_string())).collect()),
            )
            .unwrap();

        let table = table.retain_rows(&[true, false, true, true]).unwrap();

        assert_eq!(table.n_rows(), 3);
        let kept: Vec<_> = table.text("t").unwrap().iter().flatten().cloned().collect();
        assert_eq!(kept, vec!["a", "c", "d"]);
    }

    #[test]
    fn wrong_column_kind_is_missing() {
        let mut table = Table::new(1);
        table
            .push_column("t", ColumnData::Text(vec![None]))
            .unwrap();
        assert!(matches!(table.numeric("t"), Err(PrepError::MissingColumn(_))));
    }
}
