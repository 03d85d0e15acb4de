//! Конвейер: загрузка -> зарплата -> выбросы -> признаки

use std::path::{Path, PathBuf};

use crate::error::{PrepError, Result};
use crate::export::{write_arrays, ExportSummary};
use crate::preprocessing::{filter_outliers, load_table, normalize_salaries, FeatureEngineer};
use crate::types::{FeatureSet, PipelineReport, PrepConfig, Table};

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub feature_set: FeatureSet,
    pub report: PipelineReport,
}

pub struct Pipeline {
    config: PrepConfig,
}

impl Pipeline {
    pub fn new(config: PrepConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PrepConfig {
        &self.config
    }

    /// Абсолютный путь к входному файлу; ошибка `NotFound`, если файла нет
    pub fn resolve_input(path: &Path) -> Result<PathBuf> {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        match std::fs::canonicalize(&absolute) {
            Ok(resolved) if resolved.is_file() => Ok(resolved),
            _ => Err(PrepError::NotFound { path: absolute }),
        }
    }

    /// Загрузка файла и все этапы обработки в памяти
    pub fn run(&self, path: &Path) -> Result<PipelineOutput> {
        let path = Self::resolve_input(path)?;

        tracing::info!("1. Loading CSV: {}", path.display());
        let table = load_table(&path, &self.config.loader)?;

        self.process(table)
    }

    /// Этапы 2-4 над уже загруженной таблицей
    pub fn process(&self, mut table: Table) -> Result<PipelineOutput> {
        let loaded_rows = table.n_rows();

        tracing::info!("2. Parsing salaries ({} rows)...", loaded_rows);
        let salary = normalize_salaries(&mut table, &self.config.salary)?;

        tracing::info!("3. Removing outliers...");
        let (table, outliers) = filter_outliers(table, &self.config.outliers)?;

        tracing::info!("4. Extracting features ({} rows)...", table.n_rows());
        let extracted = FeatureEngineer::extract_features(&table, &self.config.features)?;

        let report = PipelineReport {
            loaded_rows,
            salary,
            outliers,
            imputed_targets: extracted.imputed_targets,
            target_median: extracted.target_median,
            constant_features: extracted.constant_features,
            samples: extracted.feature_set.n_samples(),
        };

        Ok(PipelineOutput {
            feature_set: extracted.feature_set,
            report,
        })
    }

    /// Полный прогон с записью `.npy` рядом со входным файлом
    pub fn run_and_save(&self, path: &Path) -> Result<(PipelineOutput, ExportSummary)> {
        let resolved = Self::resolve_input(path)?;
        let output = self.run(&resolved)?;

        let dir = resolved.parent().unwrap_or_else(|| Path::new("."));
        let summary = write_arrays(&output.feature_set, dir, &self.config.export)?;

        Ok((output, summary))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PrepConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::normalize_table;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn sample_table() -> Table {
        let headers = row(&["", "ЗП", "Пол, возраст", "Образование и ВУЗ"]);
        let rows = vec![
            row(&["0", "100 000 руб.", "Мужчина , 29 лет", "Высшее образование"]),
            row(&["1", "2 000 USD", "Женщина , 31 год", "Среднее"]),
            row(&["2", "по договорённости", "Мужчина", "Высшее"]),
            row(&["3", "120 000 руб.", "Женщина , 45 лет", ""]),
            row(&["4", "90000 руб", "Мужчина , 38 лет", "Высшее"]),
            row(&["5", "900 000 000 руб.", "Мужчина , 50 лет", "Высшее"]),
        ];
        normalize_table(headers, rows, &PrepConfig::default().loader).unwrap()
    }

    #[test]
    fn process_keeps_arrays_aligned() {
        let output = Pipeline::default().process(sample_table()).unwrap();
        let fs = &output.feature_set;

        assert_eq!(output.report.loaded_rows, 6);
        assert_eq!(fs.features.nrows(), fs.targets.len());
        assert_eq!(fs.targets.len(), output.report.outliers.kept);
        assert_eq!(output.report.samples, fs.targets.len());
        assert_eq!(output.report.salary.unparsed, 1);
    }

    #[test]
    fn extreme_salary_is_removed() {
        let output = Pipeline::default().process(sample_table()).unwrap();
        assert!(output.report.outliers.removed >= 1);
        assert!(output.feature_set.targets.iter().all(|&t| t < 1.0e9));
    }

    #[test]
    fn process_is_deterministic() {
        let pipeline = Pipeline::default();
        let a = pipeline.process(sample_table()).unwrap();
        let b = pipeline.process(sample_table()).unwrap();
        assert_eq!(a.feature_set, b.feature_set);
    }

    #[test]
    fn missing_input_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");

        let err = Pipeline::default().run(&missing).unwrap_err();

        match err {
            PrepError::NotFound { path } => assert!(path.ends_with("nope.csv")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
