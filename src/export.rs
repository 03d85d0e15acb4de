//! Сохранение массивов в формате .npy

use std::path::{Path, PathBuf};

use ndarray_npy::write_npy;
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};
use crate::types::{ExportConfig, FeatureSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrittenArray {
    pub path: PathBuf,
    pub bytes: u64,
}

impl WrittenArray {
    pub fn megabytes(&self) -> f64 {
        self.bytes as f64 / 1024.0 / 1024.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub features: WrittenArray,
    pub targets: WrittenArray,
}

/// Пишет матрицу признаков и вектор целей в `dir` (`<f4`, форма сохраняется)
pub fn write_arrays(feature_set: &FeatureSet, dir: &Path, config: &ExportConfig) -> Result<ExportSummary> {
    let x_path = dir.join(&config.features_file);
    let y_path = dir.join(&config.targets_file);

    write_npy(&x_path, &feature_set.features).map_err(|source| PrepError::Npy {
        path: x_path.clone(),
        source,
    })?;
    write_npy(&y_path, &feature_set.targets).map_err(|source| PrepError::Npy {
        path: y_path.clone(),
        source,
    })?;

    Ok(ExportSummary {
        features: written(x_path)?,
        targets: written(y_path)?,
    })
}

fn written(path: PathBuf) -> Result<WrittenArray> {
    let bytes = std::fs::metadata(&path)
        .map_err(|source| PrepError::Io {
            path: path.clone(),
            source,
        })?
        .len();
    Ok(WrittenArray { path, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};
    use ndarray_npy::read_npy;

    #[test]
    fn writes_f32_arrays_with_shape() {
        let dir = tempfile::tempdir().unwrap();
        let feature_set = FeatureSet {
            features: array![[1.0f32, -0.5, 0.0], [0.25, 2.0, -1.0]],
            targets: array![100.0f32, 200.0],
        };

        let summary = write_arrays(&feature_set, dir.path(), &ExportConfig::default()).unwrap();

        assert_eq!(summary.features.path, dir.path().join("x_data.npy"));
        assert!(summary.features.bytes > 0);
        assert!(summary.targets.bytes > 0);

        let x: Array2<f32> = read_npy(&summary.features.path).unwrap();
        let y: Array1<f32> = read_npy(&summary.targets.path).unwrap();
        assert_eq!(x, feature_set.features);
        assert_eq!(y, feature_set.targets);
    }
}
