//! Стандартизация признаков

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};

use crate::error::{PrepError, Result};

/// Порог, ниже которого столбец считается постоянным
const MIN_STD: f64 = 1e-10;

/// Приведение столбцов к нулевому среднему и единичной дисперсии.
///
/// Используется популяционное стандартное отклонение (ddof = 0).
/// Постоянный столбец только центрируется: его std заменяется на 1.
pub struct DataNormalizer {
    mean: Option<Array1<f64>>,
    std: Option<Array1<f64>>,
    constant_columns: Vec<usize>,
}

impl DataNormalizer {
    pub fn new() -> Self {
        Self {
            mean: None,
            std: None,
            constant_columns: Vec::new(),
        }
    }

    pub fn fit(&mut self, X: &Array2<f64>) -> Result<()> {
        if X.nrows() == 0 {
            return Err(PrepError::EmptyDataset { stage: "normalization" });
        }

        let mean = X
            .mean_axis(Axis(0))
            .ok_or(PrepError::EmptyDataset { stage: "normalization" })?;
        let mut std = X.std_axis(Axis(0), 0.0);

        // Избегаем деления на ноль
        self.constant_columns.clear();
        for (i, val) in std.iter_mut().enumerate() {
            if *val < MIN_STD {
                *val = 1.0;
                self.constant_columns.push(i);
            }
        }

        self.mean = Some(mean);
        self.std = Some(std);
        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        let (mean, std) = match (&self.mean, &self.std) {
            (Some(mean), Some(std)) => (mean, std),
            _ => return Err(PrepError::NotFitted),
        };

        if X.ncols() != mean.len() {
            return Err(PrepError::ShapeMismatch {
                what: "feature columns",
                expected: mean.len(),
                actual: X.ncols(),
            });
        }

        // (X - mean) / std
        Ok((X - mean) / std)
    }

    pub fn fit_transform(&mut self, X: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(X)?;
        self.transform(X)
    }

    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    pub fn std(&self) -> Option<&Array1<f64>> {
        self.std.as_ref()
    }

    /// Индексы столбцов с нулевой дисперсией после `fit`
    pub fn constant_columns(&self) -> &[usize] {
        &self.constant_columns
    }
}

impl Default for DataNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn standardized_columns_have_zero_mean_unit_std() {
        let mut rng = StdRng::seed_from_u64(42);
        let X = Array2::from_shape_fn((200, 3), |(_, j)| match j {
            0 => f64::from(rng.gen_range(0..2u8)),
            1 => rng.gen_range(18.0..70.0),
            _ => rng.gen_range(-1000.0..1000.0),
        });

        let mut normalizer = DataNormalizer::new();
        let Z = normalizer.fit_transform(&X).unwrap();

        for col in Z.axis_iter(Axis(1)) {
            let mean = col.mean().unwrap();
            let std = col.std(0.0);
            assert!(mean.abs() < 1e-9, "mean = {mean}");
            assert!((std - 1.0).abs() < 1e-9, "std = {std}");
        }
        assert!(normalizer.constant_columns().is_empty());
    }

    #[test]
    fn uses_population_std() {
        let X = array![[1.0], [3.0]];
        let mut normalizer = DataNormalizer::new();
        let Z = normalizer.fit_transform(&X).unwrap();

        assert_eq!(normalizer.std().unwrap()[0], 1.0);
        assert_eq!(Z, array![[-1.0], [1.0]]);
    }

    #[test]
    fn constant_column_is_centered_only() {
        let X = array![[1.0, 5.0], [3.0, 5.0]];
        let mut normalizer = DataNormalizer::new();
        let Z = normalizer.fit_transform(&X).unwrap();

        assert_eq!(normalizer.constant_columns(), &[1]);
        assert_eq!(Z.column(1).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn transform_before_fit_fails() {
        let normalizer = DataNormalizer::default();
        let err = normalizer.transform(&array![[1.0]]).unwrap_err();
        assert!(matches!(err, PrepError::NotFitted));
    }

    #[test]
    fn empty_input_fails() {
        let mut normalizer = DataNormalizer::new();
        let err = normalizer.fit(&Array2::zeros((0, 3))).unwrap_err();
        assert!(matches!(err, PrepError::EmptyDataset { .. }));
    }
}
