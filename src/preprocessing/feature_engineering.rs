//! Извлечение признаков из анкетных полей

use std::sync::LazyLock;

use ndarray::{Array1, Array2};
use regex::Regex;

use crate::error::{PrepError, Result};
use crate::preprocessing::DataNormalizer;
use crate::types::{FeatureConfig, FeatureSet, Table, FEATURE_NAMES};

const MALE_MARKER: &str = "мужчина";
const HIGHER_EDUCATION_MARKER: &str = "высшее";

/// Число, за которым (возможно через пробел) идет "год"/"лет"
static AGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:год|лет)").expect("age regex"));

static DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d$").expect("digit regex"));

/// 1.0 для мужчин, иначе 0.0 (включая пропуск)
pub fn sex_feature(text: Option<&str>) -> f64 {
    contains_lowercase(text, MALE_MARKER)
}

/// 1.0 при наличии высшего образования, иначе 0.0 (включая пропуск)
pub fn education_feature(text: Option<&str>) -> f64 {
    contains_lowercase(text, HIGHER_EDUCATION_MARKER)
}

/// Возраст по первому совпадению "<число> год/лет"
pub fn parse_age(text: Option<&str>) -> Option<f64> {
    let lower = text?.to_lowercase();
    let caps = AGE_RE.captures(&lower)?;
    parse_decimal(caps.get(1)?.as_str())
}

/// Целое из десятичных цифр любого письма (`\d` в Unicode)
fn parse_decimal(digits: &str) -> Option<f64> {
    digits
        .chars()
        .try_fold(0.0, |acc, c| Some(acc * 10.0 + f64::from(digit_value(c)?)))
}

/// Значение цифры категории Nd.
///
/// Цифры Nd идут непрерывными блоками по 10 (от 0 до 9), поэтому значение
/// равно числу предшествующих цифр подряд по модулю 10.
fn digit_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal_digit(c) {
        return None;
    }

    let mut preceding = 0u32;
    let mut code = u32::from(c);
    while let Some(prev) = code.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        preceding += 1;
        code -= 1;
    }
    Some(preceding % 10)
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DIGIT_RE.is_match(c.encode_utf8(&mut buf))
}

pub fn age_feature(text: Option<&str>, default_age: f64) -> f64 {
    parse_age(text).unwrap_or(default_age)
}

fn contains_lowercase(text: Option<&str>, marker: &str) -> f64 {
    match text {
        Some(t) if t.to_lowercase().contains(marker) => 1.0,
        _ => 0.0,
    }
}

/// Медиана определенных значений; для четного числа - среднее двух центральных
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Признаки и целевая переменная вместе с диагностикой этапа
#[derive(Debug, Clone)]
pub struct ExtractedFeatures {
    pub feature_set: FeatureSet,
    pub target_median: f64,
    pub imputed_targets: usize,
    pub constant_features: Vec<String>,
}

pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Сырые признаки (sex, age, education) без стандартизации
    pub fn raw_features(table: &Table, config: &FeatureConfig) -> Result<Array2<f64>> {
        let sex_age = table.text(&config.sex_age_column)?;
        let education = table.text(&config.education_column)?;

        let n_samples = table.n_rows();
        let mut features = Array2::zeros((n_samples, FEATURE_NAMES.len()));

        for (i, (sa, edu)) in sex_age.iter().zip(education).enumerate() {
            let sa = sa.as_deref();
            features[[i, 0]] = sex_feature(sa);
            features[[i, 1]] = age_feature(sa, config.default_age);
            features[[i, 2]] = education_feature(edu.as_deref());
        }

        Ok(features)
    }

    /// Целевая переменная: пропуски заполняются медианой определенных значений
    pub fn targets(table: &Table, config: &FeatureConfig) -> Result<(Array1<f64>, f64, usize)> {
        let salaries = table.numeric(&config.salary_column)?;

        let defined: Vec<f64> = salaries.iter().flatten().copied().collect();
        let fill = median(&defined).ok_or_else(|| PrepError::UndefinedMedian {
            column: config.salary_column.clone(),
        })?;

        let imputed = salaries.len() - defined.len();
        let targets = salaries.iter().map(|s| s.unwrap_or(fill)).collect();

        Ok((targets, fill, imputed))
    }

    /// Матрица признаков (стандартизованная) и вектор целей
    pub fn extract_features(table: &Table, config: &FeatureConfig) -> Result<ExtractedFeatures> {
        if table.is_empty() {
            return Err(PrepError::EmptyDataset { stage: "feature extraction" });
        }

        let raw = Self::raw_features(table, config)?;
        let (targets, target_median, imputed_targets) = Self::targets(table, config)?;

        let mut normalizer = DataNormalizer::new();
        let standardized = normalizer.fit_transform(&raw)?;

        let constant_features: Vec<String> = normalizer
            .constant_columns()
            .iter()
            .map(|&i| FEATURE_NAMES[i].to_string())
            .collect();
        if !constant_features.is_empty() {
            tracing::warn!(
                "Zero variance in {:?}: columns centered without scaling",
                constant_features
            );
        }

        if imputed_targets > 0 {
            tracing::debug!("Imputed {} targets with median {:.2}", imputed_targets, target_median);
        }

        let feature_set = FeatureSet {
            features: standardized.mapv(|v| v as f32),
            targets: targets.mapv(|v| v as f32),
        };

        Ok(ExtractedFeatures {
            feature_set,
            target_median,
            imputed_targets,
            constant_features,
        })
    }
}
