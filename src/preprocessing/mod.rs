/// Модуль предобработки данных

pub mod feature_engineering;
pub mod loader;
pub mod normalization;
pub mod outliers;
pub mod salary;

pub use feature_engineering::{
    age_feature, education_feature, median, parse_age, sex_feature, ExtractedFeatures,
    FeatureEngineer,
};
pub use loader::{load_table, normalize_table};
pub use normalization::DataNormalizer;
pub use outliers::{filter_outliers, iqr_bounds, quantile};
pub use salary::{normalize_salaries, parse_salary, CurrencyRate, CurrencyTable};
