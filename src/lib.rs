//! hh-prep - подготовка выгрузки анкет (зарплата, пол, возраст, образование)
//! к обучению моделей: матрица признаков и вектор целей в `.npy`

pub mod error;
pub mod export;
pub mod pipeline;
pub mod preprocessing;
pub mod types;

pub use error::{PrepError, Result};
pub use export::{write_arrays, ExportSummary, WrittenArray};
pub use pipeline::{Pipeline, PipelineOutput};
pub use preprocessing::*;
pub use types::*;
