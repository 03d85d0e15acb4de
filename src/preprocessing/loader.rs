//! Загрузка CSV-выгрузки анкет в таблицу

use std::collections::HashMap;
use std::path::Path;

use crate::error::{PrepError, Result};
use crate::types::{Cell, ColumnData, LoaderConfig, Table};

const BOM: char = '\u{feff}';
const NBSP: char = '\u{a0}';

/// Читает CSV (UTF-8, запятая, строка заголовков) и нормализует его.
///
/// Существование файла проверяет вызывающая сторона; здесь ошибка открытия
/// превращается в `PrepError::Io`.
pub fn load_table(path: &Path, config: &LoaderConfig) -> Result<Table> {
    let file = std::fs::File::open(path).map_err(|source| PrepError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    tracing::debug!("Read {} raw rows, {} columns from {}", rows.len(), headers.len(), path.display());

    normalize_table(headers, rows, config)
}

/// Нормализация сырого CSV: BOM в заголовках, индексный столбец,
/// неразрывные пробелы, пустые строки.
pub fn normalize_table(
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    config: &LoaderConfig,
) -> Result<Table> {
    let raw_names: Vec<String> = headers.iter().map(|h| h.replace(BOM, "")).collect();
    let n_cols = raw_names.len();

    // Столбец-индекс, сохраненный датафреймом: "Unnamed: 0" или пустой первый заголовок
    let keep_col: Vec<bool> = raw_names
        .iter()
        .enumerate()
        .map(|(i, name)| !(*name == config.index_column || (i == 0 && name.is_empty())))
        .collect();

    let names = dedup_names(raw_names);

    let mut cells: Vec<Vec<Cell>> = Vec::with_capacity(rows.len());
    let mut truncated = 0usize;

    for mut row in rows {
        if row.len() > n_cols {
            truncated += 1;
            row.truncate(n_cols);
        }

        let mut parsed: Vec<Cell> = row
            .into_iter()
            .map(|value| normalize_cell(value, &config.na_values))
            .collect();
        parsed.resize(n_cols, None);

        let is_empty = parsed
            .iter()
            .zip(&keep_col)
            .all(|(cell, &keep)| !keep || cell.is_none());
        if !is_empty {
            cells.push(parsed);
        }
    }

    if truncated > 0 {
        tracing::warn!("{} rows had more fields than the header; extra fields dropped", truncated);
    }

    let mut table = Table::new(cells.len());
    for (col_idx, name) in names.into_iter().enumerate() {
        if !keep_col[col_idx] {
            tracing::debug!("Dropping index column '{}'", name);
            continue;
        }
        let column: Vec<Cell> = cells.iter_mut().map(|row| row[col_idx].take()).collect();
        table.add_column(name, ColumnData::Text(column))?;
    }

    Ok(table)
}

/// Повторяющиеся заголовки получают суффикс: "ЗП", "ЗП.1", "ЗП.2".
/// Первый столбец сохраняет исходное имя.
fn dedup_names(names: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut renamed = Vec::with_capacity(names.len());

    for original in names {
        let mut name = original;
        let mut count = counts.get(&name).copied().unwrap_or(0);
        while count > 0 {
            counts.insert(name.clone(), count + 1);
            name = format!("{name}.{count}");
            count = counts.get(&name).copied().unwrap_or(0);
        }
        counts.insert(name.clone(), count + 1);
        renamed.push(name);
    }

    renamed
}

fn normalize_cell(value: String, na_values: &[String]) -> Cell {
    if value.is_empty() || na_values.iter().any(|na| *na == value) {
        return None;
    }
    if value.contains(NBSP) {
        Some(value.replace(NBSP, " "))
    } else {
        Some(value)
    }
}
