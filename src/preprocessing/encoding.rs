//! One-hot кодирование рейсов в фиксированный вектор признаков

use std::collections::HashMap;
use std::fmt;

use ndarray::{Array1, Array2};

use crate::error::{DelayError, Result};
use crate::preprocessing::temporal;
use crate::types::{DerivedFields, FlightRecord, FlightType};

/// Категориальная колонка и её значение
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKey<'a> {
    Operator(&'a str),
    FlightType(FlightType),
    Month(u32),
}

impl fmt::Display for FeatureKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKey::Operator(name) => write!(f, "OPERA_{}", name),
            FeatureKey::FlightType(kind) => write!(f, "TIPOVUELO_{}", kind.code()),
            FeatureKey::Month(month) => write!(f, "MES_{}", month),
        }
    }
}

/// Топ-10 признаков, на которых обучается классификатор, в фиксированном порядке
pub const FEATURE_SCHEMA: [FeatureKey<'static>; 10] = [
    FeatureKey::Operator("Latin American Wings"),
    FeatureKey::Month(7),
    FeatureKey::Month(10),
    FeatureKey::Operator("Grupo LATAM"),
    FeatureKey::Month(12),
    FeatureKey::FlightType(FlightType::International),
    FeatureKey::Month(4),
    FeatureKey::Month(11),
    FeatureKey::Operator("Sky Airline"),
    FeatureKey::Operator("Copa Air"),
];

pub const N_FEATURES: usize = FEATURE_SCHEMA.len();

/// Известные целевые колонки производной таблицы
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetColumn {
    IsDelayed,
    IsHighSeason,
}

impl TargetColumn {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "is_delayed" | "delay" => Some(TargetColumn::IsDelayed),
            "is_high_season" | "high_season" => Some(TargetColumn::IsHighSeason),
            _ => None,
        }
    }

    fn value(self, derived: &DerivedFields) -> Option<bool> {
        match self {
            TargetColumn::IsDelayed => derived.is_delayed,
            TargetColumn::IsHighSeason => Some(derived.is_high_season),
        }
    }
}

pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Имена колонок в порядке вектора признаков
    pub fn feature_names() -> Vec<String> {
        FEATURE_SCHEMA.iter().map(|k| k.to_string()).collect()
    }

    /// Производная таблица: для каждой записи - её производные колонки.
    ///
    /// Колонки `minute_diff` и `is_delayed` существуют на уровне пакета:
    /// если хотя бы одна запись их несёт, остальные получают 0.0 и `false`.
    pub fn derive_table(records: &[FlightRecord]) -> Vec<DerivedFields> {
        let mut table: Vec<DerivedFields> = records.iter().map(temporal::derive).collect();

        if table.iter().any(|d| d.minute_diff.is_some()) {
            for derived in table.iter_mut().filter(|d| d.minute_diff.is_none()) {
                derived.minute_diff = Some(0.0);
            }
        }
        if table.iter().any(|d| d.is_delayed.is_some()) {
            for derived in table.iter_mut().filter(|d| d.is_delayed.is_none()) {
                derived.is_delayed = Some(derived.minute_diff.map_or(false, temporal::is_delayed));
            }
        }

        table
    }

    /// One-hot кодирование оператора, типа рейса и месяца.
    ///
    /// Набор колонок зависит от данных: колонка появляется, только если
    /// значение встречается хотя бы в одной записи.
    pub fn one_hot(records: &[FlightRecord]) -> HashMap<FeatureKey<'_>, Array1<f64>> {
        let n_samples = records.len();
        let mut columns: HashMap<FeatureKey<'_>, Array1<f64>> = HashMap::new();

        for (i, record) in records.iter().enumerate() {
            let keys = [
                FeatureKey::Operator(record.operator.as_str()),
                FeatureKey::FlightType(record.flight_type),
                FeatureKey::Month(record.month),
            ];
            for key in keys {
                columns
                    .entry(key)
                    .or_insert_with(|| Array1::zeros(n_samples))[i] = 1.0;
            }
        }

        columns
    }

    /// Проекция one-hot колонок на фиксированную схему.
    ///
    /// Отсутствующие колонки заполняются нулями, лишние отбрасываются.
    pub fn project(columns: &HashMap<FeatureKey<'_>, Array1<f64>>, n_samples: usize) -> Array2<f64> {
        let mut features = Array2::zeros((n_samples, N_FEATURES));

        for (j, key) in FEATURE_SCHEMA.iter().enumerate() {
            if let Some(column) = columns.get(key) {
                features.column_mut(j).assign(column);
            }
        }

        features
    }

    /// Признаки для предсказания: матрица n x 10
    pub fn encode(records: &[FlightRecord]) -> Array2<f64> {
        let columns = Self::one_hot(records);
        Self::project(&columns, records.len())
    }

    /// Признаки и целевая колонка для обучения
    pub fn encode_with_target(
        records: &[FlightRecord],
        target_column: &str,
    ) -> Result<(Array2<f64>, Array1<u8>)> {
        let missing = || DelayError::MissingTargetColumn(target_column.to_string());
        let column = TargetColumn::from_name(target_column).ok_or_else(missing)?;

        let target = Self::derive_table(records)
            .iter()
            .map(|derived| column.value(derived).map(u8::from))
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(missing)?;

        Ok((Self::encode(records), Array1::from(target)))
    }
}
