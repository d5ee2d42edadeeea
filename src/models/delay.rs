//! Модель задержек рейсов: предобработка + классификатор

use ndarray::{Array1, Array2};

use crate::error::Result;
use crate::models::classifier::{DelayClassifier, LogisticParams};
use crate::preprocessing::FeatureEncoder;
use crate::types::FlightRecord;

/// Целевая колонка при обучении
pub const TARGET_COLUMN: &str = "is_delayed";

/// Модель прогнозирует задержку рейса (> 15 минут) по оператору, типу
/// рейса и месяцу. Признаки - топ-10 one-hot колонок, классы сбалансированы
/// весами.
pub struct DelayModel {
    classifier: DelayClassifier,
}

impl DelayModel {
    pub fn new() -> Self {
        Self {
            classifier: DelayClassifier::new(),
        }
    }

    pub fn with_params(params: LogisticParams) -> Self {
        Self {
            classifier: DelayClassifier::with_params(params),
        }
    }

    pub fn is_trained(&self) -> bool {
        self.classifier.is_trained()
    }

    pub fn classifier(&self) -> &DelayClassifier {
        &self.classifier
    }

    /// Подготовка данных для предсказания
    pub fn preprocess(&self, records: &[FlightRecord]) -> Array2<f64> {
        FeatureEncoder::encode(records)
    }

    /// Подготовка данных для обучения: признаки и целевая колонка
    pub fn preprocess_with_target(
        &self,
        records: &[FlightRecord],
        target_column: &str,
    ) -> Result<(Array2<f64>, Array1<u8>)> {
        FeatureEncoder::encode_with_target(records, target_column)
    }

    pub fn fit(&mut self, features: &Array2<f64>, target: &Array1<u8>) -> Result<()> {
        self.classifier.fit(features, target)
    }

    /// Обучение на исторических записях
    pub fn train(&mut self, records: &[FlightRecord]) -> Result<()> {
        let (features, target) = self.preprocess_with_target(records, TARGET_COLUMN)?;
        let delayed = target.iter().filter(|&&t| t == 1).count();
        tracing::info!(
            "Training delay model: {} flights, {} delayed",
            records.len(),
            delayed
        );
        self.fit(&features, &target)
    }

    pub fn predict(&self, features: &Array2<f64>) -> Result<Vec<u8>> {
        self.classifier.predict(features)
    }
}

impl Default for DelayModel {
    fn default() -> Self {
        Self::new()
    }
}
