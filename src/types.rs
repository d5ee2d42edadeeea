/// Типы данных модели задержек

use serde::{Deserialize, Deserializer, Serialize};

/// Операторы, которые принимает сервис (как в исторических данных)
pub const KNOWN_OPERATORS: [&str; 21] = [
    "Grupo LATAM",
    "Sky Airline",
    "Aerolineas Argentinas",
    "Copa Air",
    "Latin American Wings",
    "Avianca",
    "JetSmart SPA",
    "Gol Trans",
    "American Airlines",
    "Air Canada",
    "Iberia",
    "Delta Air",
    "Air France",
    "Alitalia",
    "KLM",
    "British Airways",
    "Qantas Airways",
    "United Airlines",
    "Lacsa",
    "Austral",
    "Plus Ultra Lineas Aereas",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightType {
    #[serde(rename = "N", alias = "domestic")]
    Domestic,
    #[serde(rename = "I", alias = "international")]
    International,
}

impl FlightType {
    pub fn code(self) -> &'static str {
        match self {
            FlightType::Domestic => "N",
            FlightType::International => "I",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodOfDay {
    #[serde(alias = "mañana")]
    Morning,
    #[serde(alias = "tarde")]
    Afternoon,
    #[serde(alias = "noche")]
    Night,
}

/// Запись о рейсе.
///
/// Имена колонок как в исторических данных (`OPERA`, `TIPOVUELO`, `MES`,
/// `Fecha-I`, `Fecha-O`), описательные имена тоже принимаются.
/// Производные колонки необязательны; если они есть, они не пересчитываются.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    #[serde(rename = "OPERA", alias = "operator")]
    pub operator: String,
    #[serde(rename = "TIPOVUELO", alias = "flight_type")]
    pub flight_type: FlightType,
    #[serde(rename = "MES", alias = "month")]
    pub month: u32,
    #[serde(rename = "Fecha-I", alias = "scheduled_datetime", default)]
    pub scheduled_datetime: String,
    #[serde(rename = "Fecha-O", alias = "actual_datetime", default)]
    pub actual_datetime: Option<String>,

    #[serde(rename = "period_day", alias = "period_of_day", default)]
    pub period_of_day: Option<PeriodOfDay>,
    #[serde(
        rename = "high_season",
        alias = "is_high_season",
        default,
        deserialize_with = "deserialize_flag"
    )]
    pub is_high_season: Option<bool>,
    #[serde(rename = "min_diff", alias = "minute_diff", default)]
    pub minute_diff: Option<f64>,
    #[serde(
        rename = "delay",
        alias = "is_delayed",
        default,
        deserialize_with = "deserialize_flag"
    )]
    pub is_delayed: Option<bool>,
}

impl FlightRecord {
    pub fn new(
        operator: impl Into<String>,
        flight_type: FlightType,
        month: u32,
        scheduled_datetime: impl Into<String>,
    ) -> Self {
        Self {
            operator: operator.into(),
            flight_type,
            month,
            scheduled_datetime: scheduled_datetime.into(),
            actual_datetime: None,
            period_of_day: None,
            is_high_season: None,
            minute_diff: None,
            is_delayed: None,
        }
    }

    pub fn with_actual(mut self, actual_datetime: impl Into<String>) -> Self {
        self.actual_datetime = Some(actual_datetime.into());
        self
    }

    /// Запись с заполненными производными колонками
    pub fn with_derived(mut self, derived: &DerivedFields) -> Self {
        self.period_of_day = Some(derived.period_of_day);
        self.is_high_season = Some(derived.is_high_season);
        self.minute_diff = derived.minute_diff;
        self.is_delayed = derived.is_delayed;
        self
    }
}

/// Колонки, вычисленные по [`FlightRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFields {
    pub period_of_day: PeriodOfDay,
    pub is_high_season: bool,
    /// Только для исторических записей с фактическим временем
    pub minute_diff: Option<f64>,
    pub is_delayed: Option<bool>,
}

// Флаги приходят как true/false или 0/1
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Float(f64),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = Option::<Flag>::deserialize(deserializer)?;
    Ok(flag.map(|f| match f {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
        Flag::Float(x) => x != 0.0,
    }))
}
