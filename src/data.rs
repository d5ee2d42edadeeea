//! Загрузка исторических рейсов из CSV

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{DelayError, Result};
use crate::types::FlightRecord;

pub fn load_flights(path: &Path) -> Result<Vec<FlightRecord>> {
    let file = File::open(path)
        .map_err(|e| DelayError::Dataset(format!("{}: {}", path.display(), e)))?;
    let records = read_flights(BufReader::new(file))?;
    tracing::info!("Loaded {} flights from {}", records.len(), path.display());
    Ok(records)
}

/// Чтение записей; лишние колонки игнорируются.
///
/// Строки, которые не удаётся разобрать, пропускаются с предупреждением.
/// Ошибка - только если не читается заголовок.
pub fn read_flights<R: Read>(reader: R) -> Result<Vec<FlightRecord>> {
    let mut reader = csv::Reader::from_reader(reader);
    reader
        .headers()
        .map_err(|e| DelayError::Dataset(format!("header: {}", e)))?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (i, row) in reader.deserialize::<FlightRecord>().enumerate() {
        match row {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Skipping row {}: {}", i + 1, e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} unreadable rows, kept {}", skipped, records.len());
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlightType, PeriodOfDay};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DATASET: &str = "\
Fecha-I,Vlo-I,Ori-I,Des-I,Emp-I,Fecha-O,Vlo-O,Ori-O,Des-O,Emp-O,DIA,MES,AÑO,DIANOM,TIPOVUELO,OPERA,SIGLAORI,SIGLADES
2017-01-01 23:30:00,226,SCEL,KMIA,AAL,2017-01-01 23:33:00,226,SCEL,KMIA,AAL,1,1,2017,Domingo,I,American Airlines,Santiago,Miami
2017-07-15 10:00:00,912,SCEL,SCFA,LAN,2017-07-15 10:40:00,912,SCEL,SCFA,LAN,15,7,2017,Sabado,N,Grupo LATAM,Santiago,Antofagasta
";

    #[test]
    fn test_read_dataset_columns() {
        let records = read_flights(DATASET.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].operator, "American Airlines");
        assert_eq!(records[0].flight_type, FlightType::International);
        assert_eq!(records[0].month, 1);
        assert_eq!(records[1].actual_datetime.as_deref(), Some("2017-07-15 10:40:00"));
        assert_eq!(records[1].is_delayed, None);
    }

    #[test]
    fn test_read_precomputed_columns() {
        let csv = "\
OPERA,TIPOVUELO,MES,Fecha-I,period_day,high_season,delay
Copa Air,I,12,2017-12-20 08:00:00,tarde,1,0
Copa Air,I,12,2017-12-20 08:00:00,,,
";
        let records = read_flights(csv.as_bytes()).unwrap();
        assert_eq!(records[0].period_of_day, Some(PeriodOfDay::Afternoon));
        assert_eq!(records[0].is_high_season, Some(true));
        assert_eq!(records[0].is_delayed, Some(false));
        assert_eq!(records[1].period_of_day, None);
        assert_eq!(records[1].is_high_season, None);
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let csv = "\
OPERA,TIPOVUELO,MES
Copa Air,X,12
Sky Airline,N,3
Grupo LATAM,I,not a month
";
        let records = read_flights(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].operator, "Sky Airline");
    }

    #[test]
    fn test_blank_actual_time_still_trains() {
        let csv = "\
Fecha-I,Fecha-O,MES,TIPOVUELO,OPERA
2023-07-15 10:00:00,2023-07-15 10:40:00,7,I,Grupo LATAM
2023-03-10 09:00:00,2023-03-10 09:02:00,3,N,Sky Airline
2023-03-11 09:00:00,,3,N,Sky Airline
";
        let records = read_flights(csv.as_bytes()).unwrap();
        assert_eq!(records[2].actual_datetime, None);

        let mut model = crate::DelayModel::new();
        model.train(&records).unwrap();
        assert!(model.is_trained());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DATASET.as_bytes()).unwrap();

        let records = load_flights(file.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let result = load_flights(Path::new("/nonexistent/data.csv"));
        assert!(matches!(result, Err(DelayError::Dataset(_))));
    }
}
