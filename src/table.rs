//! Time-ordered result table.
//!
//! Holds the aggregated rows sorted by local timestamp and converts them to a
//! polars [`DataFrame`] with the published column layout.

use crate::constants::columns;
use crate::error::Result;
use crate::models::{AggregatedRow, HeightStats, ParticleClass};
use polars::prelude::*;

/// Aggregated rows sorted ascending by local timestamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    rows: Vec<AggregatedRow>,
}

impl ResultTable {
    /// Build a table, sorting rows by timestamp (stable, duplicates kept)
    pub fn from_rows(mut rows: Vec<AggregatedRow>) -> Self {
        rows.sort_by_key(|row| row.timestamp);
        Self { rows }
    }

    pub fn rows(&self) -> &[AggregatedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Output column names in table order
    pub fn column_names() -> Vec<&'static str> {
        let mut names = vec![
            columns::TIMESTAMP,
            columns::TEMPERATURE,
            columns::AOD,
            columns::PBL,
            columns::CLEAN_AEROSOL,
            columns::CLEAN_AEROSOL_H_MEAN,
            columns::CLEAN_AEROSOL_H_STD,
            columns::POLLUTED_AEROSOL,
            columns::POLLUTED_AEROSOL_H_MEAN,
            columns::POLLUTED_AEROSOL_H_STD,
            columns::WATER_CLOUD,
            columns::WATER_CLOUD_H_MEAN,
            columns::WATER_CLOUD_H_STD,
            columns::MIXED_CLOUD,
            columns::MIXED_CLOUD_H_MEAN,
            columns::MIXED_CLOUD_H_STD,
            columns::MOLECULAR,
            columns::MOLECULAR_H_MEAN,
            columns::MOLECULAR_H_STD,
            columns::RAIN_DUST,
            columns::ICE_DUST_ASH,
            columns::ICE_DUST_ASH_H_MEAN,
            columns::ICE_DUST_ASH_H_STD,
        ];
        names.extend(columns::CLOUD_LAYERS.iter().flatten());
        names
    }

    /// Convert to a DataFrame; `data_hora` becomes a millisecond datetime column
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let timestamps: Vec<i64> = self
            .rows
            .iter()
            .map(|row| row.timestamp.and_utc().timestamp_millis())
            .collect();
        let timestamp = Series::new(columns::TIMESTAMP.into(), timestamps)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

        let mut frame_columns = vec![
            Column::from(timestamp),
            self.float_column(columns::TEMPERATURE, |r| r.temperature),
            self.float_column(columns::AOD, |r| r.aod),
            self.float_column(columns::PBL, |r| r.pbl),
        ];

        frame_columns.push(self.count_column(columns::CLEAN_AEROSOL, ParticleClass::CleanAerosol));
        frame_columns.extend(self.stats_columns(
            columns::CLEAN_AEROSOL_H_MEAN,
            columns::CLEAN_AEROSOL_H_STD,
            |r| r.clean_aerosol,
        ));
        frame_columns.push(
            self.count_column(columns::POLLUTED_AEROSOL, ParticleClass::PollutedAerosol),
        );
        frame_columns.extend(self.stats_columns(
            columns::POLLUTED_AEROSOL_H_MEAN,
            columns::POLLUTED_AEROSOL_H_STD,
            |r| r.polluted_aerosol,
        ));
        frame_columns.push(self.count_column(columns::WATER_CLOUD, ParticleClass::WaterCloud));
        frame_columns.extend(self.stats_columns(
            columns::WATER_CLOUD_H_MEAN,
            columns::WATER_CLOUD_H_STD,
            |r| r.water_cloud,
        ));
        frame_columns.push(self.count_column(columns::MIXED_CLOUD, ParticleClass::MixedCloud));
        frame_columns.extend(self.stats_columns(
            columns::MIXED_CLOUD_H_MEAN,
            columns::MIXED_CLOUD_H_STD,
            |r| r.mixed_cloud,
        ));
        frame_columns.push(self.count_column(columns::MOLECULAR, ParticleClass::Molecular));
        frame_columns.extend(self.stats_columns(
            columns::MOLECULAR_H_MEAN,
            columns::MOLECULAR_H_STD,
            |r| r.molecular,
        ));
        frame_columns.push(self.count_column(columns::RAIN_DUST, ParticleClass::RainDust));
        frame_columns.push(self.count_column(columns::ICE_DUST_ASH, ParticleClass::IceDustAsh));
        frame_columns.extend(self.stats_columns(
            columns::ICE_DUST_ASH_H_MEAN,
            columns::ICE_DUST_ASH_H_STD,
            |r| r.ice_dust_ash,
        ));

        for (layer, [base, peak, top]) in columns::CLOUD_LAYERS.iter().enumerate() {
            frame_columns.push(self.float_column(base, |r| r.cloud_layers[layer].base));
            frame_columns.push(self.float_column(peak, |r| r.cloud_layers[layer].peak));
            frame_columns.push(self.float_column(top, |r| r.cloud_layers[layer].top));
        }

        Ok(DataFrame::new(frame_columns)?)
    }

    fn float_column(&self, name: &str, value: impl Fn(&AggregatedRow) -> f64) -> Column {
        let values: Vec<f64> = self.rows.iter().map(value).collect();
        Column::new(name.into(), values)
    }

    fn count_column(&self, name: &str, class: ParticleClass) -> Column {
        let counts: Vec<u32> = self.rows.iter().map(|r| r.counts.get(class)).collect();
        Column::new(name.into(), counts)
    }

    fn stats_columns(
        &self,
        mean_name: &str,
        std_name: &str,
        stats: impl Fn(&AggregatedRow) -> HeightStats,
    ) -> [Column; 2] {
        [
            self.float_column(mean_name, |r| stats(r).mean),
            self.float_column(std_name, |r| stats(r).std_dev),
        ]
    }
}
