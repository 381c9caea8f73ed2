//! Product-completion indicator.
//!
//! Each action map reports its product as a completion band; the headline
//! value is the mean of the band midpoints. This approximates progress, it
//! is not weighted against any expected total.

use serde::{Deserialize, Serialize};

use super::directory::SchoolDirectory;
use super::hierarchy::DomainAggregator;
use super::percent::clamp_percent;
use crate::models::{ManagementCycleRow, ProductBand, SchoolId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductTotals {
    /// Count per band, in `ProductBand::ALL` order
    pub bands: [u64; 4],
    pub sem_faixa: u64,
}

impl ProductTotals {
    fn banded(&self) -> u64 {
        self.bands.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandCount {
    pub faixa: String,
    pub ponto_medio: f64,
    pub quantidade: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductsSummary {
    /// Products with a recognized band
    pub produtos: u64,
    /// Products whose status is not a known band; excluded from the mean
    pub sem_faixa: u64,
    pub por_faixa: Vec<BandCount>,
    pub percentual_medio: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Products;

fn band_index(band: ProductBand) -> usize {
    match band {
        ProductBand::UpTo25 => 0,
        ProductBand::From26To50 => 1,
        ProductBand::From51To75 => 2,
        ProductBand::From76To100 => 3,
    }
}

impl DomainAggregator for Products {
    type Row = ManagementCycleRow;
    type Totals = ProductTotals;
    type Summary = ProductsSummary;

    fn school_of(&self, row: &ManagementCycleRow, directory: &SchoolDirectory) -> Option<SchoolId> {
        row.escola_id.filter(|id| directory.school(*id).is_some())
    }

    fn fold(&self, totals: &mut ProductTotals, row: &ManagementCycleRow, _school: SchoolId) {
        match row.product_band() {
            Some(band) => totals.bands[band_index(band)] += 1,
            None => totals.sem_faixa += 1,
        }
    }

    fn merge(&self, totals: &mut ProductTotals, other: &ProductTotals) {
        for (mine, theirs) in totals.bands.iter_mut().zip(other.bands.iter()) {
            *mine += theirs;
        }
        totals.sem_faixa += other.sem_faixa;
    }

    fn derive(&self, totals: &ProductTotals) -> ProductsSummary {
        let produtos = totals.banded();
        let weighted: f64 = ProductBand::ALL
            .iter()
            .map(|band| band.midpoint() * totals.bands[band_index(*band)] as f64)
            .sum();
        let percentual_medio = if produtos == 0 {
            0.0
        } else {
            clamp_percent(weighted / produtos as f64)
        };

        ProductsSummary {
            produtos,
            sem_faixa: totals.sem_faixa,
            por_faixa: ProductBand::ALL
                .iter()
                .map(|band| BandCount {
                    faixa: band.label().to_string(),
                    ponto_medio: band.midpoint(),
                    quantidade: totals.bands[band_index(*band)],
                })
                .collect(),
            percentual_medio,
        }
    }
}
