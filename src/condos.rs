// 🏢 Condo characteristics
// Compares Minatoya-list condos in West and South Maui against resident
// occupied condos elsewhere.

use crate::minatoya::is_minatoya;
use crate::rpad::Property;
use crate::stats::{median_i64, pct};
use crate::tax_class::TaxClass;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CondoCharacteristics {
    pub desc: String,
    pub total_count: usize,
    pub median_year_built: Option<i64>,
    pub median_assessed_building_value: Option<i64>,
    pub pct_0br: Option<f64>,
    pub pct_1br: Option<f64>,
    pub pct_2br: Option<f64>,
    pub pct_3br: Option<f64>,
    pub pct_oo: Option<f64>,
    pub pct_ltr: Option<f64>,
    pub pct_noo: Option<f64>,
    pub pct_tvr: Option<f64>,
}

/// Summarize one subset of condos. Percentages are of the subset's total;
/// a category with no members is left blank.
pub fn characterize(desc: &str, condos: &[&Property]) -> CondoCharacteristics {
    let total = condos.len() as f64;
    let share = |matches: &dyn Fn(&Property) -> bool| {
        match condos.iter().filter(|&&p| matches(p)).count() {
            0 => None,
            count => pct(count as f64, total),
        }
    };
    let bedrooms = |n: i64| share(&|p: &Property| p.dwelling.bed_rooms == Some(n));
    let class = |c: TaxClass| share(&|p: &Property| p.tax_class == c);

    CondoCharacteristics {
        desc: desc.to_string(),
        total_count: condos.len(),
        median_year_built: median_i64(
            condos
                .iter()
                .filter_map(|p| p.dwelling.year_built.map(|y| y as f64)),
        ),
        median_assessed_building_value: median_i64(
            condos
                .iter()
                .filter_map(|p| p.values.building)
                .filter(|v| *v > 0.0),
        ),
        pct_0br: bedrooms(0),
        pct_1br: bedrooms(1),
        pct_2br: bedrooms(2),
        pct_3br: bedrooms(3),
        pct_oo: class(TaxClass::OwnerOccupied),
        pct_ltr: class(TaxClass::LongTermRental),
        pct_noo: class(TaxClass::NonOwnerOccupied),
        pct_tvr: class(TaxClass::TvrStrh),
    }
}

fn in_west_or_south_maui(p: &Property) -> bool {
    p.tmk.is_west_maui() || p.tmk.is_south_maui()
}

/// Three subsets:
/// 1. Minatoya condos in West and South Maui (nearly all of the list)
/// 2. other West and South Maui condos that residents live in
/// 3. Central Maui condos that residents live in
pub fn condo_characteristics(properties: &[Property]) -> Vec<CondoCharacteristics> {
    let condos: Vec<&Property> = properties.iter().filter(|p| p.is_condo()).collect();

    let minatoya: Vec<&Property> = condos
        .iter()
        .copied()
        .filter(|p| in_west_or_south_maui(p) && is_minatoya(p.tmk))
        .collect();
    let non_minatoya: Vec<&Property> = condos
        .iter()
        .copied()
        .filter(|p| in_west_or_south_maui(p) && !is_minatoya(p.tmk) && p.tax_class.is_resident())
        .collect();
    let central: Vec<&Property> = condos
        .iter()
        .copied()
        .filter(|p| p.tmk.is_central_maui() && p.tax_class.is_resident())
        .collect();

    let rows = vec![
        characterize("west-south-maui-minatoya-condos", &minatoya),
        characterize("west-south-maui-non-minatoya-condos", &non_minatoya),
        characterize("central-maui-condos", &central),
    ];

    info!(
        "Condo characteristics: {} / {} / {} condos",
        minatoya.len(),
        non_minatoya.len(),
        central.len()
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpad::{AssessedValues, Dwelling};
    use crate::tmk::Tmk;

    fn condo(tmk: i64, tax_class: TaxClass, bed_rooms: i64, year: i64, value: f64) -> Property {
        let tmk = Tmk(tmk);
        Property {
            tmk,
            region: tmk.region(),
            tax_class,
            values: AssessedValues {
                building: Some(value),
                ..AssessedValues::default()
            },
            dwelling: Dwelling {
                tmk,
                sf_of_living_area: Some(700.0),
                year_built: Some(year),
                bed_rooms: Some(bed_rooms),
                is_condo: true,
            },
        }
    }

    #[test]
    fn test_condo_subsets() {
        let properties = vec![
            // MAUI SUNSET units (Minatoya, South Maui)
            condo(2390010020001, TaxClass::TvrStrh, 1, 1976, 300_000.0),
            condo(2390010020002, TaxClass::OwnerOccupied, 2, 1976, 0.0),
            condo(2390010020003, TaxClass::TvrStrh, 1, 1978, 350_000.0),
            // non-Minatoya South Maui
            condo(2390010990001, TaxClass::LongTermRental, 2, 1990, 250_000.0),
            condo(2390010990002, TaxClass::TvrStrh, 2, 1990, 250_000.0),
            // Central Maui
            condo(2380010010001, TaxClass::OwnerOccupied, 3, 2001, 400_000.0),
        ];

        let rows = condo_characteristics(&properties);

        let minatoya = &rows[0];
        assert_eq!(minatoya.desc, "west-south-maui-minatoya-condos");
        assert_eq!(minatoya.total_count, 3);
        assert_eq!(minatoya.median_year_built, Some(1976));
        assert_eq!(minatoya.median_assessed_building_value, Some(325_000), "zero values ignored");
        assert_eq!(minatoya.pct_1br, Some(66.7));
        assert_eq!(minatoya.pct_0br, None, "no studios: blank, not zero");
        assert_eq!(minatoya.pct_ltr, None);
        assert_eq!(minatoya.pct_tvr, Some(66.7));
        assert_eq!(minatoya.pct_oo, Some(33.3));

        assert_eq!(rows[1].total_count, 1, "TVR unit is not resident occupied");
        assert_eq!(rows[1].pct_ltr, Some(100.0));
        assert_eq!(rows[2].total_count, 1);
        assert_eq!(rows[2].pct_3br, Some(100.0));

        println!("✅ Condo characteristics test PASSED");
    }

    #[test]
    fn test_empty_subset() {
        let row = characterize("empty", &[]);
        assert_eq!(row.total_count, 0);
        assert_eq!(row.median_year_built, None);
        assert_eq!(row.pct_0br, None, "no percentages without a total");
    }
}
