//! Derived series, computed from other series resolved through the store.

use chrono::NaiveDate;
use pvdash_core::timeseries::interpolate::interpolate_sorted;
use pvdash_core::{DashError, Sample, Series, SeriesKind};

use crate::store::SeriesStore;

/// Compute a derived kind for `day`, resolving dependencies through `store.get`.
///
/// Dependencies are requested concurrently; shared dependencies are fetched
/// once because the store is single-flight per key.
pub(crate) async fn derive(
    store: &SeriesStore,
    kind: SeriesKind,
    day: NaiveDate,
) -> Result<Series, DashError> {
    match kind {
        SeriesKind::FeedIn => Ok(feed_in(&*store.get(SeriesKind::Grid, day).await?)),
        SeriesKind::GridDraw => Ok(grid_draw(&*store.get(SeriesKind::Grid, day).await?)),
        SeriesKind::NetConsumption => {
            let (consumption, roof, grid, balcony) = futures::try_join!(
                store.get(SeriesKind::Consumption, day),
                store.get(SeriesKind::Roof, day),
                store.get(SeriesKind::Grid, day),
                store.get(SeriesKind::Balcony, day),
            )?;
            Ok(net_consumption(&consumption, &roof, &grid, &balcony))
        }
        SeriesKind::Roof | SeriesKind::Consumption | SeriesKind::Grid | SeriesKind::Balcony => {
            Err(DashError::InvalidArg(format!("{kind} is not a derived kind")))
        }
    }
}

/// Exported power: `max(0, -grid)` per sample.
#[must_use]
pub fn feed_in(grid: &Series) -> Series {
    grid.map_values(|v| (-v).max(0.0))
}

/// Imported power: `max(0, grid)` per sample.
#[must_use]
pub fn grid_draw(grid: &Series) -> Series {
    grid.map_values(|v| v.max(0.0))
}

/// `roof[i] + balcony(t) + grid[i]` at the consumption timestamps.
///
/// Index-aligned over the shortest of the three bulk series and stops one
/// sample short of it, so the result pairs up with trapezoid integration the
/// same way the bulk series do. Balcony is interpolated at each timestamp.
#[must_use]
pub fn net_consumption(
    consumption: &Series,
    roof: &Series,
    grid: &Series,
    balcony: &Series,
) -> Series {
    let n = consumption.len().min(roof.len()).min(grid.len());
    let (c, r, g) = (consumption.samples(), roof.samples(), grid.samples());
    (0..n.saturating_sub(1))
        .map(|i| {
            let at = c[i].at;
            Sample::new(
                at,
                r[i].value + interpolate_sorted(balcony.samples(), at) + g[i].value,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn t(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn series(points: &[(u32, u32, f64)]) -> Series {
        points
            .iter()
            .map(|&(h, m, v)| Sample::new(t(h, m), v))
            .collect()
    }

    #[test]
    fn feed_in_and_grid_draw_split_the_sign() {
        let grid = series(&[(9, 0, -300.0), (9, 5, 0.0), (9, 10, 250.0)]);
        let f = feed_in(&grid);
        let d = grid_draw(&grid);
        let fv: Vec<f64> = f.iter().map(|s| s.value).collect();
        let dv: Vec<f64> = d.iter().map(|s| s.value).collect();
        assert_eq!(fv, vec![300.0, 0.0, 0.0]);
        assert_eq!(dv, vec![0.0, 0.0, 250.0]);
        assert_eq!(f.samples()[2].at, t(9, 10));
    }

    #[test]
    fn net_consumption_drops_last_index_and_interpolates_balcony() {
        let consumption = series(&[(9, 0, 1.0), (9, 10, 1.0), (9, 20, 1.0)]);
        let roof = series(&[(9, 0, 100.0), (9, 10, 200.0), (9, 20, 300.0)]);
        let grid = series(&[(9, 0, -50.0), (9, 10, 10.0), (9, 20, 20.0)]);
        let balcony = series(&[(9, 0, 10.0), (9, 20, 30.0)]);

        let net = net_consumption(&consumption, &roof, &grid, &balcony);
        assert_eq!(net.len(), 2);
        assert_eq!(net.samples()[0], Sample::new(t(9, 0), 60.0));
        assert!((net.samples()[1].value - 230.0).abs() < 1e-9);
    }

    #[test]
    fn net_consumption_uses_shortest_bulk_series() {
        let consumption = series(&[(9, 0, 1.0), (9, 10, 1.0), (9, 20, 1.0)]);
        let roof = series(&[(9, 0, 100.0), (9, 10, 200.0)]);
        let grid = series(&[(9, 0, 0.0), (9, 10, 0.0), (9, 20, 0.0)]);
        let net = net_consumption(&consumption, &roof, &grid, &Series::default());
        assert_eq!(net.len(), 1);
        assert!(net_consumption(&Series::default(), &roof, &grid, &Series::default()).is_empty());
    }
}
