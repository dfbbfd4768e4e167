use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use proptest::prelude::*;
use pvdash::{Sample, Series, feed_in, grid_draw, net_consumption};

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn arb_grid() -> impl Strategy<Value = Series> {
    prop::collection::vec(-8_000.0f64..8_000.0, 0..96).prop_map(|vals| {
        vals.into_iter()
            .enumerate()
            .map(|(i, v)| {
                let i = i64::try_from(i).unwrap();
                Sample::new(base() + TimeDelta::minutes(15 * i), v)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn feed_in_and_grid_draw_are_complementary(grid in arb_grid()) {
        let f = feed_in(&grid);
        let d = grid_draw(&grid);
        prop_assert_eq!(f.len(), grid.len());
        prop_assert_eq!(d.len(), grid.len());
        for ((g, f), d) in grid.iter().zip(f.iter()).zip(d.iter()) {
            prop_assert_eq!(f.at, g.at);
            prop_assert_eq!(d.at, g.at);
            prop_assert!(f.value >= 0.0 && d.value >= 0.0);
            if g.value == 0.0 {
                prop_assert!(f.value == 0.0 && d.value == 0.0);
            } else {
                prop_assert!((f.value == 0.0) != (d.value == 0.0));
            }
            prop_assert_eq!(d.value - f.value, g.value);
        }
    }

    #[test]
    fn net_consumption_is_one_shorter_than_the_bulk_series(grid in arb_grid()) {
        let net = net_consumption(&grid, &grid, &grid, &Series::default());
        prop_assert_eq!(net.len(), grid.len().saturating_sub(1));
        for (n, g) in net.iter().zip(grid.iter()) {
            prop_assert_eq!(n.at, g.at);
            prop_assert_eq!(n.value, 2.0 * g.value);
        }
    }
}
