use rand::Rng;

use canopy::dispersal::{cumulative_table, sample_species};
use canopy::rng::master_stream;

#[test]
fn weighted_sampling_converges_on_the_weights() {
    let table = cumulative_table(&[(1, 0.3), (2, 0.7)], 1.0);
    let mut rng = master_stream(99);

    let draws = 100_000;
    let mut counts = [0u32; 2];
    for _ in 0..draws {
        match sample_species(&table, rng.gen::<f64>()) {
            1 => counts[0] += 1,
            2 => counts[1] += 1,
            other => panic!("sampled unknown species {other}"),
        }
    }

    // Within ±1% of the expected frequencies.
    assert!(
        (counts[0] as i64 - 30_000).abs() <= 1_000,
        "species 1 drawn {} times",
        counts[0]
    );
    assert!(
        (counts[1] as i64 - 70_000).abs() <= 1_000,
        "species 2 drawn {} times",
        counts[1]
    );
}

#[test]
fn unnormalized_weights_are_scaled_by_the_grand_total() {
    // Dispersal pressure totals are rarely 1.0; the table normalizes.
    let table = cumulative_table(&[(5, 1.2), (9, 3.6)], 4.8);
    let mut rng = master_stream(7);

    let draws = 100_000;
    let mut first = 0u32;
    for _ in 0..draws {
        if sample_species(&table, rng.gen::<f64>()) == 5 {
            first += 1;
        }
    }
    assert!((first as i64 - 25_000).abs() <= 1_000, "drawn {first} times");
}
