//! Property-based tests for sample decimation, unit conversion and
//! inflection freezing

use inflation_plot::inflection::InflectionDetector;
use inflation_plot::loader::{is_kept, SampleLoader, DECIMATION_STRIDE};
use inflation_plot::projection::Projection;
use inflation_plot::sample::{Point, Sample, BLOCKS_PER_YEAR};
use proptest::prelude::*;
use std::io::Cursor;

fn to_jsonl(samples: &[(i64, i64, i64)]) -> String {
    samples
        .iter()
        .map(|(b, s, r)| format!("{{\"b\":{},\"s\":{},\"rvec\":[{},0]}}\n", b, s, r))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_decimation_is_exact(
        samples in prop::collection::vec((0i64..200_000, 0i64..1_000_000_000, 0i64..10_000), 0..60),
    ) {
        // Property: exactly the stride-aligned blocks are plotted, in input order
        let input = to_jsonl(&samples);
        let loader = SampleLoader::new(Cursor::new(input.into_bytes()));
        let projection = Projection::collect(loader, &["producer".to_string()]).unwrap();

        let expected: Vec<Point> = samples
            .iter()
            .filter(|(b, _, _)| b % DECIMATION_STRIDE == 0)
            .map(|(b, s, _)| Point::from_raw(*b, *s))
            .collect();

        prop_assert_eq!(projection.points, expected);
        prop_assert_eq!(projection.lines_read, samples.len());
        for inflection in &projection.inflections {
            prop_assert!(is_kept(inflection.block));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_point_units(block in 0i64..i64::from(u32::MAX), supply in 0i64..100_000_000_000_000) {
        // Property: x is years of 20 blocks/minute, y is supply in thousands
        let p = Point::from_raw(block, supply);
        let x = block as f64 / (20.0 * 60.0 * 24.0 * 365.0);
        let y = supply as f64 / 1000.0;

        prop_assert!((p.x - x).abs() <= x.abs() * 1e-12);
        prop_assert!((p.y - y).abs() <= y.abs() * 1e-12);
        prop_assert!((p.x * BLOCKS_PER_YEAR as f64 - block as f64).abs() <= 1e-6 * (block as f64).max(1.0));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_inflection_frozen_after_first_match(
        values in prop::collection::vec(-5_000i64..5_000, 1..40),
    ) {
        // Property: the recorded marker is the first non-multiple, never moved later
        let mut detector = InflectionDetector::default();
        let mut first = None;

        for (i, value) in values.iter().enumerate() {
            let sample = Sample {
                block: (i as i64 + 1) * DECIMATION_STRIDE,
                supply: 21_000_000 + i as i64,
                rewards: vec![*value, 0],
            };
            detector.observe(&sample, sample.point(), i + 1).unwrap();

            if first.is_none() && value % 1000 != 0 {
                first = Some(sample.clone());
            }

            match &first {
                Some(expected) => {
                    prop_assert_eq!(detector.inflections().len(), 1);
                    let recorded = &detector.inflections()[0];
                    prop_assert_eq!(recorded.block, expected.block);
                    prop_assert_eq!(recorded.style_code(), "mo".to_string());
                    prop_assert_eq!(recorded.position, expected.point());
                }
                None => prop_assert!(detector.inflections().is_empty()),
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_string_and_number_encodings_agree(
        b in 0i64..1_000_000_000,
        s in 0i64..100_000_000_000_000,
        r in -1_000_000i64..1_000_000,
    ) {
        // Property: a decimal string decodes to the same integer as a JSON number
        let numeric = format!("{{\"b\":{},\"s\":{},\"rvec\":[{}]}}", b, s, r);
        let quoted = format!("{{\"b\":\"{}\",\"s\":\"{}\",\"rvec\":[\"{}\"]}}", b, s, r);

        let a = Sample::from_json_line(&numeric, 1).unwrap();
        let q = Sample::from_json_line(&quoted, 1).unwrap();
        prop_assert_eq!(a, q);
    }
}
