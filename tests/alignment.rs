use assert_approx_eq::assert_approx_eq;
use borehole_align::data::filter::mask_all_nans;
use borehole_align::{Borehole, BoreholeError, ResampleOptions, Resampler, Trend};
use ndarray::Axis;
use rstest::*;

#[fixture]
fn two_logs() -> Borehole {
    let mut bh = Borehole::new();
    bh.add_datum(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 2.0, 3.0], "A", None)
        .unwrap();
    bh.add_datum(&[0.0, 2.0], &[10.0, 20.0], "B", None).unwrap();
    bh
}

/// Irregular, unsorted, NaN-laden logs over overlapping depth ranges.
#[fixture]
fn messy_logs() -> Borehole {
    let mut bh = Borehole::new();
    let depth_a = [5.3, 1.0, 2.2, f64::NAN, 3.9, 7.5, 6.1, 0.4];
    let gamma = [50.0, 41.0, 47.0, 48.0, f64::NAN, 58.0, 61.0, 39.0];
    bh.add_datum(&depth_a, &gamma, "gamma", Some("Gamma ray")).unwrap();

    let depth_b = [0.9, 1.8, 2.7, 3.6, 4.5, 5.4, 6.3];
    let density = [2.41, 2.44, f64::NAN, 2.52, 2.49, 2.55, 2.61];
    bh.add_datum(&depth_b, &density, "density", Some("Bulk density")).unwrap();
    bh
}

#[rstest]
fn two_dataset_scenario(mut two_logs: Borehole) {
    two_logs.resample(&ResampleOptions::new().nsamples(3)).unwrap();

    let domain = two_logs.get_domain().unwrap();
    assert_eq!(domain.len(), 3);
    assert_approx_eq!(domain[0], 0.0);
    assert_approx_eq!(domain[2], 2.0);

    let signals = two_logs.get_signal(&["A", "B"]).unwrap();
    for (got, want) in signals["A"].iter().zip([0.0, 1.0, 2.0]) {
        assert_approx_eq!(*got, want);
    }
    for (got, want) in signals["B"].iter().zip([10.0, 15.0, 20.0]) {
        assert_approx_eq!(*got, want);
    }
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(17)]
#[case(1000)]
fn matrix_shape_follows_nsamples(#[case] n: usize, mut messy_logs: Borehole) {
    messy_logs.resample(&ResampleOptions::new().nsamples(n)).unwrap();
    assert_eq!(messy_logs.get_domain().unwrap().len(), n);
    assert_eq!(messy_logs.get_data().unwrap().dim(), (n, 2));
}

#[rstest]
fn default_grid_is_intersection_with_largest_count(mut messy_logs: Borehole) {
    let defaults = messy_logs.default_sampler_properties();
    // gamma keeps 6 clean samples, density 6
    assert_eq!(defaults.nsamples, Some(6));
    assert_eq!(defaults.domain_bounds, Some((0.9, 6.3)));

    messy_logs.resample(&ResampleOptions::new()).unwrap();
    let domain = messy_logs.get_domain().unwrap();
    assert_eq!(domain.len(), 6);
    assert_approx_eq!(domain[0], 0.9);
    assert_approx_eq!(domain[5], 6.3);
}

#[rstest]
fn resampling_is_idempotent(mut messy_logs: Borehole) {
    let opts = ResampleOptions::new().nsamples(40).detrend(Some(Trend::Mean));
    messy_logs.resample(&opts).unwrap();
    let first = messy_logs.get_data().unwrap().to_owned();
    messy_logs.resample(&opts).unwrap();
    assert_eq!(messy_logs.get_data().unwrap(), first);
}

#[rstest]
fn normalised_columns_are_standard(mut messy_logs: Borehole) {
    messy_logs
        .resample(&ResampleOptions::new().nsamples(64).normalize(true))
        .unwrap();
    for column in messy_logs.get_data().unwrap().axis_iter(Axis(1)) {
        assert_approx_eq!(column.mean().unwrap(), 0.0, 1e-10);
        assert_approx_eq!(column.std(0.0), 1.0, 1e-10);
    }
}

#[rstest]
fn zero_variance_column_fails_normalisation() {
    let mut bh = Borehole::new();
    bh.add_datum(&[0.0, 1.0, 2.0], &[4.2, 4.2, 4.2], "flat", None).unwrap();
    let err = bh
        .resample(&ResampleOptions::new().normalize(true))
        .unwrap_err();
    assert_eq!(err, BoreholeError::UndefinedVariance { key: "flat".into() });
}

#[test]
fn masked_samples_scenario() {
    let mut bh = Borehole::new();
    bh.add_datum(&[1.0, 2.0, f64::NAN, 4.0], &[1.0, f64::NAN, 3.0, 4.0], "x", None)
        .unwrap();
    assert_eq!(bh.default_sampler_properties().nsamples, Some(2));

    let raw = bh.get_raw_data(&[]).unwrap();
    assert_eq!(raw[0].series.domain, vec![1.0, 4.0]);
    assert_eq!(raw[0].series.signal, vec![1.0, 4.0]);
}

#[test]
fn unknown_key_before_any_data() {
    let bh = Borehole::new();
    assert_eq!(
        bh.get_signal(&["missing_key"]).unwrap_err(),
        BoreholeError::KeyNotFound("missing_key".into())
    );
}

#[rstest]
#[case::no_nans(vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![true, true, true])]
#[case::nan_in_first(vec![f64::NAN, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![false, true, true])]
#[case::nan_in_second(vec![1.0, 2.0, 3.0], vec![4.0, f64::NAN, 6.0], vec![true, false, true])]
#[case::nan_in_both(vec![1.0, f64::NAN, 3.0], vec![4.0, 5.0, f64::NAN], vec![true, false, false])]
fn mask_marks_any_missing(#[case] a: Vec<f64>, #[case] b: Vec<f64>, #[case] expected: Vec<bool>) {
    assert_eq!(mask_all_nans(&[a.as_slice(), b.as_slice()]).unwrap(), expected);
}

#[test]
fn mask_rejects_mismatched_lengths() {
    let a = [1.0, 2.0];
    let b = [1.0];
    let err = mask_all_nans(&[&a[..], &b[..]]).unwrap_err();
    assert!(matches!(err, BoreholeError::ShapeMismatch { .. }));
}

#[rstest]
#[case(0.0, 1.0)]
#[case(-3.5, 2.0)]
#[case(120.0, -0.25)]
fn linear_signals_survive_resampling(#[case] slope: f64, #[case] intercept: f64) {
    let domain = [0.0, 0.15, 0.9, 1.35, 2.0, 2.05, 3.7, 4.0];
    let signal: Vec<f64> = domain.iter().map(|x| slope * x + intercept).collect();
    let sampler = Resampler::new("line", &domain, &signal).unwrap();

    let out = sampler.resample(101, (0.0, 4.0)).unwrap();
    for (x, y) in out.domain.iter().zip(&out.signal) {
        assert_approx_eq!(*y, slope * x + intercept, 1e-9);
    }
}

#[test]
fn infinite_depth_is_rejected_not_propagated() {
    let mut bh = Borehole::new();
    let err = bh
        .add_datum(&[0.0, 1.0, f64::INFINITY], &[0.0, 1.0, 2.0], "a", None)
        .unwrap_err();
    assert_eq!(err, BoreholeError::NonFinite { key: "a".into(), index: 2 });
    assert!(bh.is_empty());
    assert_eq!(bh.default_sampler_properties().domain_bounds, None);

    // Explicit infinite bounds are refused as well
    bh.add_datum(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0], "a", None).unwrap();
    let err = bh
        .resample(&ResampleOptions::new().domain_bounds(0.0, f64::INFINITY))
        .unwrap_err();
    assert!(matches!(err, BoreholeError::DomainConfig(_)));
}

#[rstest]
fn stale_matrix_is_never_served(mut two_logs: Borehole) {
    two_logs.resample(&ResampleOptions::new().nsamples(3)).unwrap();
    two_logs.add_datum(&[0.0, 3.0], &[1.0, 2.0], "C", None).unwrap();

    assert!(two_logs.get_domain().is_none());
    assert!(matches!(two_logs.get_signal(&[]), Err(BoreholeError::State(_))));

    two_logs.resample(&ResampleOptions::new().nsamples(3)).unwrap();
    assert_eq!(two_logs.get_data().unwrap().dim(), (3, 3));
    two_logs.check_columns().unwrap();
}
