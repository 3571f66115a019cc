use helium_viscosity::{
    compute_deviations, compute_deviations_by_name, evaluate, model_performance, summarize,
    Correlation, Dataset, MarkerSymbol, Result, SourceSeries,
};

#[test]
fn single_measurement_round_trips_through_the_evaluator() -> Result<()> {
    let measured = 19.9;
    let series = SourceSeries::new(
        "synthetic",
        MarkerSymbol::Circle,
        vec![293.15],
        vec![30.175],
        vec![measured],
    )?;
    let data = Dataset::new("round trip", vec![series])?;

    let records = compute_deviations_by_name(&data, 293.15, "KTA_mod")?;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    let expected_model = evaluate(293.15, 30.175, "KTA_mod")?;
    assert_eq!(record.model_viscosity, expected_model);
    approx::assert_relative_eq!(
        record.relative_deviation_pct,
        100. * (expected_model - measured) / measured,
        max_relative = 1e-12
    );
    assert_eq!(record.source_label, "synthetic");
    assert_eq!(record.measured_viscosity, measured);
    Ok(())
}

#[test]
fn every_model_summarises_the_room_temperature_isotherm() -> Result<()> {
    let data = Dataset::embedded()?;

    for correlation in Correlation::ALL {
        let records = compute_deviations(&data, 293.15, correlation)?;
        assert!(!records.is_empty());

        let summary = summarize(&records)?;

        assert!(summary.mean_abs_deviation_pct.is_finite());
        assert!(summary.max_abs_deviation_pct.is_finite());
        assert!(summary.mean_abs_deviation_pct >= 0.);
        assert!(summary.max_abs_deviation_pct >= summary.mean_abs_deviation_pct);
        assert!(summary.min_pressure <= summary.max_pressure);
        assert_eq!(summary.count, records.len());
    }
    Ok(())
}

#[test]
fn performance_report_covers_each_requested_model() -> Result<()> {
    let data = Dataset::embedded()?;

    let reports = model_performance(&data, 293.15, &[Correlation::KtaTweak, Correlation::Kta])?;

    let models = reports.iter().map(|r| r.correlation).collect::<Vec<_>>();
    assert_eq!(models, vec![Correlation::KtaTweak, Correlation::Kta]);
    assert!(reports[0].to_string().starts_with("Model: KTA_tweak\n"));
    Ok(())
}
