use resume_salary::metrics::{mean_absolute_error, r2_score};
use resume_salary::{Dataset, ImputeStrategy, Pipeline, RidgeRegressor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Résumé Salary Example ===\n");

    let workdir = tempfile::tempdir()?;
    let csv = workdir.path().join("hh.csv");
    std::fs::write(
        &csv,
        "\
,level,city,years,salary
0,junior,Moscow,1,50000
1,junior,Moscow,1,50000
2,senior,Kazan,5,150000
3,middle,Moscow,,100000
4,junior,Kazan,2,60000
5,middle,Omsk,3,95000
6,senior,Moscow,7,180000
7,middle,,4,
",
    )?;

    // Prepare the table
    let pipeline = Pipeline::with_strategy(workdir.path(), ImputeStrategy::Mean);
    println!("Stages: {}", pipeline.stage_names().join(" -> "));

    let (dataset, events) = pipeline.process(&csv)?;
    for record in events.records() {
        println!("  [{}] {}", record.stage, record.event);
    }

    // Fit on the persisted arrays, as a separate training run would
    let dataset_on_disk = Dataset::load(workdir.path())?;
    assert_eq!(dataset_on_disk, dataset);

    println!("\nAlpha      R²        MAE");
    println!("{}", "-".repeat(30));
    for alpha in [0.0, 0.1, 1.0, 10.0] {
        let mut model = RidgeRegressor::new().alpha(alpha);
        model.fit(&dataset.features, &dataset.targets)?;
        let predictions = model.predict(&dataset.features)?;
        println!(
            "{:<10} {:<9.4} {:.2}",
            alpha,
            r2_score(&dataset.targets, &predictions)?,
            mean_absolute_error(&dataset.targets, &predictions)?
        );
    }

    // Persist and restore
    let mut model = RidgeRegressor::new().alpha(1.0);
    model.fit(&dataset.features, &dataset.targets)?;
    let model_path = workdir.path().join("model.npz");
    model.save(&model_path)?;

    let mut restored = RidgeRegressor::new();
    restored.load(&model_path)?;
    let predictions = restored.predict(&dataset.features)?;

    println!("\nPredictions vs Actual:");
    for (i, (pred, actual)) in predictions.iter().zip(dataset.targets.iter()).enumerate() {
        println!("Sample {}: Predicted={:.0}, Actual={:.0}", i + 1, pred, actual);
    }

    Ok(())
}
