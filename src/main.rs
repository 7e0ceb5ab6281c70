mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_salary::dataset::read_matrix;
use resume_salary::metrics::mean_squared_error;
use resume_salary::{Dataset, Error, ImputeStrategy, Pipeline, RidgeRegressor, Vector};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "resume-salary")]
#[command(about = "Prepare résumé tables and fit a ridge salary model", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean, encode and split a résumé table into x_data.npy / y_data.npy
    Pipeline {
        /// Delimited input file with a header row; the last column is the target
        csv: PathBuf,

        /// Output directory (defaults to the input file's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Missing value handling (drop, mean, median, mode)
        #[arg(short, long, default_value = "drop")]
        strategy: ImputeStrategy,
    },

    /// Fit a ridge model on persisted arrays and save it
    Train {
        /// Directory holding x_data.npy and y_data.npy
        #[arg(required_unless_present_all = ["x", "y"], conflicts_with_all = ["x", "y"])]
        data_dir: Option<PathBuf>,

        /// Feature matrix file
        #[arg(long, requires = "y")]
        x: Option<PathBuf>,

        /// Target vector file
        #[arg(long, requires = "x")]
        y: Option<PathBuf>,

        /// Regularization strength
        #[arg(short, long, default_value = "1.0", value_parser = parse_alpha)]
        alpha: f64,

        /// Fit without an intercept term
        #[arg(long)]
        no_intercept: bool,

        /// Where to write the model (defaults to <resources>/model.npz)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Predict salaries for a feature matrix, printing a JSON array
    Predict {
        /// Feature matrix file
        x: PathBuf,

        /// Model file (defaults to <resources>/model.npz)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
}

fn parse_alpha(s: &str) -> std::result::Result<f64, String> {
    let alpha: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if alpha < 0.0 || alpha.is_nan() {
        return Err(format!("alpha must be non-negative, got {s}"));
    }
    Ok(alpha)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Pipeline {
            csv,
            output_dir,
            strategy,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| parent_dir(&csv));
            run_pipeline(&csv, &output_dir, strategy)
        }
        Command::Train {
            data_dir,
            x,
            y,
            alpha,
            no_intercept,
            model,
        } => {
            let dataset = match (data_dir, x, y) {
                (Some(dir), _, _) => Dataset::load(&dir)
                    .with_context(|| format!("loading arrays from {}", dir.display()))?,
                (None, Some(x), Some(y)) => Dataset::load_from(&x, &y)
                    .with_context(|| format!("loading {} and {}", x.display(), y.display()))?,
                _ => anyhow::bail!("either DATA_DIR or both --x and --y are required"),
            };
            let model = model.unwrap_or_else(|| config.default_model_path());
            train(&dataset, alpha, !no_intercept, &model)
        }
        Command::Predict { x, model } => {
            let model = model.unwrap_or_else(|| config.default_model_path());
            predict(&x, &model)
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn run_pipeline(csv: &Path, output_dir: &Path, strategy: ImputeStrategy) -> Result<()> {
    info!("Running pipeline on {} (strategy: {})", csv.display(), strategy);

    let pipeline = Pipeline::with_strategy(output_dir, strategy);
    let (dataset, events) = pipeline
        .process(csv)
        .with_context(|| format!("processing {}", csv.display()))?;

    for record in events.records() {
        info!(stage = record.stage, "{}", record.event);
    }
    info!(
        "Prepared {} samples with {} features",
        dataset.n_samples(),
        dataset.n_features()
    );

    println!("{}", output_dir.join(resume_salary::dataset::X_DATA_FILE).display());
    println!("{}", output_dir.join(resume_salary::dataset::Y_DATA_FILE).display());
    Ok(())
}

fn train(dataset: &Dataset, alpha: f64, fit_intercept: bool, model_path: &Path) -> Result<()> {
    info!(
        "Fitting ridge regression on {} samples, {} features (alpha = {}, intercept = {})",
        dataset.n_samples(),
        dataset.n_features(),
        alpha,
        fit_intercept
    );

    let mut model = RidgeRegressor::new().alpha(alpha).fit_intercept(fit_intercept);
    model.fit(&dataset.features, &dataset.targets)?;

    let predictions = model.predict(&dataset.features)?;
    let r2 = model.score(&dataset.features, &dataset.targets)?;
    let mse = mean_squared_error(&dataset.targets, &predictions)?;
    info!("In-sample R² score: {:.4}", r2);
    info!("In-sample MSE: {:.4}", mse);

    model
        .save(model_path)
        .with_context(|| format!("saving model to {}", model_path.display()))?;
    info!("Model saved to {}", model_path.display());
    Ok(())
}

fn predict(x_path: &Path, model_path: &Path) -> Result<()> {
    let features = read_matrix(x_path)?;

    let mut model = RidgeRegressor::new();
    model.load(model_path)?;
    let predictions = model.predict(&features)?;
    info!("Predicted {} salaries", predictions.len());

    println!("{}", predictions_json(&predictions)?);
    Ok(())
}

/// The stdout payload of `predict`: a flat JSON array of numbers.
fn predictions_json(predictions: &Vector) -> Result<String> {
    Ok(serde_json::to_string(&predictions.to_vec())?)
}

/// Exit status for a failed command, taken from the first library error in the chain.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map(Error::exit_code)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_train_accepts_either_input_form() {
        let cli = Cli::try_parse_from(["resume-salary", "train", "resources"]).unwrap();
        assert!(matches!(cli.command, Command::Train { data_dir: Some(_), .. }));

        let cli = Cli::try_parse_from([
            "resume-salary",
            "train",
            "--x",
            "x.npy",
            "--y",
            "y.npy",
            "--alpha",
            "0.5",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Train { x: Some(_), y: Some(_), .. }));

        assert!(Cli::try_parse_from(["resume-salary", "train"]).is_err());
        assert!(Cli::try_parse_from(["resume-salary", "train", "--x", "x.npy"]).is_err());
        assert!(Cli::try_parse_from(["resume-salary", "train", "dir", "--alpha", "-1"]).is_err());
    }

    #[test]
    fn test_strategy_flag() {
        let cli =
            Cli::try_parse_from(["resume-salary", "pipeline", "hh.csv", "--strategy", "median"])
                .unwrap();
        match cli.command {
            Command::Pipeline { strategy, output_dir, .. } => {
                assert_eq!(strategy, ImputeStrategy::Median);
                assert!(output_dir.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("hh.csv")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("data/hh.csv")), PathBuf::from("data"));
    }

    #[test]
    fn test_exit_code_survives_context() {
        let err = anyhow::Error::new(Error::ModelNotFitted).context("saving model");
        assert_eq!(exit_code(&err), 5);

        let err = anyhow::Error::new(Error::ModelFileMissing(PathBuf::from("model.npz")))
            .context("loading model")
            .context("predict");
        assert_eq!(exit_code(&err), 6);

        assert_eq!(exit_code(&anyhow::anyhow!("bad flag combination")), 1);
    }

    #[test]
    fn test_predictions_json() {
        use ndarray::array;

        let json = predictions_json(&array![52000.5, 148000.0, -3.25]).unwrap();
        assert_eq!(json, "[52000.5,148000.0,-3.25]");
        assert!(!json.contains('\n'));

        let parsed: Vec<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![52000.5, 148000.0, -3.25]);

        assert_eq!(predictions_json(&Vector::zeros(0)).unwrap(), "[]");
    }

    #[test]
    fn test_predict_reports_library_errors() {
        let dir = tempfile::tempdir().unwrap();
        let x_path = dir.path().join("x.npy");
        ndarray_npy::write_npy(&x_path, &ndarray::array![[1.0, 2.0]]).unwrap();

        let err = predict(&x_path, &dir.path().join("model.npz")).unwrap_err();
        assert_eq!(exit_code(&err), 6);

        let err = predict(&dir.path().join("absent.npy"), &dir.path().join("model.npz")).unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }
}
