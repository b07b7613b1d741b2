// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All work is delegated to Layer 2 (application).
//
//   train    — train, checkpoint, evaluate, chart
//   test     — evaluate the saved checkpoint
//   infer    — classify one test image
//   samples  — grid of random training images
//   params   — hyperparameters
//   summary  — model summary table
//   charts   — loss/accuracy charts of the last run

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InferArgs, PathArgs, TestArgs, TrainArgs};

use crate::application::{
    infer_use_case::InferUseCase,
    inspect_use_case::{print_parameters, InspectUseCase},
    test_use_case::TestUseCase,
    train_use_case::{TrainConfig, TrainUseCase},
};

#[derive(Parser, Debug)]
#[command(
    name = "cifar-vgg",
    version = "0.1.0",
    about = "Train a VGG16 classifier on CIFAR-10, then test, infer and chart it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Test(args)    => run_test(args),
            Commands::Infer(args)   => run_infer(args),
            Commands::Samples(args) => {
                let path = inspect(&args).show_samples()?;
                println!("Samples written to {}", path.display());
                Ok(())
            }
            Commands::Params(args)  => {
                print_parameters(&TrainConfig::from(args));
                Ok(())
            }
            Commands::Summary(args) => inspect(&args).show_model().map(|_| ()),
            Commands::Charts(args)  => {
                let path = inspect(&args).show_charts()?;
                println!("Charts written to {}", path.display());
                Ok(())
            }
        }
    }
}

fn inspect(paths: &PathArgs) -> InspectUseCase {
    InspectUseCase::new(&paths.data_dir, &paths.checkpoint_dir, &paths.chart_dir)
}

fn run_train(args: TrainArgs) -> Result<()> {
    tracing::info!("Starting training with data in: {}", args.paths.data_dir);

    let use_case = TrainUseCase::new(args.into());
    use_case.execute()?;

    println!("Training complete. Checkpoint saved.");
    Ok(())
}

fn run_test(args: TestArgs) -> Result<()> {
    let use_case = TestUseCase::new(
        args.paths.data_dir,
        args.paths.checkpoint_dir,
        args.batch_size,
        args.num_workers,
    );
    use_case.execute().map(|_| ())
}

fn run_infer(args: InferArgs) -> Result<()> {
    let use_case = InferUseCase::new(
        args.paths.data_dir,
        args.paths.checkpoint_dir,
        args.paths.chart_dir,
    );
    let prediction = use_case.execute(args.index)?;
    println!("\nPrediction: {}", prediction.class_name());
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::OptimizerKind;

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["cifar-vgg", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg = TrainConfig::from(args);
        assert_eq!(cfg.batch_size, 64);
        assert_eq!(cfg.test_batch_size, 32);
        assert_eq!(cfg.epochs, 50);
        assert_eq!(cfg.lr, 1e-2);
        assert_eq!(cfg.optimizer, OptimizerKind::Sgd);
        assert_eq!(cfg.data_dir, "cifar10");
        assert_eq!(cfg.checkpoint_dir, "model");
        assert_eq!(cfg.chart_dir, "chart");
    }

    #[test]
    fn test_train_overrides() {
        let cli = Cli::try_parse_from([
            "cifar-vgg", "train", "--epochs", "3", "--optimizer", "adam",
            "--lr", "0.001", "--chart-dir", "out",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg = TrainConfig::from(args);
        assert_eq!(cfg.epochs, 3);
        assert_eq!(cfg.optimizer, OptimizerKind::Adam);
        assert_eq!(cfg.lr, 0.001);
        assert_eq!(cfg.chart_dir, "out");
    }

    #[test]
    fn test_infer_requires_index() {
        assert!(Cli::try_parse_from(["cifar-vgg", "infer"]).is_err());

        let cli = Cli::try_parse_from(["cifar-vgg", "infer", "--index", "7"]).unwrap();
        let Commands::Infer(args) = cli.command else { panic!("expected infer") };
        assert_eq!(args.index, 7);
        assert_eq!(args.paths.checkpoint_dir, "model");
    }

    #[test]
    fn test_unknown_optimizer_is_rejected() {
        assert!(Cli::try_parse_from(["cifar-vgg", "train", "--optimizer", "lbfgs"]).is_err());
    }

    #[test]
    fn test_inspect_commands_share_paths() {
        for cmd in ["samples", "summary", "charts"] {
            let cli = Cli::try_parse_from(["cifar-vgg", cmd, "--data-dir", "d"]).unwrap();
            match cli.command {
                Commands::Samples(p) | Commands::Summary(p) | Commands::Charts(p) => {
                    assert_eq!(p.data_dir, "d");
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }
}
