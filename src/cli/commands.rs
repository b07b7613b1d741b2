// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Subcommands and their flags. Every command shares the same
// three directories (PathArgs), flattened into its own args.

use clap::{Args, Subcommand};

use crate::application::train_use_case::{OptimizerKind, TrainConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train VGG16 on CIFAR-10, save the checkpoint, report test accuracy
    Train(TrainArgs),

    /// Evaluate the saved checkpoint on the test split
    Test(TestArgs),

    /// Classify one test image and chart its class probabilities
    Infer(InferArgs),

    /// Write a 3x3 grid of random training images
    Samples(PathArgs),

    /// Print the training hyperparameters
    Params(TrainArgs),

    /// Print the layer-by-layer model summary
    Summary(PathArgs),

    /// Render loss and accuracy charts from the last training run
    Charts(PathArgs),
}

/// Directories used by every command.
#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// Where CIFAR-10 is (or will be downloaded to)
    #[arg(long, default_value = "cifar10")]
    pub data_dir: String,

    /// Where the model checkpoint is saved
    #[arg(long, default_value = "model")]
    pub checkpoint_dir: String,

    /// Where metrics.csv and the PNG charts are written
    #[arg(long, default_value = "chart")]
    pub chart_dir: String,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Training images per batch
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Test images per batch
    #[arg(long, default_value_t = 32)]
    pub test_batch_size: usize,

    /// Full passes over the training split
    #[arg(long, default_value_t = 50)]
    pub epochs: usize,

    #[arg(long, default_value_t = 1e-2)]
    pub lr: f64,

    /// sgd or adam
    #[arg(long, default_value_t = OptimizerKind::Sgd)]
    pub optimizer: OptimizerKind,

    /// Dropout probability in the classifier head
    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// Data-loader worker threads
    #[arg(long, default_value_t = 2)]
    pub num_workers: usize,

    /// Shuffle seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:        a.paths.data_dir,
            checkpoint_dir:  a.paths.checkpoint_dir,
            chart_dir:       a.paths.chart_dir,
            batch_size:      a.batch_size,
            test_batch_size: a.test_batch_size,
            epochs:          a.epochs,
            lr:              a.lr,
            optimizer:       a.optimizer,
            dropout:         a.dropout,
            num_workers:     a.num_workers,
            seed:            a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct TestArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 2)]
    pub num_workers: usize,
}

#[derive(Args, Debug)]
pub struct InferArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Index into the test split
    #[arg(long)]
    pub index: usize,
}
