use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_DATA: &str = "coco.yaml";
pub const DEFAULT_EPOCHS: i64 = 300;
pub const DEFAULT_BATCH: i32 = 128;
pub const DEFAULT_COPY_PASTE: f64 = 0.1;
pub const DEFAULT_IMGSZ: i64 = 640;
pub const DEFAULT_DEVICE: &str = "0";
pub const DEFAULT_PROJECT: &str = "runs/detect";
pub const DEFAULT_NAME: &str = "exp";
pub const DEFAULT_YOLO_BIN: &str = "yolo";

#[derive(Debug, Parser)]
#[command(
    name = "detrun",
    about = "Train or validate an object-detection model through the Ultralytics YOLO entry points",
    after_help = "Examples:\n  detrun --val --model yolo11n.pt --data coco.yaml\n  detrun --train --model yolo11.yaml --data coco.yaml --epochs 600 --batch 128",
    version
)]
pub struct Cli {
    #[arg(long, help = "Run the model in training mode.")]
    pub train: bool,

    #[arg(long, help = "Run the model in validation mode.")]
    pub val: bool,

    #[arg(
        long,
        env = "DETRUN_MODEL",
        help = "Path to the model: .pt checkpoint or .yaml definition, or any exported format for validation, e.g. \"yolo11n.pt\"."
    )]
    pub model: PathBuf,

    #[arg(
        long,
        env = "DETRUN_DATA",
        default_value = DEFAULT_DATA,
        help = "Path to the dataset YAML descriptor."
    )]
    pub data: String,

    #[arg(
        long,
        env = "DETRUN_EPOCHS",
        default_value_t = DEFAULT_EPOCHS,
        allow_negative_numbers = true,
        help = "Number of training epochs."
    )]
    pub epochs: i64,

    #[arg(
        long,
        env = "DETRUN_BATCH",
        default_value_t = DEFAULT_BATCH,
        allow_negative_numbers = true,
        help = "Batch size for training. Use -1 for auto-batch."
    )]
    pub batch: i32,

    #[arg(
        long = "copy_paste",
        alias = "copy-paste",
        env = "DETRUN_COPY_PASTE",
        default_value_t = DEFAULT_COPY_PASTE,
        allow_negative_numbers = true,
        help = "Copy-paste augmentation factor for training."
    )]
    pub copy_paste: f64,

    #[arg(
        long,
        env = "DETRUN_IMGSZ",
        default_value_t = DEFAULT_IMGSZ,
        allow_negative_numbers = true,
        help = "Image size for training and validation."
    )]
    pub imgsz: i64,

    #[arg(
        long,
        env = "DETRUN_DEVICE",
        default_value = DEFAULT_DEVICE,
        help = "Device to run on, e.g. \"cpu\", \"0\" for GPU 0, or \"mps\" for Apple Silicon."
    )]
    pub device: String,

    #[arg(
        long,
        env = "DETRUN_PROJECT",
        default_value = DEFAULT_PROJECT,
        help = "Directory to save results."
    )]
    pub project: PathBuf,

    #[arg(
        long,
        env = "DETRUN_NAME",
        default_value = DEFAULT_NAME,
        help = "Name prefix of the experiment run; suffixed with _train or _val."
    )]
    pub name: String,

    #[arg(
        long = "yolo-bin",
        env = "DETRUN_YOLO_BIN",
        default_value = DEFAULT_YOLO_BIN,
        help = "Ultralytics command-line executable used to run training and validation."
    )]
    pub yolo_bin: String,
}
