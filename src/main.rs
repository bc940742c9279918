use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use squat_coach::{
    joints::JointAngle,
    squat::{ReferenceDetector, ThresholdDetector},
    CombineOptions, Detector, Pose, Session, SimilarityStrategy, SquatLogEntry, StateMachine,
    WeightedStrategy,
};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{sync_channel, TrySendError},
        Arc,
    },
    time::{Duration, Instant},
};
use structopt::StructOpt;
use tracing::{debug, info, trace, warn};
use tracing_subscriber::layer::SubscriberExt;

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Replay a recorded pose stream through the squat state machine
    Track(Track),
    /// Print the combined similarity of two poses
    Compare(Compare),
    /// Count valid repetitions in a saved squat log
    Reps {
        /// JSON array of log entries.
        log: PathBuf,
    },
}

#[derive(structopt::StructOpt)]
struct Track {
    /// Newline-delimited JSON poses, one per tick.
    poses: PathBuf,

    /// Period between ticks in milliseconds.
    #[structopt(short, long, default_value = "100")]
    tick_ms: u64,

    /// Keypoint score threshold.
    #[structopt(short, long, default_value = "0.3")]
    confidence: f32,

    /// Write the annotated log to this file as JSON.
    #[structopt(short, long)]
    output: Option<PathBuf>,

    #[structopt(short, long)]
    show_progress: bool,

    #[structopt(subcommand)]
    mode: Mode,
}

#[derive(structopt::StructOpt)]
enum Mode {
    /// Recognise both phases with fixed joint-angle thresholds
    Threshold,
    /// Recognise squats by similarity to a reference pose
    Reference(ReferenceOpt),
}

#[derive(structopt::StructOpt)]
struct ReferenceOpt {
    /// JSON file holding the reference squat pose.
    #[structopt(long)]
    reference: PathBuf,

    /// Minimum combined similarity that counts as squatting.
    #[structopt(long)]
    similarity_threshold: f32,

    #[structopt(flatten)]
    similarity: SimilarityOpt,
}

#[derive(structopt::StructOpt)]
struct SimilarityOpt {
    /// Strategy and weight as `name=weight`, repeatable. Defaults to the reference squat blend.
    #[structopt(long = "strategy")]
    strategies: Vec<WeightedStrategy>,

    /// Joint angles compared by the key_angles strategy.
    #[structopt(long, use_delimiter = true)]
    angles: Vec<JointAngle>,

    /// Compare raw coordinates instead of normalized ones.
    #[structopt(long)]
    no_normalize: bool,
}

impl SimilarityOpt {
    fn options(&self, confidence: f32) -> CombineOptions {
        let mut options = if self.strategies.is_empty() {
            CombineOptions::reference_squat()
        } else {
            CombineOptions {
                strategies: self.strategies.clone(),
                ..Default::default()
            }
        };
        if !self.angles.is_empty() {
            options
                .strategies
                .iter_mut()
                .filter(|entry| entry.strategy == SimilarityStrategy::KeyAngles)
                .for_each(|entry| entry.selected_angles = self.angles.clone());
        }
        options.normalize = !self.no_normalize;
        options.confidence = confidence;
        options
    }
}

#[derive(structopt::StructOpt)]
struct Compare {
    a: PathBuf,
    b: PathBuf,

    /// Keypoint score threshold.
    #[structopt(short, long, default_value = "0.3")]
    confidence: f32,

    #[structopt(flatten)]
    similarity: SimilarityOpt,
}

fn read_pose(path: &Path) -> Result<Pose> {
    let file = File::open(path).with_context(|| format!("failed to open pose file {:?}", path))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse pose from {:?}", path))
}

fn track(opt: Track) -> Result<()> {
    let detector = match &opt.mode {
        Mode::Threshold => Detector::Threshold(ThresholdDetector),
        Mode::Reference(reference) => Detector::Reference(
            ReferenceDetector::new(
                read_pose(&reference.reference)?,
                reference.similarity_threshold,
                reference.similarity.options(opt.confidence),
            )
            .context("failed constructing reference detector")?,
        ),
    };
    let mut session = Session::new(StateMachine::new(detector, opt.confidence));

    let poses = BufReader::new(
        File::open(&opt.poses)
            .with_context(|| format!("failed to open pose stream {:?}", opt.poses))?,
    );

    let running = Arc::new(AtomicBool::new(true));
    let running_ctrl_c = running.clone();

    ctrlc::set_handler(move || {
        running_ctrl_c.store(false, Ordering::SeqCst);
    })
    .context("failed setting Ctrl-C handler")?;

    let pb_feedback = if opt.show_progress {
        Some(
            ProgressBar::new_spinner().with_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("{prefix:.bold.dim} {spinner} {wide_msg}"),
            ),
        )
    } else {
        None
    };

    // room for exactly one pending pose: a tick that arrives while the previous one is
    // still being processed is dropped
    let (poses_tx, poses_rx) = sync_channel::<(usize, Pose)>(1);
    let period = Duration::from_millis(opt.tick_ms);
    let running_read = running.clone();

    crossbeam::thread::scope(|scope| -> Result<()> {
        let reader = scope.spawn(move |_| -> Result<()> {
            for (frame, line) in poses.lines().enumerate() {
                if !running_read.load(Ordering::SeqCst) {
                    break;
                }
                let tick_start = Instant::now();
                let line = line.context("failed reading pose stream")?;
                if line.trim().is_empty() {
                    continue;
                }
                let pose: Pose = serde_json::from_str(&line)
                    .with_context(|| format!("failed to parse pose on line {}", frame + 1))?;

                match poses_tx.try_send((frame, pose)) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        trace!(message = "previous tick still running, skipping pose", frame)
                    }
                    Err(TrySendError::Disconnected(_)) => break,
                }

                if let Some(rest) = period.checked_sub(tick_start.elapsed()) {
                    std::thread::sleep(rest);
                }
            }
            Ok(())
        });

        for (frame, pose) in poses_rx {
            let tick = session
                .process(&pose, || format!("frame-{}", frame))
                .with_context(|| format!("failed processing pose {}", frame))?;
            if let Some(feedback) = &tick.feedback {
                debug!(
                    message = "feedback",
                    frame,
                    is_correct = feedback.is_correct,
                    text = feedback.message.as_str()
                );
            }
            if let Some(pb_feedback) = &pb_feedback {
                pb_feedback.set_prefix(format!("{:?}", session.phase()));
                pb_feedback.set_message(session.feedback().message.clone());
                pb_feedback.inc(1);
            }
        }

        reader
            .join()
            .map_err(|_| anyhow!("pose reader thread panicked"))?
    })
    .map_err(|_| anyhow!("failed joining pose reader scope"))??;

    if let Some(pb_feedback) = &pb_feedback {
        pb_feedback.finish_and_clear();
    }

    let reps = session.validate_reps();
    info!(
        message = "session finished",
        reps,
        events = session.log().len(),
        final_phase = ?session.phase()
    );

    if let Some(output) = &opt.output {
        let file = File::create(output)
            .with_context(|| format!("failed to create log file {:?}", output))?;
        serde_json::to_writer_pretty(BufWriter::new(file), session.log())
            .context("failed writing squat log")?;
    }

    println!("{}", reps);
    Ok(())
}

fn compare(opt: Compare) -> Result<()> {
    let a = read_pose(&opt.a)?;
    let b = read_pose(&opt.b)?;
    let score = squat_coach::combine(&a, &b, &opt.similarity.options(opt.confidence))
        .context("failed computing similarity")?;
    println!("{:.8}", score);
    Ok(())
}

fn reps(path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("failed to open log {:?}", path))?;
    let mut log: Vec<SquatLogEntry> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse log from {:?}", path))?;

    if log.windows(2).any(|pair| pair[0].timestamp > pair[1].timestamp) {
        warn!(message = "log is not in timestamp order", path = ?path);
    }

    let count = squat_coach::validate_reps(&mut log);
    info!(message = "validated log", reps = count, entries = log.len());
    println!("{}", count);
    serde_json::to_writer_pretty(std::io::stdout(), &log).context("failed writing log")?;
    println!();
    Ok(())
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(opt.log_level),
    )?;

    match opt.command {
        Command::Track(track_opt) => track(track_opt),
        Command::Compare(compare_opt) => compare(compare_opt),
        Command::Reps { log } => reps(&log),
    }
}
