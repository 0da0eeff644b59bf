use std::{
    fs,
    io::{self, BufRead, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use furiganify::{Furiganizer, MecabAnalyzer, MecabConfig};
use glob::glob;
use indicatif::ProgressStyle;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{info, info_span};
use tracing_indicatif::{IndicatifLayer, span_ext::IndicatifSpanExt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add readings to every line of the inputs, or of stdin when none are given.
    Annotate(AnnotateArgs),
    /// Merge a markup field with a reading string computed from its plain text.
    Merge {
        /// Field text, may contain HTML tags and entities.
        #[arg(long)]
        markup: String,

        /// Readings in bracket notation, e.g. '林檎[りんご]を 食[た]べた'.
        #[arg(long)]
        reading: String,
    },
}

#[derive(Args)]
struct AnnotateArgs {
    /// Input paths or glob patterns (can be repeated), e.g. 'notes/*.txt' or 'deck.txt'
    inputs: Vec<String>,

    /// Output directory, required when inputs are given
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// mecab executable (defaults to $FURIGANIFY_MECAB, then `mecab` on PATH)
    #[arg(long)]
    mecab: Option<PathBuf>,

    /// mecab dictionary directory (UTF-8)
    #[arg(long)]
    dicdir: Option<PathBuf>,

    /// mecab resource file
    #[arg(long)]
    rcfile: Option<PathBuf>,
}

impl AnnotateArgs {
    fn mecab_config(&self) -> MecabConfig {
        let mut config = MecabConfig::default();

        if let Some(program) = &self.mecab {
            config = config.with_program(program);
        }
        if let Some(dicdir) = &self.dicdir {
            config = config.with_dictionary_dir(dicdir);
        }
        if let Some(rcfile) = &self.rcfile {
            config = config.with_rc_file(rcfile);
        }

        config
    }
}

fn main() -> Result<()> {
    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "furiganify=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Annotate(args) => annotate(&args),
        Command::Merge { markup, reading } => {
            let merged = furiganify::merge_markup_readings(&markup, &reading)
                .context("Failed to merge readings into markup")?;
            println!("{merged}");

            Ok(())
        }
    }
}

fn annotate(args: &AnnotateArgs) -> Result<()> {
    let config = args.mecab_config();

    if args.inputs.is_empty() {
        return annotate_stdin(config);
    }

    let out_dir = args
        .out_dir
        .as_ref()
        .context("--out-dir is required when inputs are given")?;

    let input_paths = expand_inputs(&args.inputs)?;
    if input_paths.is_empty() {
        bail!("No input files found");
    }

    if !out_dir.exists() {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create out-dir: {out_dir:?}"))?;
    }

    info!(
        "Processing {} inputs -> {:?}...",
        input_paths.len(),
        out_dir
    );

    let inputs_span = info_span!("annotate_inputs");
    inputs_span.pb_set_style(
        &ProgressStyle::with_template(
            "{msg} [{wide_bar:.cyan/blue}] {pos}/{len} [{elapsed_precise}]",
        )
        .map_err(|e| anyhow!("Invalid progress template: {e}"))?,
    );
    inputs_span.pb_set_length(input_paths.len() as u64);
    inputs_span.pb_set_message("Annotating inputs");

    let inputs_span_enter = inputs_span.enter();

    // one mecab process per worker thread
    input_paths.par_iter().try_for_each_init(
        || Furiganizer::new(MecabAnalyzer::new(config.clone())),
        |furiganizer, in_path| -> Result<()> {
            let file_name = in_path.file_name().context("Invalid file name")?;
            let out_path = out_dir.join(file_name);

            annotate_file(furiganizer, in_path, &out_path)?;
            inputs_span.pb_inc(1);

            Ok(())
        },
    )?;

    drop(inputs_span_enter);
    drop(inputs_span);

    info!("Done processing inputs.");

    Ok(())
}

fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut input_paths: FxHashSet<PathBuf> = FxHashSet::default();

    for pattern in patterns {
        let entries =
            glob(pattern).with_context(|| format!("Failed to expand glob pattern: {pattern:?}"))?;

        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => {
                    input_paths.insert(path);
                }
                _ => {}
            }
        }
    }

    let mut input_paths: Vec<PathBuf> = input_paths.into_iter().collect();
    input_paths.sort();

    Ok(input_paths)
}

fn annotate_file(
    furiganizer: &mut Furiganizer<MecabAnalyzer>,
    in_path: &Path,
    out_path: &Path,
) -> Result<()> {
    let source = fs::read_to_string(in_path)
        .with_context(|| format!("Failed to read input file: {in_path:?}"))?;

    let mut annotated = String::with_capacity(source.len() * 2);
    for line in source.lines() {
        let furigana = furiganizer
            .reading(line)
            .with_context(|| format!("Failed to annotate {in_path:?}"))?;

        annotated.push_str(&furigana.text);
        annotated.push('\n');
    }

    fs::write(out_path, annotated)
        .with_context(|| format!("Failed to write output file: {out_path:?}"))?;

    info!("Wrote {:?}", out_path);

    Ok(())
}

fn annotate_stdin(config: MecabConfig) -> Result<()> {
    let mut furiganizer = Furiganizer::new(MecabAnalyzer::new(config));

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let furigana = furiganizer.reading(&line)?;

        writeln!(out, "{}", furigana.text).context("Failed to write stdout")?;
    }

    out.flush().context("Failed to flush stdout")?;

    Ok(())
}
