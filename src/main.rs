//! aym-render: render a CSV register dump to a WAV file

use std::env;
use std::fs;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context};
use aym::config::{ChipConfig, ChipType, Interpolation, LayoutType};
use aym::dump::load_dump;
use aym::sound::{MatrixMixer, WavSink};
use aym::create_chip;

const USAGE: &str = "\
Usage:
  aym-render [options] <dump.csv> <out.wav>

Options:
  --ym                 YM2149 volume table (default AY-3-8910)
  --layout <n>         0 ABC, 1 ACB, 2 BAC, 3 BCA, 4 CBA, 5 CAB, 6 mono
  --interpolation <n>  0 none, 1 averaging, 2 low-pass
  --clock <hz>         Chip clock (default 1773400)
  --rate <hz>          Output sample rate (default 44100)
  --config <file>      JSON chip configuration, flags override it
  -h, --help           Show this help
";

#[derive(Default)]
struct Options {
    config_file: Option<String>,
    ym: bool,
    layout: Option<i64>,
    interpolation: Option<i64>,
    clock: Option<u64>,
    rate: Option<u32>,
    files: Vec<String>,
    help: bool,
}

fn value<T: std::str::FromStr>(flag: &str, arg: Option<String>) -> anyhow::Result<T> {
    let arg = arg.ok_or_else(|| anyhow!("{} requires an argument", flag))?;
    arg.parse()
        .map_err(|_| anyhow!("invalid value for {}: {}", flag, arg))
}

fn parse_args() -> anyhow::Result<Options> {
    let mut opts = Options::default();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ym" => opts.ym = true,
            "--layout" => opts.layout = Some(value(&arg, args.next())?),
            "--interpolation" => opts.interpolation = Some(value(&arg, args.next())?),
            "--clock" => opts.clock = Some(value(&arg, args.next())?),
            "--rate" => opts.rate = Some(value(&arg, args.next())?),
            "--config" => opts.config_file = Some(value(&arg, args.next())?),
            "--help" | "-h" => opts.help = true,
            _ if arg.starts_with('-') => bail!("unknown flag: {}", arg),
            _ => opts.files.push(arg),
        }
    }
    Ok(opts)
}

fn chip_config(opts: &Options) -> anyhow::Result<ChipConfig> {
    let mut config = match &opts.config_file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config '{}'", path))?;
            ChipConfig::from_json(&text).with_context(|| format!("bad config '{}'", path))?
        }
        None => ChipConfig::default(),
    };
    if opts.ym {
        config.chip_type = ChipType::Ym;
    }
    if let Some(code) = opts.layout {
        config.layout = LayoutType::try_from(code)?;
    }
    if let Some(code) = opts.interpolation {
        config.interpolation = Interpolation::try_from(code)?;
    }
    if let Some(clock) = opts.clock {
        config.clock_freq = clock;
    }
    if let Some(rate) = opts.rate {
        config.sound_freq = rate;
    }
    config.validate()?;
    Ok(config)
}

fn run() -> anyhow::Result<()> {
    let opts = parse_args()?;
    if opts.help || opts.files.len() != 2 {
        eprint!("{}", USAGE);
        if opts.help {
            return Ok(());
        }
        bail!("expected an input dump and an output file");
    }
    let (input, output) = (&opts.files[0], &opts.files[1]);
    let config = chip_config(&opts)?;
    log::info!("Chip config: {:?}", config);

    let chunks = load_dump(input).with_context(|| format!("failed to load '{}'", input))?;
    let sink = WavSink::create(output, config.sound_freq)
        .with_context(|| format!("failed to create '{}'", output))?;
    let mut chip = create_chip(config, MatrixMixer::default(), sink);
    for chunk in chunks {
        chip.render_data(chunk);
        chip.flush();
    }

    let sink = chip.into_target();
    let frames = sink.samples_written();
    sink.finalize()
        .with_context(|| format!("failed to write '{}'", output))?;
    println!(
        "Wrote {} samples ({:.2} s) to {}",
        frames,
        frames as f64 / f64::from(config.sound_freq),
        output
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
