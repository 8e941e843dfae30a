use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use multiband_deesser::dsp::MultibandDeEsser;
use multiband_deesser::presets::{DeEssSettings, FactoryPreset, PresetManager};
use std::path::{Path, PathBuf};

const DEFAULT_BLOCK: usize = 512;

const USAGE: &str =
    "usage: deess_render <input.wav> <output.wav> [--preset <name> | --settings <file.json>] [--block <n>]\n       deess_render --list-presets";

fn preset_listing() -> String {
    FactoryPreset::all()
        .iter()
        .map(|p| format!("  {:<16}{}", p.name(), p.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

struct Args {
    input: PathBuf,
    output: PathBuf,
    settings: DeEssSettings,
    block: usize,
}

/// `Ok(None)` means a listing was requested and nothing should be rendered.
fn parse_args<I>(args: I) -> Result<Option<Args>>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();
    if args.peek().map(String::as_str) == Some("--list-presets") {
        return Ok(None);
    }
    let input = args.next().map(PathBuf::from).context(USAGE)?;
    let output = args.next().map(PathBuf::from).context(USAGE)?;

    let mut settings = DeEssSettings::default();
    let mut block = DEFAULT_BLOCK;

    while let Some(flag) = args.next() {
        let value = args
            .next()
            .with_context(|| format!("missing value for '{}'\n{}", flag, USAGE))?;
        match flag.as_str() {
            "--preset" => {
                settings = PresetManager::new()
                    .get_by_name(&value)
                    .with_context(|| {
                        format!("unknown preset '{}', available:\n{}", value, preset_listing())
                    })?;
            }
            "--settings" => {
                let json = std::fs::read_to_string(&value)
                    .with_context(|| format!("failed to read settings file '{}'", value))?;
                settings = DeEssSettings::from_json(&json)
                    .with_context(|| format!("failed to parse settings file '{}'", value))?;
            }
            "--block" => {
                block = value
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| n > 0)
                    .with_context(|| format!("invalid block size '{}'", value))?;
            }
            other => bail!("unknown option '{}'\n{}", other, USAGE),
        }
    }

    Ok(Some(Args {
        input,
        output,
        settings,
        block,
    }))
}

fn read_planar(path: &Path) -> Result<(WavSpec, Vec<Vec<f32>>)> {
    let reader = WavReader::open(path)
        .with_context(|| format!("failed to open input WAV '{}'", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 || channels > 2 {
        bail!("only mono or stereo input is supported (got {} channels)", channels);
    }

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .context("failed to decode float samples")?,
        (SampleFormat::Int, bits @ (16 | 24 | 32)) => {
            let scale = 1.0 / (1u64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .context("failed to decode integer samples")?
        }
        (format, bits) => bail!("unsupported WAV format: {:?} {}-bit", format, bits),
    };

    let mut planar = vec![Vec::with_capacity(interleaved.len() / channels); channels];
    for frame in interleaved.chunks_exact(channels) {
        for (ch, &s) in planar.iter_mut().zip(frame) {
            ch.push(s);
        }
    }
    Ok((spec, planar))
}

fn peak(channels: &[Vec<f32>]) -> f32 {
    channels
        .iter()
        .flat_map(|c| c.iter())
        .fold(0.0f32, |m, s| m.max(s.abs()))
}

fn main() -> Result<()> {
    let Some(args) = parse_args(std::env::args().skip(1))? else {
        println!("Factory presets:\n{}", preset_listing());
        return Ok(());
    };
    let (spec, mut planar) = read_planar(&args.input)?;
    let input_peak = peak(&planar);

    let mut dsp = MultibandDeEsser::new();
    dsp.prepare(spec.sample_rate as f32, args.block);

    let s = args.settings;
    match planar.as_mut_slice() {
        [left, right] => {
            for (l, r) in left.chunks_mut(args.block).zip(right.chunks_mut(args.block)) {
                dsp.process(l, Some(r), s.threshold_db, &s.band_amounts, s.hf_limiter);
            }
        }
        [mono] => {
            for m in mono.chunks_mut(args.block) {
                dsp.process(m, None, s.threshold_db, &s.band_amounts, s.hf_limiter);
            }
        }
        _ => unreachable!("channel count checked on read"),
    }

    let out_spec = WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&args.output, out_spec)
        .with_context(|| format!("failed to create output WAV '{}'", args.output.display()))?;
    let frames = planar[0].len();
    for i in 0..frames {
        for ch in &planar {
            writer.write_sample(ch[i])?;
        }
    }
    writer.finalize().context("failed to finalize output WAV")?;

    println!("Rendered '{}' -> '{}':", args.input.display(), args.output.display());
    println!("  frames       : {}", frames);
    println!("  threshold    : {:.1} dB", s.threshold_db);
    println!("  band amounts : {:?}", s.band_amounts);
    println!("  hf limiter   : {}", s.hf_limiter);
    println!("  input peak   : {:.4}", input_peak);
    println!("  output peak  : {:.4}", peak(&planar));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_listing_names_every_preset() {
        let listing = preset_listing();
        for preset in FactoryPreset::all() {
            assert!(listing.contains(preset.name()));
            assert!(listing.contains(preset.description()));
        }
        assert!(parse_args(args(&["--list-presets"])).unwrap().is_none());
    }

    #[test]
    fn test_unknown_preset_error_lists_presets() {
        let err = parse_args(args(&["in.wav", "out.wav", "--preset", "Nope"]))
            .err()
            .unwrap();
        let msg = format!("{:#}", err);
        assert!(msg.contains("unknown preset 'Nope'"));
        assert!(msg.contains("Vocal Presence"));
    }

    #[test]
    fn test_read_planar_deinterleaves_int16() {
        let path = std::env::temp_dir().join(format!("deess_render_{}.wav", std::process::id()));
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for (l, r) in [(16384i16, -16384i16), (0, 8192)] {
            writer.write_sample(l).unwrap();
            writer.write_sample(r).unwrap();
        }
        writer.finalize().unwrap();

        let (read_spec, planar) = read_planar(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(read_spec.sample_rate, 44100);
        assert_eq!(planar, vec![vec![0.5, 0.0], vec![-0.5, 0.25]]);
    }
}
