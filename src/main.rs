// Docopt
#[macro_use]
extern crate serde_derive;
use docopt::Docopt;

// General dependencies
use std::convert::TryFrom;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};

// Local dependencies
use frame_encoder::remap::wav_to_a52_hook;
use frame_encoder::wav::WavReader;
use frame_encoder::{Codec, CodecSession, EncoderConfig, FrameEncoder, Frames, InterruptibleReader, SampleRate};

const USAGE: &str = "
Usage:
    frame_encoder [options] <input> <output>
    frame_encoder (-h | --help)

Options:
    -c CODEC      Output codec, alac or pcm [default: alac]
    -f FRAMES     Frames per packet, 0 uses the codec default [default: 0]
    -d LEVEL      Debug level (0 = silent, 5 = trace) [default: 2]
    -r RATE       Sample rate of raw input [default: 48000]
    -n CHANNELS   Channel count of raw input [default: 2]
    --raw         Input is headerless little-endian 32-bit float
    --no-remap    Keep WAVE channel order instead of A/52 order
    -h, --help    Print this help and exit

Use - as <input> or <output> for stdin and stdout.
";

#[derive(Deserialize)]
struct Args {
    arg_input: String,
    arg_output: String,
    flag_c: String,
    flag_f: u64,
    flag_d: usize,
    flag_r: u32,
    flag_n: u8,
    flag_raw: bool,
    flag_no_remap: bool,
    flag_help: bool,
}

fn open_input(name: &str) -> io::Result<Box<dyn Read>> {
    if name == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        Ok(Box::new(BufReader::new(File::open(name)?)))
    }
}

fn open_output(name: &str) -> io::Result<Box<dyn Write>> {
    if name == "-" {
        Ok(Box::new(BufWriter::new(io::stdout())))
    } else {
        Ok(Box::new(BufWriter::new(File::create(name)?)))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    stderrlog::new().verbosity(args.flag_d).timestamp(stderrlog::Timestamp::Microsecond).color(stderrlog::ColorChoice::Never).init()?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_running = running.clone();
    ctrlc::set_handler(move || {
        warn!("interrupted, finishing stream");
        handler_running.store(false, Ordering::SeqCst);
    })?;

    let codec = args.flag_c.parse::<Codec>()?;
    let mut input = InterruptibleReader::new(open_input(&args.arg_input)?, running);
    let mut output = open_output(&args.arg_output)?;

    let mut config = EncoderConfig::default();
    if args.flag_f > 0 {
        config.set_frames_per_packet(Frames::new(args.flag_f));
    }

    let mut encoder;

    if args.flag_raw {
        config.channels = args.flag_n;
        config.sample_rate = SampleRate::try_from(args.flag_r)?;

        encoder = FrameEncoder::new(&codec, config)?;
        input.set_frame_bytes(encoder.channels() * 4);
        encoder.encode_reader(&mut input, &mut output)?;
    } else {
        let mut wav = WavReader::new(input)?;
        let block_align = wav.block_align();
        wav.get_mut().set_frame_bytes(block_align);
        config.channels = u8::try_from(wav.channels())?;
        config.sample_rate = SampleRate::try_from(wav.sample_rate())?;
        config.set_channel_mask(wav.channel_mask());

        encoder = FrameEncoder::new(&codec, config)?;
        if !args.flag_no_remap {
            encoder.set_remap(wav_to_a52_hook());
        }

        let total = wav.frames();
        let mut samples = vec![0.0f32; encoder.quantum()];
        let mut reported = Frames::default();

        loop {
            let frames = wav.read_frames(&mut samples)?;
            if frames == 0 {
                break;
            }
            encoder.encode(&samples[..Frames::new(frames as u64).as_samples(encoder.channels())], &mut output)?;

            let done = encoder.frames_in();
            if u64::from(done - reported) >= u64::from(encoder.config().sample_rate) * 10 {
                reported = done;
                match total {
                    Some(total) if !total.is_zero() => info!("progress: {}%", u64::from(done) * 100 / u64::from(total)),
                    _ => info!("progress: {:.1} s", (done / encoder.config().sample_rate).as_secs_f32()),
                }
            }
        }

        encoder.flush(&mut output)?;
    }

    output.flush()?;

    let duration = encoder.frames_in() / encoder.config().sample_rate;
    let kbps = if duration.as_secs_f64() > 0.0 { encoder.bytes_written() as f64 * 8.0 / duration.as_secs_f64() / 1000.0 } else { 0.0 };
    let packet = encoder.session().map(|session| session.samples_per_frame()).unwrap_or_default();
    info!(
        "encoded {:.3} s of audio into {} {} frames of {} samples, {} bytes, average bitrate {:.1} kbps",
        duration.as_secs_f64(),
        encoder.frames_emitted(),
        codec,
        packet,
        encoder.bytes_written(),
        kbps
    );

    encoder.close();

    Ok(())
}
