use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::compile::Compiled;
use crate::error::{NeonError, NeonResult};

/// Fallback canvas duration when the input cannot be probed.
pub const DEFAULT_DURATION: f64 = 30.0;

const STDERR_TAIL_CHARS: usize = 500;

/// Output encode settings handed to the engine alongside the descriptor.
#[derive(Debug, Clone)]
pub struct EncodeConfig {
    pub preset: String,
    pub crf: u8,
    pub audio_bitrate: String,
    pub faststart: bool,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            preset: "fast".to_owned(),
            crf: 23,
            audio_bitrate: "128k".to_owned(),
            faststart: true,
        }
    }
}

/// Assemble the full engine argument vector for one render. Pure; exercised
/// directly by tests and by `--dry-run`.
pub fn engine_args(
    input: &Path,
    output: &Path,
    compiled: &Compiled,
    config: &EncodeConfig,
) -> Vec<String> {
    let mut args = vec![
        "-hide_banner".to_owned(),
        "-loglevel".to_owned(),
        "error".to_owned(),
        "-y".to_owned(),
        "-i".to_owned(),
        input.to_string_lossy().into_owned(),
        "-filter_complex".to_owned(),
        compiled.descriptor.clone(),
        "-map".to_owned(),
        format!("[{}]", compiled.video_label),
        "-map".to_owned(),
        audio_map(&compiled.audio_label),
        "-c:v".to_owned(),
        "libx264".to_owned(),
        "-preset".to_owned(),
        config.preset.clone(),
        "-crf".to_owned(),
        config.crf.to_string(),
        "-c:a".to_owned(),
        "aac".to_owned(),
        "-b:a".to_owned(),
        config.audio_bitrate.clone(),
    ];
    if config.faststart {
        args.push("-movflags".to_owned());
        args.push("+faststart".to_owned());
    }
    args.push(output.to_string_lossy().into_owned());
    args
}

// Raw stream specifiers map optionally so silent inputs still encode; filter
// pads map bracketed.
fn audio_map(label: &str) -> String {
    if label.contains(':') {
        format!("{label}?")
    } else {
        format!("[{label}]")
    }
}

/// Run the engine over `input`, burning the compiled caption into `output`.
/// Failure carries the exit status and a bounded stderr tail; it is never
/// retried here.
pub fn run(input: &Path, output: &Path, compiled: &Compiled, config: &EncodeConfig) -> NeonResult<()> {
    let binary = ffmpeg_binary()?;
    let args = engine_args(input, output, compiled, config);
    let result = Command::new(&binary).args(&args).output().map_err(|error| {
        if error.kind() == ErrorKind::NotFound {
            NeonError::config(format!(
                "ffmpeg executable not found at '{}'. Install ffmpeg, or build with `--features sidecar_ffmpeg` for a managed binary.",
                binary.display()
            ))
        } else {
            NeonError::Io(error)
        }
    })?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(NeonError::Engine {
            status: result.status,
            stderr_tail: last_n_chars(&stderr, STDERR_TAIL_CHARS),
        });
    }
    Ok(())
}

/// Probe the input's container duration in seconds via ffprobe. Callers treat
/// failure as non-fatal and fall back to [`DEFAULT_DURATION`].
pub fn probe_duration(input: &Path) -> NeonResult<f64> {
    let result = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input)
        .output()
        .map_err(|error| {
            if error.kind() == ErrorKind::NotFound {
                NeonError::config("ffprobe executable not found".to_owned())
            } else {
                NeonError::Io(error)
            }
        })?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(NeonError::Engine {
            status: result.status,
            stderr_tail: last_n_chars(&stderr, STDERR_TAIL_CHARS),
        });
    }

    let stdout = String::from_utf8_lossy(&result.stdout);
    parse_duration(&stdout).ok_or_else(|| {
        NeonError::config(format!("unparseable ffprobe duration: '{}'", stdout.trim()))
    })
}

fn parse_duration(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Shell-ish rendering of the engine invocation for `--dry-run` output.
pub fn command_line(args: &[String]) -> String {
    let mut out = String::from("ffmpeg");
    for arg in args {
        out.push(' ');
        if arg.contains([' ', ';', '\'', '\n']) {
            out.push('"');
            out.push_str(&arg.replace('"', "\\\""));
            out.push('"');
        } else {
            out.push_str(arg);
        }
    }
    out
}

#[cfg(feature = "sidecar_ffmpeg")]
fn ffmpeg_binary() -> NeonResult<PathBuf> {
    let path = ffmpeg_sidecar::paths::ffmpeg_path();
    if !path.exists() {
        ffmpeg_sidecar::download::auto_download()
            .map_err(|error| NeonError::config(format!("ffmpeg sidecar download failed: {error}")))?;
    }
    Ok(path)
}

#[cfg(not(feature = "sidecar_ffmpeg"))]
fn ffmpeg_binary() -> NeonResult<PathBuf> {
    Ok(PathBuf::from("ffmpeg"))
}

fn last_n_chars(text: &str, max_chars: usize) -> String {
    let chars = text.chars().collect::<Vec<_>>();
    let start = chars.len().saturating_sub(max_chars);
    chars[start..].iter().collect::<String>().trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::{audio_map, command_line, engine_args, last_n_chars, parse_duration, EncodeConfig};
    use crate::compile::Compiled;
    use std::path::Path;

    fn compiled() -> Compiled {
        Compiled {
            descriptor: "[0:v]crop=w=2:h=2[out]".to_owned(),
            video_label: "out".to_owned(),
            audio_label: "0:a".to_owned(),
            font_size: 80,
            font_file: Path::new("/fonts/Test.ttf").to_path_buf(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn args_map_video_bracketed_and_audio_optionally() {
        let args = engine_args(
            Path::new("in.mp4"),
            Path::new("out.mp4"),
            &compiled(),
            &EncodeConfig::default(),
        );
        let map_positions: Vec<&String> = args
            .iter()
            .zip(args.iter().skip(1))
            .filter(|(flag, _)| *flag == "-map")
            .map(|(_, value)| value)
            .collect();
        assert_eq!(map_positions, [&"[out]".to_owned(), &"0:a?".to_owned()]);
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
        assert!(args.contains(&"+faststart".to_owned()));
    }

    #[test]
    fn faststart_can_be_disabled() {
        let config = EncodeConfig {
            faststart: false,
            ..EncodeConfig::default()
        };
        let args = engine_args(Path::new("a"), Path::new("b"), &compiled(), &config);
        assert!(!args.contains(&"-movflags".to_owned()));
    }

    #[test]
    fn filter_pad_audio_maps_bracketed() {
        assert_eq!(audio_map("0:a"), "0:a?");
        assert_eq!(audio_map("aout"), "[aout]");
    }

    #[test]
    fn duration_parsing_rejects_nonsense() {
        assert_eq!(parse_duration("12.48\n"), Some(12.48));
        assert_eq!(parse_duration("N/A"), None);
        assert_eq!(parse_duration("-3"), None);
        assert_eq!(parse_duration("inf"), None);
    }

    #[test]
    fn stderr_tail_is_bounded() {
        let long = "x".repeat(2000);
        assert_eq!(last_n_chars(&long, 500).len(), 500);
        assert_eq!(last_n_chars("  short  ", 500), "short");
    }

    #[test]
    fn dry_run_line_quotes_the_descriptor() {
        let args = vec!["-filter_complex".to_owned(), "[0:v]x;[a]y".to_owned()];
        let line = command_line(&args);
        assert_eq!(line, "ffmpeg -filter_complex \"[0:v]x;[a]y\"");
    }
}
