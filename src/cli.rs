use crate::app::Mode;
use clap::Parser;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use std::ffi::OsString;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
In-session keywords:
  image mode   switch to image questions (path, then prompt)
  text mode    switch back to chat; starts a fresh conversation

An empty image path reads the path from the clipboard.
Ctrl-C or Ctrl-D quits.";

#[derive(Parser, Debug, Default, PartialEq)]
#[command(author, version, about = "Chat with Gemini from the terminal", long_about = None)]
#[command(after_help = AFTER_HELP)]
pub struct Args {
    /// Start in text-to-text mode (the default)
    #[arg(long, conflicts_with = "image")]
    pub text: bool,

    /// Start in image mode
    #[arg(long)]
    pub image: bool,

    /// Path to keys.json instead of the standard locations
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print model output verbatim instead of rendering markdown
    #[arg(long)]
    pub raw: bool,

    /// Log request flow to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Mode flags are matched without regard to case.
const MODE_FLAGS: [&str; 2] = ["--text", "--image"];

impl Args {
    /// Parses the command line. Help and version exit right away. Unknown
    /// arguments are dropped one by one and conflicting mode flags are both
    /// dropped, so the remaining options still apply; the reasons come back
    /// joined so they can be logged once tracing is up.
    pub fn parse_lenient<I, T>(argv: I) -> (Self, Option<String>)
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv.next().unwrap_or_else(|| OsString::from("gemterm"));
        let mut rest: Vec<OsString> = argv.map(normalize_mode_flag).collect();
        let mut warnings = Vec::new();

        loop {
            let attempt = std::iter::once(program.clone()).chain(rest.iter().cloned());
            let e = match Self::try_parse_from(attempt) {
                Ok(args) => return (args, joined(warnings)),
                Err(e) if !e.use_stderr() => e.exit(),
                Err(e) => e,
            };

            warnings.push(first_line(&e));
            let before = rest.len();
            match e.kind() {
                ErrorKind::UnknownArgument => {
                    if let Some(ContextValue::String(bad)) = e.get(ContextKind::InvalidArg) {
                        let with_value = format!("{}=", bad);
                        rest.retain(|arg| {
                            let arg = arg.to_string_lossy();
                            arg != bad.as_str() && !arg.starts_with(&with_value)
                        });
                    }
                }
                ErrorKind::ArgumentConflict => {
                    rest.retain(|arg| !MODE_FLAGS.iter().any(|flag| arg == flag));
                }
                _ => {}
            }

            if rest.len() == before {
                return (Self::default(), joined(warnings));
            }
        }
    }

    pub fn initial_mode(&self) -> Mode {
        if self.image { Mode::Image } else { Mode::Text }
    }
}

fn normalize_mode_flag(arg: OsString) -> OsString {
    let lowered = arg.to_str().map(str::to_ascii_lowercase);
    match lowered {
        Some(flag) if MODE_FLAGS.contains(&flag.as_str()) => OsString::from(flag),
        _ => arg,
    }
}

fn first_line(e: &clap::Error) -> String {
    e.to_string().lines().next().unwrap_or_default().to_string()
}

fn joined(warnings: Vec<String>) -> Option<String> {
    if warnings.is_empty() {
        None
    } else {
        Some(warnings.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_means_text_mode() {
        let (args, warning) = Args::parse_lenient(["gemterm"]);
        assert_eq!(args.initial_mode(), Mode::Text);
        assert!(warning.is_none());
    }

    #[test]
    fn image_flag_selects_image_mode() {
        let (args, _) = Args::parse_lenient(["gemterm", "--image"]);
        assert_eq!(args.initial_mode(), Mode::Image);

        let (args, _) = Args::parse_lenient(["gemterm", "--text"]);
        assert_eq!(args.initial_mode(), Mode::Text);
    }

    #[test]
    fn mode_flags_ignore_case() {
        let (args, warning) = Args::parse_lenient(["gemterm", "--IMAGE"]);
        assert_eq!(args.initial_mode(), Mode::Image);
        assert!(warning.is_none());

        let (args, _) = Args::parse_lenient(["gemterm", "--Text"]);
        assert_eq!(args.initial_mode(), Mode::Text);
    }

    #[test]
    fn unknown_argument_falls_back_to_text_mode() {
        let (args, warning) = Args::parse_lenient(["gemterm", "--bogus"]);
        assert_eq!(args, Args::default());
        assert_eq!(args.initial_mode(), Mode::Text);
        assert!(warning.unwrap().contains("--bogus"));
    }

    #[test]
    fn unknown_argument_keeps_the_recognized_ones() {
        let (args, warning) = Args::parse_lenient([
            "gemterm",
            "--image",
            "-c",
            "/tmp/mine.json",
            "--bogus",
            "stray",
            "--raw",
        ]);
        assert_eq!(args.initial_mode(), Mode::Image);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/mine.json")));
        assert!(args.raw);

        let warning = warning.unwrap();
        assert!(warning.contains("--bogus"));
        assert!(warning.contains("stray"));
    }

    #[test]
    fn conflicting_modes_fall_back() {
        let (args, warning) =
            Args::parse_lenient(["gemterm", "--text", "--image", "-c", "/tmp/keys.json"]);
        assert_eq!(args.initial_mode(), Mode::Text);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/keys.json")));
        assert!(warning.is_some());
    }

    #[test]
    fn options_are_read() {
        let (args, _) =
            Args::parse_lenient(["gemterm", "-c", "/tmp/keys.json", "--raw", "-v"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/keys.json")));
        assert!(args.raw);
        assert!(args.verbose);
    }
}
