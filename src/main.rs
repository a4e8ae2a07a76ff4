use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use rayon::prelude::*;
use textkit::{
    Align, ControlCharPolicy, ConvertOptions, EncodingName, ErrorPolicy, PadOptions, WrapOptions,
    XmlOptions, bytes_to_xml, fill, guess_encoding, pad_to_width, text_to_xml, text_width, to_bytes,
    to_text, wrap, xml_to_bytes, xml_to_text,
};

#[derive(Parser)]
#[command(version, about = "Measure, wrap and convert text of unknown encoding")]
struct Cli {
    /// Encoding of the input; guessed per file when omitted
    #[arg(long, global = true)]
    encoding: Option<String>,
    /// What to do with bytes or characters the encoding cannot handle
    #[arg(long, global = true, default_value_t = ErrorPolicy::Replace)]
    errors: ErrorPolicy,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the display width of each line
    Width {
        /// How to treat control characters
        #[arg(long, default_value_t = ControlCharPolicy::Replace)]
        control: ControlCharPolicy,
        files: Vec<PathBuf>,
    },
    /// Cut each line to a display width
    Chop {
        #[arg(long)]
        width: usize,
        /// Pad shorter lines with spaces up to the width
        #[arg(long)]
        pad: bool,
        /// Pad on the left instead of the right
        #[arg(long, requires = "pad")]
        right: bool,
        files: Vec<PathBuf>,
    },
    /// Wrap the whole input as one paragraph
    Wrap {
        #[command(flatten)]
        layout: Layout,
        files: Vec<PathBuf>,
    },
    /// Refill each blank-line separated paragraph
    Fill {
        #[command(flatten)]
        layout: Layout,
        files: Vec<PathBuf>,
    },
    /// Print the guessed encoding of each file
    Guess {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Re-encode the input
    Convert {
        /// Output encoding
        #[arg(long, default_value = "utf-8")]
        to: String,
        files: Vec<PathBuf>,
    },
    /// Escape the input as XML character data
    Xml {
        /// Output encoding; unencodable characters become references
        #[arg(long, default_value = "utf-8")]
        to: String,
        /// Escape double quotes too
        #[arg(long)]
        attribute: bool,
        #[arg(long, default_value_t = ControlCharPolicy::Replace)]
        control: ControlCharPolicy,
        /// Treat the input as binary and emit base64
        #[arg(long, conflicts_with_all = ["attribute", "control"])]
        binary: bool,
        files: Vec<PathBuf>,
    },
    /// Resolve XML references back to text
    Unxml {
        /// Output encoding
        #[arg(long, default_value = "utf-8")]
        to: String,
        /// Decode base64 produced by `xml --binary`
        #[arg(long)]
        binary: bool,
        files: Vec<PathBuf>,
    },
}

#[derive(clap::Args, Clone, Copy)]
struct Layout {
    /// Maximum display width of a line
    #[arg(long, default_value_t = textkit::display::wrap::DEFAULT_WIDTH)]
    width: usize,
}

/// One input: a named file, or standard input when no files are given.
struct Source {
    label: String,
    bytes: Vec<u8>,
}

fn read_sources(files: &[PathBuf]) -> anyhow::Result<Vec<Source>> {
    if files.is_empty() {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .context("reading standard input")?;
        return Ok(vec![Source {
            label: "<stdin>".into(),
            bytes,
        }]);
    }
    files.iter().map(|path| read_file(path)).collect()
}

fn read_file(path: &Path) -> anyhow::Result<Source> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    info!("read {} byte(s) from {}", bytes.len(), path.display());
    Ok(Source {
        label: path.display().to_string(),
        bytes,
    })
}

impl Cli {
    fn input_encoding(&self, source: &Source) -> anyhow::Result<EncodingName> {
        match &self.encoding {
            Some(label) => Ok(textkit::canonical_encoding(label)?),
            None => {
                let guessed = guess_encoding(source.bytes.as_slice())?;
                info!("guessed {guessed} for {}", source.label);
                Ok(guessed)
            }
        }
    }

    fn decode(&self, source: &Source) -> anyhow::Result<String> {
        let encoding = self.input_encoding(source)?;
        let options = ConvertOptions::new(encoding.as_str()).errors(self.errors);
        let text = to_text(source.bytes.as_slice(), &options)
            .with_context(|| format!("decoding {}", source.label))?;
        Ok(text.into_owned())
    }

    fn encode(&self, text: &str, encoding: &str) -> anyhow::Result<Vec<u8>> {
        let options = ConvertOptions::new(encoding).errors(self.errors);
        Ok(to_bytes(text, &options)?.into_owned())
    }

    fn texts(&self, files: &[PathBuf]) -> anyhow::Result<Vec<String>> {
        read_sources(files)?
            .iter()
            .map(|source| self.decode(source))
            .collect()
    }
}

fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    match &cli.command {
        Command::Width { control, files } => {
            for text in cli.texts(files)? {
                for (idx, line) in text.lines().enumerate() {
                    let width = text_width(line, *control)
                        .with_context(|| format!("measuring line {}", idx + 1))?;
                    writeln!(out, "{width}")?;
                }
            }
        }
        Command::Chop {
            width,
            pad,
            right,
            files,
        } => {
            let align = if *right { Align::Right } else { Align::Left };
            let options = PadOptions::default().chop(*width).align(align);
            for text in cli.texts(files)? {
                for line in text.lines() {
                    let line = if *pad {
                        pad_to_width(line, *width, &options)
                    } else {
                        textkit::chop_to_width(line, *width).to_string()
                    };
                    writeln!(out, "{line}")?;
                }
            }
        }
        Command::Wrap { layout, files } => {
            for text in cli.texts(files)? {
                for line in wrap(&text, WrapOptions::new(layout.width)) {
                    writeln!(out, "{line}")?;
                }
            }
        }
        Command::Fill { layout, files } => {
            for text in cli.texts(files)? {
                let filled: Vec<String> = paragraphs(&text)
                    .iter()
                    .map(|para| fill(para, layout.width))
                    .collect();
                if !filled.is_empty() {
                    writeln!(out, "{}", filled.join("\n\n"))?;
                }
            }
        }
        Command::Guess { files } => {
            let guesses: Vec<anyhow::Result<(String, EncodingName)>> = files
                .par_iter()
                .map(|path| -> anyhow::Result<(String, EncodingName)> {
                    let source = read_file(path)?;
                    let encoding = guess_encoding(source.bytes.as_slice())?;
                    Ok((source.label, encoding))
                })
                .collect();
            for guess in guesses {
                let (label, encoding) = guess?;
                writeln!(out, "{label}: {encoding}")?;
            }
        }
        Command::Convert { to, files } => {
            for text in cli.texts(files)? {
                out.write_all(&cli.encode(&text, to)?)?;
            }
        }
        Command::Xml {
            to,
            attribute,
            control,
            binary,
            files,
        } => {
            for source in read_sources(files)? {
                if *binary {
                    out.write_all(&bytes_to_xml(&source.bytes))?;
                    writeln!(out)?;
                    continue;
                }
                let text = cli.decode(&source)?;
                let options = XmlOptions::new(to).attribute(*attribute).control_chars(*control);
                let xml = text_to_xml(&text, &options)
                    .with_context(|| format!("escaping {}", source.label))?;
                out.write_all(&xml)?;
            }
        }
        Command::Unxml { to, binary, files } => {
            for source in read_sources(files)? {
                if *binary {
                    let raw = xml_to_bytes(&source.bytes)
                        .with_context(|| format!("decoding base64 in {}", source.label))?;
                    out.write_all(&raw)?;
                    continue;
                }
                let encoding = cli.input_encoding(&source)?;
                let text = xml_to_text(&source.bytes, encoding.as_str(), cli.errors)
                    .with_context(|| format!("decoding {}", source.label))?;
                out.write_all(&cli.encode(&text, to)?)?;
            }
        }
    }
    Ok(())
}

/// Entry point for the `textkit` command-line tool.
///
/// Reads each named file, or standard input when none are given, and writes
/// the result of the chosen subcommand to standard output. Logging goes to
/// standard error and is controlled with `RUST_LOG` (default `warn`).
///
/// # Examples
///
/// ```sh
/// # Display width of every line
/// textkit width notes.txt
///
/// # Wrap Shift_JIS input to 40 columns
/// textkit --encoding shift_jis wrap --width 40 memo.txt
///
/// # Guess the encoding of several files in parallel
/// textkit guess *.txt
/// ```
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&cli, &mut out)?;
    out.flush()?;
    Ok(())
}
