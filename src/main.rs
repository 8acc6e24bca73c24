// Use jemalloc for better memory allocation performance on Unix-like systems
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

// Use mimalloc on Windows for better performance
#[cfg(target_env = "msvc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use colored::*;
use core::error::Error;
use memmap2::Mmap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use mdpress_lib::config::Config;
use mdpress_lib::exit_codes::exit;
use mdpress_lib::link_patterns::load_link_patterns_file;
use mdpress_lib::{ConvertOptions, Extra, Markdown, MarkdownError, TagStyle, parse_extras};

/// Threshold for using memory-mapped I/O (1MB)
const MMAP_THRESHOLD: u64 = 1024 * 1024;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Markdown files to convert (use '-' or nothing for stdin)
    paths: Vec<String>,

    /// Close empty elements HTML4 style (`<br>`) instead of XHTML (`<br />`)
    #[arg(long)]
    html4tags: bool,

    /// Replace raw HTML in the input with [HTML_REMOVED]
    #[arg(short, long)]
    safe: bool,

    /// Enable extras: code-friendly, footnotes, code-color, link-patterns
    #[arg(short = 'x', long = "extras", value_name = "EXTRAS")]
    extras: Vec<String>,

    /// Columns per tab stop
    #[arg(long, value_name = "N")]
    tab_width: Option<usize>,

    /// File of `PATTERN HREF` auto-link rules (enables link-patterns)
    #[arg(long, value_name = "PATH")]
    link_patterns_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore all configuration files and use built-in defaults
    #[arg(long, conflicts_with = "config")]
    no_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Control colored output: auto, always, never
    #[arg(long, default_value = "auto", value_parser = ["auto", "always", "never"])]
    color: String,
}

/// Efficiently read file content using memory mapping for large files
pub fn read_file_efficiently(path: &Path) -> Result<String, Box<dyn Error>> {
    let metadata = fs::metadata(path).map_err(|e| format!("Failed to read file {}: {}", path.display(), e))?;
    let file_size = metadata.len();

    if file_size > MMAP_THRESHOLD {
        let file = fs::File::open(path)?;
        // SAFETY: the map is read once and copied out immediately; the file is
        // not written by this process.
        let mmap = unsafe { Mmap::map(&file)? };
        String::from_utf8(mmap.to_vec()).map_err(|e| format!("Invalid UTF-8 in file {}: {}", path.display(), e).into())
    } else {
        fs::read_to_string(path).map_err(|e| format!("Failed to read file {}: {}", path.display(), e).into())
    }
}

/// Config file first, then command-line flags on top
fn build_options(cli: &Cli) -> Result<ConvertOptions, MarkdownError> {
    let loaded = Config::load(cli.config.as_deref(), cli.no_config)?;
    if let Some(path) = &loaded.path {
        log::debug!("Using config file {}", path.display());
    }
    let mut options = loaded.config.apply_to(ConvertOptions::default())?;

    if cli.html4tags {
        options.tag_style = TagStyle::Html4;
    }
    if cli.safe {
        options.safe_mode = true;
    }
    for list in &cli.extras {
        options.extras.extend(parse_extras(list)?);
    }
    if let Some(tab_width) = cli.tab_width {
        options.tab_width = tab_width;
    }
    if let Some(path) = &cli.link_patterns_file {
        options.link_patterns.extend(load_link_patterns_file(path)?);
        options.extras.insert(Extra::LinkPatterns);
    }
    Ok(options)
}

fn convert_input(md: &Markdown, path: &str, stdin: Option<&str>) -> Result<String, String> {
    if path == "-" {
        return Ok(md.convert(stdin.unwrap_or_default()));
    }
    let text = read_file_efficiently(Path::new(path)).map_err(|e| e.to_string())?;
    Ok(md.convert(&text))
}

#[cfg(feature = "parallel")]
fn convert_all(md: &Markdown, paths: &[String], stdin: Option<&str>) -> Vec<Result<String, String>> {
    use rayon::prelude::*;

    paths.par_iter().map(|path| convert_input(md, path, stdin)).collect()
}

#[cfg(not(feature = "parallel"))]
fn convert_all(md: &Markdown, paths: &[String], stdin: Option<&str>) -> Vec<Result<String, String>> {
    paths.iter().map(|path| convert_input(md, path, stdin)).collect()
}

fn main() {
    // Reset SIGPIPE to default behavior on Unix so piping to `head` etc. works correctly.
    // Without this, Rust ignores SIGPIPE and `println!` panics on broken pipe.
    #[cfg(unix)]
    {
        // SAFETY: Setting SIGPIPE to SIG_DFL is standard practice for CLI tools
        // that produce output meant to be piped.
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    let cli = Cli::parse();

    // Set color override globally based on --color flag
    match cli.color.as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::unset_override(),
    }

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let options = build_options(&cli).unwrap_or_else(|e| {
        eprintln!("{}: {}", "Error".red().bold(), e);
        exit::tool_error();
    });
    let md = Markdown::new(options).unwrap_or_else(|e| {
        eprintln!("{}: {}", "Error".red().bold(), e);
        exit::tool_error();
    });

    let paths = if cli.paths.is_empty() {
        vec!["-".to_string()]
    } else {
        cli.paths.clone()
    };

    let stdin = if paths.iter().any(|p| p == "-") {
        let mut buffer = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buffer) {
            eprintln!("{}: Failed to read stdin: {}", "Error".red().bold(), e);
            exit::conversion_failed();
        }
        Some(buffer)
    } else {
        None
    };

    let results = convert_all(&md, &paths, stdin.as_deref());

    let mut failed = false;
    let mut stdout = io::stdout().lock();
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(html) => {
                if let Err(e) = stdout.write_all(html.as_bytes()) {
                    eprintln!("{}: Failed to write output: {}", "Error".red().bold(), e);
                    exit::conversion_failed();
                }
            }
            Err(e) => {
                log::debug!("Conversion of {path} failed");
                eprintln!("{}: {}", "Error".red().bold(), e);
                failed = true;
            }
        }
    }
    if let Err(e) = stdout.flush() {
        eprintln!("{}: Failed to write output: {}", "Error".red().bold(), e);
        exit::conversion_failed();
    }

    if failed {
        exit::conversion_failed();
    }
}
