use clap::{Parser, Subcommand};
use simple_blog::fetch::{Fetcher, FsFetcher, HttpFetcher};
use simple_blog::{config, generate, output};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-blog")]
#[command(about = "Static blog generator for plain-text story streams")]
#[command(long_about = "\
Static blog generator for plain-text story streams

Your content is plain text. Stories live in streams: directories holding an
`index` file that lists one story file per line, in display order.

Content structure:

  content/
  ├── config.toml              # Site config (optional)
  ├── stories/                 # A stream
  │   ├── index                # One story file name per line, in order
  │   ├── hello-world.md       # Markdown story
  │   └── plain-note.txt       # Plain-text story
  └── news/                    # Another stream
      ├── index
      └── site-launch.md

Story micro-format:

  <title line>
  <excerpt text>
  +++                          # Optional excerpt break (3+ plus signs)
  <body text>
  ---                          # Optional metadata break (3+ hyphens)
  by <author>
  on <year>-<month>-<day>

A delimiter line escaped with a leading backslash (\\+++) is literal text.

The source can also be remote: --source https://example.com/blog fetches
the index and story files over HTTP with cache busting.

Run 'simple-blog gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content source: a directory or an http(s):// base URL
    #[arg(long, default_value = "content", global = true)]
    source: String,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load every stream and generate the HTML site
    Build,
    /// Load and validate streams without writing output
    Check {
        /// Emit the parsed inventory as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn make_fetcher(source: &str) -> Box<dyn Fetcher> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Box::new(HttpFetcher::new(source))
    } else {
        Box::new(FsFetcher::new(source))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let fetcher = make_fetcher(&cli.source);

    match cli.command {
        Command::Build => {
            let config = config::load_config(fetcher.as_ref())?;
            let specs = generate::resolve_streams(&config, &cli.source);

            println!("==> Loading {} streams from {}", specs.len(), cli.source);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_render_event(&event) {
                        println!("{}", line);
                    }
                }
            });

            let events = Some(tx);
            let loaded = generate::load_streams(specs, fetcher.as_ref(), &events);
            let summary =
                generate::build_site(&loaded, &config, fetcher.as_ref(), &cli.output, &events)?;
            drop(events);
            printer.join().unwrap();

            output::print_build_summary(&summary);
            println!("==> Site generated at {}", cli.output.display());
        }
        Command::Check { json } => {
            let config = config::load_config(fetcher.as_ref())?;
            let specs = generate::resolve_streams(&config, &cli.source);
            let loaded = generate::load_streams(specs, fetcher.as_ref(), &None);

            if json {
                let streams: Vec<serde_json::Value> = loaded
                    .iter()
                    .map(|stream| {
                        serde_json::json!({
                            "name": stream.spec.name,
                            "path": stream.spec.path,
                            "stories": stream.outcome.as_ref().ok(),
                            "error": stream.outcome.as_ref().err().map(|e| e.to_string()),
                        })
                    })
                    .collect();
                let inventory = serde_json::json!({ "streams": streams });
                println!("{}", serde_json::to_string_pretty(&inventory)?);
            } else {
                output::print_check_output(&loaded);
            }

            let failures = loaded.iter().filter(|s| s.outcome.is_err()).count();
            if failures > 0 {
                return Err(format!("{failures} stream(s) failed to load").into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
