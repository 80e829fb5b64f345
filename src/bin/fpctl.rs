use std::path::PathBuf;

use clap::{Parser, Subcommand};

use audiodna::{AudioLoader, Engine, FingerprintConfig};

#[derive(Parser)]
#[command(name = "fpctl", about = "Register and identify recordings against a local fingerprint corpus")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Optional path to a JSON file overriding the default FingerprintConfig.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Register every WAV file in a directory, using the file stem as name.
    Register {
        /// Directory containing .wav files.
        corpus_dir: PathBuf,
    },
    /// Identify a single WAV clip against the given corpus directory.
    Identify {
        /// Directory containing .wav files to register before matching.
        corpus_dir: PathBuf,
        /// The query clip.
        query_wav: PathBuf,
    },
}

fn load_config(path: &Option<PathBuf>) -> FingerprintConfig {
    match path {
        None => FingerprintConfig::default(),
        Some(p) => {
            let text = std::fs::read_to_string(p).unwrap_or_else(|e| {
                panic!("failed to read config file {}: {}", p.display(), e)
            });
            serde_json::from_str(&text).unwrap_or_else(|e| {
                panic!("failed to parse config file {}: {}", p.display(), e)
            })
        }
    }
}

fn register_corpus(engine: &Engine, corpus_dir: &PathBuf) -> std::io::Result<usize> {
    let mut registered = 0;
    for entry in std::fs::read_dir(corpus_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("wav") {
            continue;
        }
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        let (audio, sample_rate) = match AudioLoader::load_from_wav(path.to_str().unwrap()) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("skipping {}: {}", path.display(), e);
                continue;
            }
        };

        match engine.register(&audio, sample_rate, &name, &[]) {
            Ok(id) => {
                println!("registered '{}' as {}", name, id);
                registered += 1;
            }
            Err(e) => eprintln!("failed to register '{}': {}", name, e),
        }
    }
    Ok(registered)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli.config);
    let engine = Engine::new(config).expect("invalid fingerprint configuration");

    match cli.command {
        Command::Register { corpus_dir } => {
            let count = register_corpus(&engine, &corpus_dir).expect("failed to read corpus directory");
            println!("registered {} recordings", count);
        }
        Command::Identify { corpus_dir, query_wav } => {
            register_corpus(&engine, &corpus_dir).expect("failed to read corpus directory");

            let (audio, sample_rate) = AudioLoader::load_from_wav(query_wav.to_str().unwrap())
                .expect("failed to load query clip");

            match engine.identify(&audio, sample_rate) {
                Ok(Some(m)) => println!(
                    "match: recording_id={} score={} offset_frames={}",
                    m.recording_id, m.score, m.offset_frames
                ),
                Ok(None) => println!("no match"),
                Err(e) => eprintln!("identify failed: {}", e),
            }
        }
    }
}
