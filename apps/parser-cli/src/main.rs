use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use command_parser::{
    export_sentences, load_grammar_file, load_world_file, Engine, GrammarDefinition, ParserConfig,
    WorldSnapshot,
};

#[derive(Parser, Debug)]
#[command(
    name = "cmdp",
    version,
    about = "Parse robot commands against a world",
    disable_help_subcommand = true
)]
struct Cli {
    /// Grammar YAML (defaults to the built-in grammar)
    #[arg(long, global = true)]
    grammar: Option<PathBuf>,
    /// World YAML with objects and robot (defaults to the built-in world)
    #[arg(long, global = true)]
    world: Option<PathBuf>,
    /// Parser config YAML (scores, penalties, vocabulary)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse one utterance
    Parse {
        /// Words of the utterance
        #[arg(required = true)]
        utterance: Vec<String>,
        /// Also list the N best commands with their scores
        #[arg(long)]
        top: Option<usize>,
        /// Print JSON
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Read utterances from stdin, one per line
    Interactive {
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Shortest description of every object
    Describe {
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Probability of each object for a referring expression
    Ground {
        #[arg(required = true)]
        query: Vec<String>,
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Everything the grammar can say
    Sentences {
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    let definition = load_definition(cli.grammar.as_deref())?;
    let config = match cli.config.as_deref() {
        Some(path) => ParserConfig::from_yaml_file(path)?,
        None => ParserConfig::default(),
    };

    if let Commands::Sentences { json } = cli.command {
        return sentences(&definition, &config, json);
    }

    let engine = Engine::new(definition, config);
    let world = match cli.world.as_deref() {
        Some(path) => load_world_file(path)?,
        None => WorldSnapshot::builtin()?,
    };
    info!(objects = world.objects.len(), "loaded world");
    engine.set_snapshot(world)?;

    match cli.command {
        Commands::Parse {
            utterance,
            top,
            json,
        } => parse_once(&engine, &utterance.join(" "), top, json),
        Commands::Interactive { json } => interactive(&engine, json),
        Commands::Describe { json } => describe(&engine, json),
        Commands::Ground { query, json } => ground(&engine, &query.join(" "), json),
        Commands::Sentences { .. } => Ok(()),
    }
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn load_definition(path: Option<&Path>) -> Result<GrammarDefinition> {
    match path {
        Some(path) => load_grammar_file(path),
        None => Ok(GrammarDefinition::builtin()?),
    }
}

fn parse_once(engine: &Engine, utterance: &str, top: Option<usize>, json: bool) -> Result<()> {
    let command = engine.parse(utterance)?;
    let ranked = match top {
        Some(n) => engine.ranked(utterance, n)?,
        None => Vec::new(),
    };

    if json {
        let out = serde_json::json!({ "command": command, "ranked": ranked });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    println!("{command}");
    for (i, r) in ranked.iter().enumerate() {
        println!(
            "{:>3}. {:<40} lang={:.4} score={:.4}",
            i + 1,
            r.command.to_string(),
            r.lang_score,
            r.score
        );
    }
    Ok(())
}

fn interactive(engine: &Engine, json: bool) -> Result<()> {
    println!("Type a command and press Enter ('quit' to exit)");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut reader = stdin.lock();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let utterance = line.trim();
        if utterance.eq_ignore_ascii_case("quit") || utterance.eq_ignore_ascii_case("exit") {
            break;
        }
        if utterance.is_empty() {
            continue;
        }

        let command = engine.parse(utterance)?;
        if json {
            println!("{}", serde_json::to_string(&command)?);
        } else {
            println!("{command}");
        }
    }
    Ok(())
}

fn describe(engine: &Engine, json: bool) -> Result<()> {
    let descriptions = engine.describe()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&descriptions)?);
        return Ok(());
    }
    for d in descriptions {
        println!("{}\t{}", d.name, d.description);
    }
    Ok(())
}

fn ground(engine: &Engine, query: &str, json: bool) -> Result<()> {
    let grounding = engine.ground(query)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&grounding)?);
        return Ok(());
    }
    for g in grounding {
        println!("{}\t{:.4}", g.name, g.probability);
    }
    Ok(())
}

fn sentences(definition: &GrammarDefinition, config: &ParserConfig, json: bool) -> Result<()> {
    let export = export_sentences(definition, config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }
    println!("# commands");
    for s in &export.command_sentences {
        println!("{s}");
    }
    println!("# objects");
    for s in &export.object_phrasings {
        println!("{s}");
    }
    println!("# phrases");
    for s in &export.phrases {
        println!("{s}");
    }
    Ok(())
}
