//! tex2mml - TeX math to MathML from the command line

use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::debug;
use texmml::diagnostics::{check_tex, format_diagnostics};
use texmml::{ParserOptions, TagMode, TexInput, PACKAGES};

#[derive(Parser)]
#[command(name = "tex2mml")]
#[command(version)]
#[command(about = "Parse TeX math into a MathML tree", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Formula to parse (reads --file or stdin if not provided)
    formula: Option<String>,

    /// Read the formula from a file
    #[arg(short, long)]
    file: Option<String>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// Parse as a displayed formula
    #[arg(short, long)]
    display: bool,

    /// Comma-separated packages (default: base,ams,newcommand)
    #[arg(short, long, value_delimiter = ',')]
    packages: Vec<String>,

    /// Number every displayed equation
    #[arg(long)]
    number_all: bool,

    /// Indent the MathML output
    #[arg(long)]
    pretty: bool,

    /// Print the tree as JSON
    #[cfg(feature = "serde")]
    #[arg(long)]
    json: bool,

    /// Check the formula and report issues without printing MathML
    #[arg(long)]
    check: bool,

    /// Render errors as an merror node instead of failing
    #[arg(long)]
    recover: bool,

    /// Disable colored output (for check mode)
    #[arg(long)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available packages
    Packages,
}

fn read_formula(cli: &Cli) -> io::Result<String> {
    if let Some(formula) = &cli.formula {
        return Ok(formula.clone());
    }
    if let Some(path) = &cli.file {
        return fs::read_to_string(path);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn build_session(cli: &Cli) -> Result<TexInput, texmml::ConfigError> {
    let mut options = ParserOptions::new().with_display(cli.display);
    if cli.number_all {
        options = options.with_tags(TagMode::All);
    }
    let names: Vec<&str> = cli.packages.iter().map(|p| p.trim()).filter(|p| !p.is_empty()).collect();
    TexInput::builder().packages(&names).options(options).build()
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(Commands::Packages) = cli.command {
        for (name, build) in PACKAGES {
            let requires = build().requires.join(", ");
            if requires.is_empty() {
                println!("{}", name);
            } else {
                println!("{} (requires {})", name, requires);
            }
        }
        return ExitCode::SUCCESS;
    }

    let input = match read_formula(&cli) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("error: cannot read input: {}", err);
            return ExitCode::FAILURE;
        }
    };
    let session = match build_session(&cli) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };
    debug!("packages: {:?}", session.packages());

    if cli.check {
        let result = check_tex(input.trim_end(), &session);
        let color = !cli.no_color && io::stdout().is_terminal();
        println!("{}", format_diagnostics(&result, input.trim_end(), color));
        return if result.has_errors() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    let tree = if cli.recover {
        session.parse_or_recover(input.trim_end())
    } else {
        match session.render(input.trim_end()) {
            Ok(tree) => tree,
            Err(err) => {
                eprintln!("error[{}]: {}", err.id(), err);
                return ExitCode::FAILURE;
            }
        }
    };

    #[cfg(feature = "serde")]
    let result = if cli.json {
        serde_json::to_string_pretty(&tree.to_json()).unwrap_or_default()
    } else if cli.pretty {
        tree.to_mathml_pretty()
    } else {
        tree.to_mathml()
    };
    #[cfg(not(feature = "serde"))]
    let result = if cli.pretty {
        tree.to_mathml_pretty()
    } else {
        tree.to_mathml()
    };

    match cli.output {
        Some(path) => {
            let written = fs::File::create(&path).and_then(|mut file| writeln!(file, "{}", result));
            if let Err(err) = written {
                eprintln!("error: cannot write {}: {}", path, err);
                return ExitCode::FAILURE;
            }
            eprintln!("✓ Output written to: {}", path);
        }
        None => println!("{}", result),
    }
    ExitCode::SUCCESS
}
