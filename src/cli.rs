use clap::{ArgGroup, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "codepad", about = "Terminal code playground for JavaScript and Python", version)]
#[command(group(ArgGroup::new("source").args(["file", "eval"]).multiple(false)))]
pub struct Cli {
    /// Source file to execute. Omit (with no --eval and no piped stdin) to
    /// open the interactive playground.
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Evaluate a snippet given on the command line.
    #[arg(short = 'e', long = "eval", value_name = "SOURCE")]
    pub eval: Option<String>,

    /// Guest language (javascript|js|python|py). Defaults to the file
    /// extension, then to the configured default.
    #[arg(short = 'l', long = "language", value_name = "LANG")]
    pub language: Option<String>,

    /// Python interpreter to use (overrides config).
    #[arg(long = "python-bin", value_name = "BIN")]
    pub python_bin: Option<String>,

    /// Disable colored transcript output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
