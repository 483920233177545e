//! completions command - Print a shell completion script to stdout

use clap::{Args, CommandFactory};
use clap_complete::Shell;

use super::Cli;
use crate::exit_code::ExitCode;

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn execute(args: &CompletionsArgs) -> ExitCode {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(args.shell, &mut command, name, &mut std::io::stdout());
    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_script_mentions_subcommands() {
        let mut command = Cli::command();
        let mut buf = Vec::new();
        clap_complete::generate(Shell::Bash, &mut command, "s3p", &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("s3p"));
        assert!(script.contains("resolve"));
    }
}
